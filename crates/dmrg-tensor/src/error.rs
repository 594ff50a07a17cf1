use thiserror::Error;

/// Failures from the tensor primitive layer. These are always fatal to the
/// caller: once a contraction or decomposition produces an inconsistent
/// result the algorithmic state above it can no longer be trusted.
#[derive(Debug, Error)]
pub enum TensorError {
    #[error("SVD produced an empty factor (rows={rows}, cols={cols})")]
    EmptySvd { rows: usize, cols: usize },

    #[error("charge divergence mismatch in contraction: left={left}, right={right}")]
    DivergenceMismatch { left: i64, right: i64 },

    #[error("shape mismatch: expected {expected}, got {got}")]
    ShapeMismatch { expected: String, got: String },

    #[error("SVD did not converge")]
    SvdNonConvergent,
}
