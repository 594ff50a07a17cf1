use thiserror::Error;

#[derive(Debug, Error)]
pub enum BlockCacheError {
    #[error("I/O failure on block operator file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to (de)serialize a block operator group: {0}")]
    Serde(#[from] bincode::Error),

    #[error("block group for boundary {0} is not resident and has no file on disk")]
    Missing(usize),
}
