use dmrg_block::BlockCacheError;
use dmrg_tensor::TensorError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SweepError {
    #[error("precondition violated: {0}")]
    Precondition(String),

    #[error("tensor primitive failure: {0}")]
    Tensor(#[from] TensorError),

    #[error("block operator cache failure: {0}")]
    Block(#[from] BlockCacheError),

    #[error("I/O failure: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to (de)serialize an MPS site tensor: {0}")]
    Serde(#[from] bincode::Error),
}
