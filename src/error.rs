use thiserror::Error;

#[derive(Error, Debug)]
pub enum CrackError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("invalid hex digest: {0}")]
    Hex(#[from] hex::FromHexError),

    #[error("digest computation failed: {0}")]
    Digest(String),

    #[error("failed to build thread pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

impl CrackError {
    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        CrackError::InvalidInput(msg.into())
    }
}

pub type Result<T> = std::result::Result<T, CrackError>;
