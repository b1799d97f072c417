use thiserror::Error;

/// Failures raised by a [`crate::Store`] adapter.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("sled: {0}")]
    Sled(#[from] sled::Error),
    /// A stored entry could not be decoded.
    #[error("corrupt entry under {key}: {reason}")]
    Corrupt { key: String, reason: String },
    /// Any other backend fault, reported verbatim.
    #[error("store backend: {0}")]
    Backend(String),
}

/// Errors returned by the client operations.
#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid input: {0}")]
    Validation(String),
    #[error(transparent)]
    Store(#[from] StoreError),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown operator {0:?}, expected \"and\" or \"or\"")]
pub struct ParseOperatorError(pub String);
