use thiserror::Error;

/// Errors produced by type parsing and validation.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TypeError {
    #[error("invalid DID format: {0}")]
    InvalidFormat(String),

    #[error("invalid address: {0}")]
    InvalidAddress(String),

    #[error("invalid metadata: {0}")]
    InvalidMetadata(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}
