use std::fmt;
use std::time::Duration;

use artdid_types::ContentAddress;

/// One failed attempt inside a fallback fetch.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FetchAttempt {
    pub source: String,
    pub error: String,
}

impl fmt::Display for FetchAttempt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.source, self.error)
    }
}

/// Errors from content store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The payload was rejected before any network call.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// The source answered but does not hold the content.
    #[error("content {address} not found on {name}")]
    NotFound {
        name: String,
        address: ContentAddress,
    },

    /// The source did not answer within its bound.
    #[error("{name} timed out after {after:?}")]
    Timeout { name: String, after: Duration },

    /// Transport failure or unexpected status from a source.
    #[error("{name} request failed: {reason}")]
    Request { name: String, reason: String },

    /// The source answered with a body that could not be decoded.
    #[error("invalid response from {name}: {reason}")]
    InvalidResponse { name: String, reason: String },

    /// Upload to the operated node failed.
    #[error("content store unavailable: {reason}")]
    Unavailable { reason: String },

    /// Every source failed to return the content.
    #[error("content fetch exhausted for {address}: {}", summarize(.attempts))]
    FetchExhausted {
        address: ContentAddress,
        attempts: Vec<FetchAttempt>,
    },
}

impl StoreError {
    pub fn request(name: impl Into<String>, reason: impl ToString) -> Self {
        Self::Request {
            name: name.into(),
            reason: reason.to_string(),
        }
    }
}

fn summarize(attempts: &[FetchAttempt]) -> String {
    if attempts.is_empty() {
        return "no sources configured".into();
    }
    attempts
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
