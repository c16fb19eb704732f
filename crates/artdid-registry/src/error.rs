use std::fmt;

use artdid_ledger::LedgerError;
use artdid_store::StoreError;
use artdid_types::{Address, RecordId, TypeError};
use thiserror::Error;

/// Outward-facing error classes of the registry workflows.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    InvalidInput,
    InvalidFormat,
    RecordNotFound,
    OwnerAuthorizationDenied,
    DuplicateOwner,
    VersionConflict,
    LedgerUnavailable,
    ContentStoreUnavailable,
    ContentFetchExhausted,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InvalidInput => "InvalidInput",
            Self::InvalidFormat => "InvalidFormat",
            Self::RecordNotFound => "RecordNotFound",
            Self::OwnerAuthorizationDenied => "OwnerAuthorizationDenied",
            Self::DuplicateOwner => "DuplicateOwner",
            Self::VersionConflict => "VersionConflict",
            Self::LedgerUnavailable => "LedgerUnavailable",
            Self::ContentStoreUnavailable => "ContentStoreUnavailable",
            Self::ContentFetchExhausted => "ContentFetchExhausted",
        }
    }

    /// Caused by the request itself and detected before any network call.
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::InvalidInput | Self::InvalidFormat)
    }

    /// Infrastructure fault rather than a domain rejection.
    pub fn is_infrastructure(&self) -> bool {
        matches!(
            self,
            Self::LedgerUnavailable | Self::ContentStoreUnavailable | Self::ContentFetchExhausted
        )
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("invalid DID format: {0}")]
    InvalidFormat(String),

    #[error("record not found: {0}")]
    RecordNotFound(RecordId),

    #[error("{caller} is not authorized to transfer {record_id}")]
    OwnerAuthorizationDenied { record_id: RecordId, caller: Address },

    #[error("{owner} has already owned {record_id}")]
    DuplicateOwner { record_id: RecordId, owner: Address },

    #[error("{record_id} changed concurrently; expected version {expected}")]
    VersionConflict { record_id: RecordId, expected: u64 },

    #[error("{0}")]
    LedgerUnavailable(String),

    #[error("{0}")]
    ContentStoreUnavailable(String),

    #[error("{0}")]
    ContentFetchExhausted(String),
}

impl RegistryError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidInput(_) => ErrorKind::InvalidInput,
            Self::InvalidFormat(_) => ErrorKind::InvalidFormat,
            Self::RecordNotFound(_) => ErrorKind::RecordNotFound,
            Self::OwnerAuthorizationDenied { .. } => ErrorKind::OwnerAuthorizationDenied,
            Self::DuplicateOwner { .. } => ErrorKind::DuplicateOwner,
            Self::VersionConflict { .. } => ErrorKind::VersionConflict,
            Self::LedgerUnavailable(_) => ErrorKind::LedgerUnavailable,
            Self::ContentStoreUnavailable(_) => ErrorKind::ContentStoreUnavailable,
            Self::ContentFetchExhausted(_) => ErrorKind::ContentFetchExhausted,
        }
    }
}

impl From<TypeError> for RegistryError {
    fn from(err: TypeError) -> Self {
        match err {
            TypeError::InvalidFormat(reason) => Self::InvalidFormat(reason),
            other => Self::InvalidInput(other.to_string()),
        }
    }
}

impl From<LedgerError> for RegistryError {
    fn from(err: LedgerError) -> Self {
        match err {
            LedgerError::RecordNotFound(id) => Self::RecordNotFound(id),
            LedgerError::OwnerAuthorizationDenied { record_id, caller } => {
                Self::OwnerAuthorizationDenied { record_id, caller }
            }
            LedgerError::DuplicateOwner { record_id, owner } => {
                Self::DuplicateOwner { record_id, owner }
            }
            LedgerError::VersionConflict { record_id, expected } => {
                Self::VersionConflict { record_id, expected }
            }
            unavailable @ LedgerError::Unavailable(_) => {
                Self::LedgerUnavailable(unavailable.to_string())
            }
        }
    }
}

impl From<StoreError> for RegistryError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::InvalidInput(reason) => Self::InvalidInput(reason),
            exhausted @ StoreError::FetchExhausted { .. } => {
                Self::ContentFetchExhausted(exhausted.to_string())
            }
            other => Self::ContentStoreUnavailable(other.to_string()),
        }
    }
}

pub type RegistryResult<T> = Result<T, RegistryError>;
