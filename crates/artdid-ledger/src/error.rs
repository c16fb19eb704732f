use artdid_types::{Address, RecordId};

/// Errors produced by ledger operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LedgerError {
    #[error("record not found: {0}")]
    RecordNotFound(RecordId),

    #[error("{caller} is not the current owner of {record_id}")]
    OwnerAuthorizationDenied { record_id: RecordId, caller: Address },

    #[error("{owner} already appears in the ownership history of {record_id}")]
    DuplicateOwner { record_id: RecordId, owner: Address },

    #[error("stale update of {record_id}: expected content history length {expected}")]
    VersionConflict { record_id: RecordId, expected: u64 },

    /// Transport, timeout, or decoding fault.
    #[error("ledger unavailable: {0}")]
    Unavailable(String),
}

impl LedgerError {
    pub fn unavailable(reason: impl ToString) -> Self {
        Self::Unavailable(reason.to_string())
    }

    /// Prefix an `Unavailable` reason with the operation that hit it.
    pub fn context(self, operation: &str) -> Self {
        match self {
            Self::Unavailable(reason) => Self::Unavailable(format!("{operation}: {reason}")),
            other => other,
        }
    }

    pub fn is_unavailable(&self) -> bool {
        matches!(self, Self::Unavailable(_))
    }
}

pub type LedgerResult<T> = Result<T, LedgerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn context_only_touches_unavailable() {
        let e = LedgerError::unavailable("connection refused").context("register");
        assert_eq!(e.to_string(), "ledger unavailable: register: connection refused");

        let not_found = LedgerError::RecordNotFound(RecordId::new("0x1")).context("update");
        assert_eq!(not_found, LedgerError::RecordNotFound(RecordId::new("0x1")));
    }
}
