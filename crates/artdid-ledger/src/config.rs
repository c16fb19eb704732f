use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Timeouts and finality policy for the ledger gateway.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LedgerConfig {
    /// Bound on a single query or transaction submission.
    #[serde(with = "artdid_types::millis")]
    pub call_timeout: Duration,
    /// Bound on waiting for a submitted transaction to reach finality.
    #[serde(with = "artdid_types::millis")]
    pub confirmation_timeout: Duration,
    /// Blocks required on top of the inclusion block before a commit counts.
    pub confirmations: u64,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            call_timeout: Duration::from_secs(10),
            confirmation_timeout: Duration::from_secs(120),
            confirmations: 1,
        }
    }
}
