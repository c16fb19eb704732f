use serde::{Deserialize, Serialize};

use crate::address::{Address, ContentAddress};

/// Full ledger view of a registry record.
///
/// Both histories are append-only and oldest-first. An empty content
/// history means the record does not exist.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordState {
    pub content_address_history: Vec<ContentAddress>,
    pub owner_history: Vec<Address>,
    /// Unix seconds, set once at registration.
    pub created_at: u64,
    /// Unix seconds, set on every mutation.
    pub updated_at: u64,
}

impl RecordState {
    pub fn exists(&self) -> bool {
        !self.content_address_history.is_empty()
    }

    pub fn current_content_address(&self) -> Option<&ContentAddress> {
        self.content_address_history.last()
    }

    pub fn current_owner(&self) -> Option<&Address> {
        self.owner_history.last()
    }

    /// The owner before the current one, if ownership ever changed.
    pub fn previous_owner(&self) -> Option<&Address> {
        let len = self.owner_history.len();
        if len < 2 {
            return None;
        }
        self.owner_history.get(len - 2)
    }

    /// Current metadata version: the number of content addresses recorded.
    pub fn version(&self) -> u64 {
        self.content_address_history.len() as u64
    }

    /// Whether `address` appears anywhere in the owner history.
    pub fn has_owned(&self, address: &Address) -> bool {
        self.owner_history.iter().any(|owner| owner.same_as(address))
    }
}
