use artdid_types::{Address, ContentAddress, Metadata, RecordId, RecordState, TxId};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Placeholder reported when a record has never changed hands.
pub const NO_PREVIOUS_OWNER: &str = "N/A";

/// Result of a confirmed registration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Registered {
    pub did: String,
    pub tx_id: TxId,
    pub content_address: ContentAddress,
    pub content_url: String,
    pub metadata: Metadata,
}

/// Ledger-derived view of a record.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockchainData {
    pub record_id: RecordId,
    /// Current content address.
    pub cid: ContentAddress,
    pub cid_history: Vec<ContentAddress>,
    /// Current owner.
    pub owner: Address,
    pub owners: Vec<Address>,
    pub version: u64,
    pub created_at: u64,
    pub updated_at: u64,
}

impl BlockchainData {
    /// Build from an existing record. Returns `None` for empty histories.
    pub fn from_record(record_id: RecordId, record: RecordState) -> Option<Self> {
        let cid = record.current_content_address()?.clone();
        let owner = record.current_owner().cloned().unwrap_or_default();
        let version = record.version();
        Some(Self {
            record_id,
            cid,
            cid_history: record.content_address_history,
            owner,
            owners: record.owner_history,
            version,
            created_at: record.created_at,
            updated_at: record.updated_at,
        })
    }
}

/// Result of resolving a DID.
///
/// Ledger data is always present. Metadata retrieval is best-effort: when
/// it fails, `content_metadata` is null and `content_fetch_error` says why.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Resolution {
    pub did: String,
    pub blockchain_data: BlockchainData,
    pub content_metadata: Option<Value>,
    pub content_fetch_error: Option<String>,
}

impl Resolution {
    pub fn is_complete(&self) -> bool {
        self.content_metadata.is_some()
    }
}

/// Result of a confirmed metadata update.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Updated {
    pub did: String,
    pub tx_id: TxId,
    pub new_address: ContentAddress,
    pub previous_address: ContentAddress,
    pub version: u64,
    pub metadata: Metadata,
}

/// Result of a confirmed ownership transfer, read back after the commit.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transferred {
    pub did: String,
    pub tx_id: TxId,
    /// Second-to-last owner, or [`NO_PREVIOUS_OWNER`].
    pub previous_owner: String,
    pub new_owner: Address,
    pub current_owner: Address,
    pub total_owners: usize,
}
