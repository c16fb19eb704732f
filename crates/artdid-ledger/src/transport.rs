use artdid_types::{Address, ContentAddress, RecordId, RecordState, TxId};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::LedgerResult;

/// Revert reasons emitted by the registry contract.
///
/// The gateway decodes these into typed errors; any other reason is treated
/// as a ledger fault.
pub mod revert {
    pub const RECORD_NOT_FOUND: &str = "record does not exist";
    pub const NOT_CURRENT_OWNER: &str = "caller is not the current owner";
    pub const ALREADY_OWNER: &str = "new owner already in ownership history";
    pub const STALE_HISTORY: &str = "content history length mismatch";
    pub const EMPTY_CONTENT_ADDRESS: &str = "content address is empty";
}

/// Read-only calls against the registry.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "method", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum LedgerQuery {
    RecordExists { record_id: RecordId },
    GetRecord { record_id: RecordId },
    CurrentOwner { record_id: RecordId },
    IsOwner { record_id: RecordId, address: Address },
}

/// Decoded result of a [`LedgerQuery`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "camelCase")]
pub enum QueryResponse {
    Bool(bool),
    Record(RecordState),
    Address(Address),
}

impl QueryResponse {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Bool(_) => "bool",
            Self::Record(_) => "record",
            Self::Address(_) => "address",
        }
    }
}

/// State-mutating calls, signed by the transport's signer.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "method", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum LedgerTransaction {
    RegisterRecord {
        content_address: ContentAddress,
    },
    /// Append to the content history. The ledger rejects the write unless
    /// the history currently holds exactly `expected_length` entries.
    UpdateContent {
        record_id: RecordId,
        content_address: ContentAddress,
        expected_length: u64,
    },
    TransferOwnership {
        record_id: RecordId,
        new_owner: Address,
    },
}

impl LedgerTransaction {
    pub fn name(&self) -> &'static str {
        match self {
            Self::RegisterRecord { .. } => "registerRecord",
            Self::UpdateContent { .. } => "updateContent",
            Self::TransferOwnership { .. } => "transferOwnership",
        }
    }
}

/// Events emitted by confirmed transactions.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum LedgerEvent {
    RecordRegistered {
        record_id: RecordId,
        owner: Address,
        content_address: ContentAddress,
    },
    ContentUpdated {
        record_id: RecordId,
        content_address: ContentAddress,
        version: u64,
    },
    OwnershipTransferred {
        record_id: RecordId,
        from: Address,
        to: Address,
    },
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum TxStatus {
    Confirmed,
    Reverted { reason: String },
}

/// Final outcome of a submitted transaction.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TxReceipt {
    pub tx_id: TxId,
    pub block_number: u64,
    pub confirmations: u64,
    #[serde(flatten)]
    pub status: TxStatus,
    #[serde(default)]
    pub events: Vec<LedgerEvent>,
}

impl TxReceipt {
    pub fn is_confirmed(&self) -> bool {
        self.status == TxStatus::Confirmed
    }

    /// Record id announced by a `RecordRegistered` event, if any.
    pub fn registered_record_id(&self) -> Option<&RecordId> {
        self.events.iter().find_map(|event| match event {
            LedgerEvent::RecordRegistered { record_id, .. } => Some(record_id),
            _ => None,
        })
    }
}

/// Raw connection to the append-only ledger.
///
/// Implementations perform exactly one network exchange per call and never
/// retry. The gateway layers timeouts and result decoding on top.
#[async_trait]
pub trait LedgerTransport: Send + Sync {
    /// Account that signs submitted transactions.
    fn signer(&self) -> &Address;

    async fn query(&self, query: &LedgerQuery) -> LedgerResult<QueryResponse>;

    /// Submit a transaction and return its id without waiting for inclusion.
    async fn submit(&self, transaction: &LedgerTransaction) -> LedgerResult<TxId>;

    /// Block until `tx_id` is included with at least `confirmations` blocks.
    async fn wait_for_receipt(&self, tx_id: &TxId, confirmations: u64) -> LedgerResult<TxReceipt>;
}
