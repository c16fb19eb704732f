use artdid_ledger::LedgerGateway;
use artdid_store::ContentStoreClient;
use artdid_types::{format_did, parse_did, Address, ContentAddress, Metadata};
use serde_json::Value;
use tracing::{info, warn};

use crate::error::{RegistryError, RegistryResult};
use crate::outcome::{
    BlockchainData, Registered, Resolution, Transferred, Updated, NO_PREVIOUS_OWNER,
};

/// Record orchestrator.
///
/// Composes the ledger gateway and the content store client into the
/// registry workflows. Each workflow is a straight validate, act, reshape
/// sequence with no state carried between calls; the two handles are built
/// once at startup and shared read-only.
#[derive(Clone)]
pub struct Registry {
    ledger: LedgerGateway,
    store: ContentStoreClient,
}

impl Registry {
    pub fn new(ledger: LedgerGateway, store: ContentStoreClient) -> Self {
        Self { ledger, store }
    }

    pub fn ledger(&self) -> &LedgerGateway {
        &self.ledger
    }

    pub fn store(&self) -> &ContentStoreClient {
        &self.store
    }

    // ---- Register ----

    /// Upload metadata, register its address on the ledger, and return the
    /// new DID. The record id is the one the ledger confirmed.
    pub async fn register(&self, metadata: Value) -> RegistryResult<Registered> {
        let metadata = Metadata::from_value(metadata)?;
        let bytes = metadata.to_bytes()?;

        let content_address = self.store.put(&bytes).await?;
        let registration = self.ledger.register(&content_address).await?;
        let did = format_did(&registration.record_id);

        info!(did = %did, tx = %registration.tx_id, content_address = %content_address, "artwork registered");
        Ok(Registered {
            did,
            tx_id: registration.tx_id,
            content_url: self.store.content_url(&content_address),
            content_address,
            metadata,
        })
    }

    // ---- Resolve ----

    /// Resolve a DID to its ledger record and, best-effort, its metadata.
    pub async fn resolve(&self, did: &str) -> RegistryResult<Resolution> {
        let record_id = parse_did(did)?;
        let record = self.ledger.get_full(&record_id).await?;
        let blockchain_data = BlockchainData::from_record(record_id.clone(), record)
            .ok_or_else(|| RegistryError::RecordNotFound(record_id.clone()))?;

        let (content_metadata, content_fetch_error) =
            match self.fetch_metadata(&blockchain_data.cid).await {
                Ok(value) => (Some(value), None),
                Err(reason) => {
                    warn!(did = %did, cid = %blockchain_data.cid, reason = %reason, "resolved without metadata");
                    (None, Some(reason))
                }
            };

        info!(did = %did, version = blockchain_data.version, metadata = content_metadata.is_some(), "did resolved");
        Ok(Resolution {
            did: did.to_string(),
            blockchain_data,
            content_metadata,
            content_fetch_error,
        })
    }

    async fn fetch_metadata(&self, address: &ContentAddress) -> Result<Value, String> {
        let bytes = self.store.get(address).await.map_err(|e| e.to_string())?;
        serde_json::from_slice(&bytes)
            .map_err(|e| format!("content at {address} is not valid JSON: {e}"))
    }

    // ---- Check ----

    /// Whether the DID names a registered record.
    pub async fn check(&self, did: &str) -> RegistryResult<bool> {
        let record_id = parse_did(did)?;
        Ok(self.ledger.exists(&record_id).await?)
    }

    // ---- Update ----

    /// Store a new metadata version and append its address to the record.
    ///
    /// The version is derived from the history length read here; the ledger
    /// rejects the commit if another update landed in between.
    pub async fn update(&self, did: &str, metadata: Value) -> RegistryResult<Updated> {
        let record_id = parse_did(did)?;
        let metadata = Metadata::from_value(metadata)?;

        let record = self.ledger.get_full(&record_id).await?;
        let current_length = record.version();
        let previous_address = record
            .current_content_address()
            .cloned()
            .ok_or_else(|| RegistryError::RecordNotFound(record_id.clone()))?;

        let version = current_length + 1;
        let versioned = metadata.with_version(version, current_length);
        let new_address = self.store.put(&versioned.to_bytes()?).await?;
        let tx_id = self
            .ledger
            .update(&record_id, &new_address, current_length)
            .await?;

        info!(did = %did, tx = %tx_id, version, new_address = %new_address, "metadata updated");
        Ok(Updated {
            did: did.to_string(),
            tx_id,
            new_address,
            previous_address,
            version,
            metadata: versioned,
        })
    }

    // ---- Transfer ----

    /// Transfer ownership to `new_owner`, then report the ledger's
    /// post-commit view of the ownership history.
    pub async fn transfer(&self, did: &str, new_owner: &str) -> RegistryResult<Transferred> {
        let record_id = parse_did(did)?;
        let new_owner = Address::parse(new_owner)?;

        let tx_id = self.ledger.transfer_ownership(&record_id, &new_owner).await?;

        let record = self.ledger.get_full(&record_id).await?;
        let current_owner = self.ledger.current_owner(&record_id).await?;
        let previous_owner = record
            .previous_owner()
            .map(|owner| owner.to_string())
            .unwrap_or_else(|| NO_PREVIOUS_OWNER.to_string());

        info!(did = %did, tx = %tx_id, from = %previous_owner, to = %new_owner, "ownership transferred");
        Ok(Transferred {
            did: did.to_string(),
            tx_id,
            previous_owner,
            new_owner,
            current_owner,
            total_owners: record.owner_history.len(),
        })
    }
}
