use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use artdid_types::{Address, ContentAddress, RecordId, RecordState, TxId};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::config::LedgerConfig;
use crate::error::{LedgerError, LedgerResult};
use crate::transport::{
    revert, LedgerQuery, LedgerTransaction, LedgerTransport, QueryResponse, TxReceipt, TxStatus,
};

/// Outcome of a confirmed registration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Registration {
    pub record_id: RecordId,
    pub tx_id: TxId,
}

/// Typed seam over the registry ledger.
///
/// Translates domain operations into ledger queries and transactions,
/// bounds every call with a timeout, waits for finality on commits, and
/// decodes receipts and revert reasons into [`LedgerError`] variants.
/// Mutations are submitted exactly once; a timeout is reported, never
/// retried.
#[derive(Clone)]
pub struct LedgerGateway {
    transport: Arc<dyn LedgerTransport>,
    config: LedgerConfig,
}

impl LedgerGateway {
    pub fn new(transport: Arc<dyn LedgerTransport>, config: LedgerConfig) -> Self {
        Self { transport, config }
    }

    /// Account the gateway transacts as.
    pub fn signer(&self) -> &Address {
        self.transport.signer()
    }

    pub fn config(&self) -> &LedgerConfig {
        &self.config
    }

    pub async fn exists(&self, record_id: &RecordId) -> LedgerResult<bool> {
        let query = LedgerQuery::RecordExists {
            record_id: record_id.clone(),
        };
        match self.query("exists", &query).await? {
            QueryResponse::Bool(exists) => Ok(exists),
            other => Err(unexpected("exists", &other)),
        }
    }

    /// Full record state. Fails with `RecordNotFound` when the ledger
    /// reports an empty content history.
    pub async fn get_full(&self, record_id: &RecordId) -> LedgerResult<RecordState> {
        let query = LedgerQuery::GetRecord {
            record_id: record_id.clone(),
        };
        match self.query("getFull", &query).await? {
            QueryResponse::Record(record) if record.exists() => Ok(record),
            QueryResponse::Record(_) => Err(LedgerError::RecordNotFound(record_id.clone())),
            other => Err(unexpected("getFull", &other)),
        }
    }

    /// Last owner in the history, or the empty address if there is none.
    pub async fn current_owner(&self, record_id: &RecordId) -> LedgerResult<Address> {
        let query = LedgerQuery::CurrentOwner {
            record_id: record_id.clone(),
        };
        match self.query("currentOwner", &query).await? {
            QueryResponse::Address(owner) => Ok(owner),
            other => Err(unexpected("currentOwner", &other)),
        }
    }

    /// Whether `address` appears anywhere in the ownership history.
    pub async fn is_owner(&self, record_id: &RecordId, address: &Address) -> LedgerResult<bool> {
        let query = LedgerQuery::IsOwner {
            record_id: record_id.clone(),
            address: address.clone(),
        };
        match self.query("isOwner", &query).await? {
            QueryResponse::Bool(owned) => Ok(owned),
            other => Err(unexpected("isOwner", &other)),
        }
    }

    /// Register a new record and wait for finality.
    ///
    /// The record id comes from the ledger's `RecordRegistered` event.
    pub async fn register(&self, content_address: &ContentAddress) -> LedgerResult<Registration> {
        let transaction = LedgerTransaction::RegisterRecord {
            content_address: content_address.clone(),
        };
        let receipt = self.commit(&transaction).await?;
        let record_id = receipt.registered_record_id().cloned().ok_or_else(|| {
            LedgerError::unavailable(format!(
                "register: receipt {} carries no RecordRegistered event",
                receipt.tx_id
            ))
        })?;
        info!(record_id = %record_id, tx = %receipt.tx_id, content_address = %content_address, "record registered");
        Ok(Registration {
            record_id,
            tx_id: receipt.tx_id,
        })
    }

    /// Append `content_address` to the content history.
    ///
    /// The ledger rejects the write unless the history still holds
    /// `expected_length` entries, and rejects unknown record ids at commit
    /// time.
    pub async fn update(
        &self,
        record_id: &RecordId,
        content_address: &ContentAddress,
        expected_length: u64,
    ) -> LedgerResult<TxId> {
        let transaction = LedgerTransaction::UpdateContent {
            record_id: record_id.clone(),
            content_address: content_address.clone(),
            expected_length,
        };
        let receipt = self.commit(&transaction).await?;
        info!(record_id = %record_id, tx = %receipt.tx_id, content_address = %content_address, "content updated");
        Ok(receipt.tx_id)
    }

    /// Append `new_owner` to the ownership history. The ledger checks that
    /// the signer is the current owner and that `new_owner` never owned the
    /// record.
    pub async fn transfer_ownership(
        &self,
        record_id: &RecordId,
        new_owner: &Address,
    ) -> LedgerResult<TxId> {
        let transaction = LedgerTransaction::TransferOwnership {
            record_id: record_id.clone(),
            new_owner: new_owner.clone(),
        };
        let receipt = self.commit(&transaction).await?;
        info!(record_id = %record_id, tx = %receipt.tx_id, new_owner = %new_owner, "ownership transferred");
        Ok(receipt.tx_id)
    }

    async fn query(&self, operation: &str, query: &LedgerQuery) -> LedgerResult<QueryResponse> {
        debug!(operation, ?query, "ledger query");
        bounded(self.config.call_timeout, self.transport.query(query))
            .await
            .map_err(|e| e.context(operation))
    }

    /// Submit once, then block until the receipt reaches the configured depth.
    async fn commit(&self, transaction: &LedgerTransaction) -> LedgerResult<TxReceipt> {
        let operation = transaction.name();
        let tx_id = bounded(self.config.call_timeout, self.transport.submit(transaction))
            .await
            .map_err(|e| e.context(operation))?;
        debug!(operation, tx = %tx_id, "transaction submitted, awaiting finality");

        let receipt = bounded(
            self.config.confirmation_timeout,
            self.transport
                .wait_for_receipt(&tx_id, self.config.confirmations),
        )
        .await
        .map_err(|e| e.context(&format!("{operation} {tx_id}")))?;

        if receipt.tx_id != tx_id {
            return Err(LedgerError::unavailable(format!(
                "{operation}: receipt for {} returned while awaiting {tx_id}",
                receipt.tx_id
            )));
        }
        if receipt.confirmations < self.config.confirmations {
            return Err(LedgerError::unavailable(format!(
                "{operation}: {tx_id} has {} of {} confirmations",
                receipt.confirmations, self.config.confirmations
            )));
        }

        match &receipt.status {
            TxStatus::Confirmed => Ok(receipt),
            TxStatus::Reverted { reason } => {
                warn!(operation, tx = %tx_id, reason = %reason, "transaction reverted");
                Err(decode_revert(reason, self.signer(), transaction))
            }
        }
    }
}

impl std::fmt::Debug for LedgerGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LedgerGateway")
            .field("signer", self.signer())
            .field("config", &self.config)
            .finish()
    }
}

async fn bounded<T>(
    after: Duration,
    call: impl Future<Output = LedgerResult<T>>,
) -> LedgerResult<T> {
    tokio::time::timeout(after, call)
        .await
        .map_err(|_| LedgerError::unavailable(format!("timed out after {after:?}")))?
}

fn unexpected(operation: &str, response: &QueryResponse) -> LedgerError {
    LedgerError::unavailable(format!(
        "{operation}: unexpected {} response",
        response.kind()
    ))
}

/// Map a revert reason to a typed error, filling in the transaction's ids.
fn decode_revert(reason: &str, signer: &Address, transaction: &LedgerTransaction) -> LedgerError {
    let record_id = match transaction {
        LedgerTransaction::RegisterRecord { .. } => None,
        LedgerTransaction::UpdateContent { record_id, .. }
        | LedgerTransaction::TransferOwnership { record_id, .. } => Some(record_id.clone()),
    };

    match (record_id, transaction) {
        (Some(record_id), _) if reason.contains(revert::RECORD_NOT_FOUND) => {
            LedgerError::RecordNotFound(record_id)
        }
        (Some(record_id), _) if reason.contains(revert::NOT_CURRENT_OWNER) => {
            LedgerError::OwnerAuthorizationDenied {
                record_id,
                caller: signer.clone(),
            }
        }
        (Some(record_id), LedgerTransaction::TransferOwnership { new_owner, .. })
            if reason.contains(revert::ALREADY_OWNER) =>
        {
            LedgerError::DuplicateOwner {
                record_id,
                owner: new_owner.clone(),
            }
        }
        (Some(record_id), LedgerTransaction::UpdateContent { expected_length, .. })
            if reason.contains(revert::STALE_HISTORY) =>
        {
            LedgerError::VersionConflict {
                record_id,
                expected: *expected_length,
            }
        }
        _ => LedgerError::unavailable(format!(
            "{} reverted: {reason}",
            transaction.name()
        )),
    }
}
