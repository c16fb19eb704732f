use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};

use artdid_types::{Address, ContentAddress, RecordId, RecordState, TxId};
use async_trait::async_trait;
use tracing::debug;

use crate::error::{LedgerError, LedgerResult};
use crate::transport::{
    revert, LedgerEvent, LedgerQuery, LedgerTransaction, LedgerTransport, QueryResponse,
    TxReceipt, TxStatus,
};

/// In-memory registry ledger for tests, local demos, and embedding.
///
/// Behaves like the deployed registry contract: every transaction is
/// applied atomically under one write lock, mines its own block, and emits
/// the same events and revert reasons. Signers are bound per connection via
/// [`InMemoryLedger::connect`], so several callers can share one ledger.
///
/// Only the most recent receipts are retained (see
/// [`InMemoryLedger::with_receipt_limit`]); records are never pruned.
pub struct InMemoryLedger {
    inner: RwLock<LedgerState>,
    online: AtomicBool,
    receipt_limit: usize,
}

/// Receipts kept by default. Callers wait on a receipt right after
/// submitting, so only recent ones are ever looked up.
pub const DEFAULT_RECEIPT_LIMIT: usize = 4096;

#[derive(Default)]
struct LedgerState {
    records: HashMap<RecordId, RecordState>,
    receipts: HashMap<TxId, TxReceipt>,
    /// Receipt ids, oldest first, for eviction.
    receipt_order: VecDeque<TxId>,
    height: u64,
    nonce: u64,
}

impl InMemoryLedger {
    pub fn new() -> Self {
        Self::with_receipt_limit(DEFAULT_RECEIPT_LIMIT)
    }

    /// Ledger that keeps at most `limit` receipts, evicting the oldest.
    pub fn with_receipt_limit(limit: usize) -> Self {
        Self {
            inner: RwLock::new(LedgerState::default()),
            online: AtomicBool::new(true),
            receipt_limit: limit.max(1),
        }
    }

    /// Open a connection that signs transactions as `signer`.
    pub fn connect(self: &Arc<Self>, signer: Address) -> InMemoryConnection {
        InMemoryConnection {
            ledger: Arc::clone(self),
            signer,
        }
    }

    /// Toggle simulated availability. An offline ledger fails every call.
    pub fn set_online(&self, online: bool) {
        self.online.store(online, Ordering::SeqCst);
    }

    pub fn record_count(&self) -> usize {
        self.inner.read().map(|s| s.records.len()).unwrap_or(0)
    }

    /// Number of receipts currently retained.
    pub fn receipt_count(&self) -> usize {
        self.inner.read().map(|s| s.receipts.len()).unwrap_or(0)
    }

    /// Current chain height (one block per transaction).
    pub fn height(&self) -> u64 {
        self.inner.read().map(|s| s.height).unwrap_or(0)
    }

    fn ensure_online(&self) -> LedgerResult<()> {
        if self.online.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(LedgerError::unavailable("in-memory ledger offline"))
        }
    }

    fn read_state(&self) -> LedgerResult<std::sync::RwLockReadGuard<'_, LedgerState>> {
        self.inner
            .read()
            .map_err(|_| LedgerError::unavailable("ledger read lock poisoned"))
    }

    fn write_state(&self) -> LedgerResult<std::sync::RwLockWriteGuard<'_, LedgerState>> {
        self.inner
            .write()
            .map_err(|_| LedgerError::unavailable("ledger write lock poisoned"))
    }

    fn query(&self, query: &LedgerQuery) -> LedgerResult<QueryResponse> {
        self.ensure_online()?;
        let state = self.read_state()?;
        let record = |id: &RecordId| state.records.get(id);

        Ok(match query {
            LedgerQuery::RecordExists { record_id } => {
                QueryResponse::Bool(record(record_id).is_some_and(RecordState::exists))
            }
            // Unknown ids read as an empty record, the way contract storage does.
            LedgerQuery::GetRecord { record_id } => QueryResponse::Record(
                record(record_id).cloned().unwrap_or_else(|| RecordState {
                    content_address_history: vec![],
                    owner_history: vec![],
                    created_at: 0,
                    updated_at: 0,
                }),
            ),
            LedgerQuery::CurrentOwner { record_id } => QueryResponse::Address(
                record(record_id)
                    .and_then(RecordState::current_owner)
                    .cloned()
                    .unwrap_or_default(),
            ),
            LedgerQuery::IsOwner { record_id, address } => {
                QueryResponse::Bool(record(record_id).is_some_and(|r| r.has_owned(address)))
            }
        })
    }

    fn submit(&self, signer: &Address, transaction: &LedgerTransaction) -> LedgerResult<TxId> {
        self.ensure_online()?;
        let mut state = self.write_state()?;

        state.nonce += 1;
        state.height += 1;
        let nonce = state.nonce;
        let block_number = state.height;
        let tx_id = derive_tx_id(signer, nonce);

        let outcome = apply(&mut state, signer, nonce, transaction);
        let (status, events) = match outcome {
            Ok(events) => (TxStatus::Confirmed, events),
            Err(reason) => (
                TxStatus::Reverted {
                    reason: reason.to_string(),
                },
                vec![],
            ),
        };
        debug!(tx = %tx_id, method = transaction.name(), block = block_number, ?status, "transaction mined");

        state.receipts.insert(
            tx_id.clone(),
            TxReceipt {
                tx_id: tx_id.clone(),
                block_number,
                confirmations: 1,
                status,
                events,
            },
        );
        state.receipt_order.push_back(tx_id.clone());
        while state.receipt_order.len() > self.receipt_limit {
            if let Some(evicted) = state.receipt_order.pop_front() {
                state.receipts.remove(&evicted);
            }
        }
        Ok(tx_id)
    }

    fn wait_for_receipt(&self, tx_id: &TxId, confirmations: u64) -> LedgerResult<TxReceipt> {
        self.ensure_online()?;
        let mut state = self.write_state()?;

        let block_number = state
            .receipts
            .get(tx_id)
            .map(|r| r.block_number)
            .ok_or_else(|| LedgerError::unavailable(format!("unknown transaction {tx_id}")))?;

        // Mine empty blocks until the requested depth is reached.
        let target = block_number + confirmations.max(1) - 1;
        state.height = state.height.max(target);
        let depth = state.height - block_number + 1;

        let mut receipt = state
            .receipts
            .get(tx_id)
            .cloned()
            .ok_or_else(|| LedgerError::unavailable(format!("unknown transaction {tx_id}")))?;
        receipt.confirmations = depth;
        Ok(receipt)
    }
}

impl Default for InMemoryLedger {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for InMemoryLedger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryLedger")
            .field("record_count", &self.record_count())
            .field("height", &self.height())
            .finish()
    }
}

/// Apply one transaction to ledger state. Either every change lands or none.
fn apply(
    state: &mut LedgerState,
    signer: &Address,
    nonce: u64,
    transaction: &LedgerTransaction,
) -> Result<Vec<LedgerEvent>, &'static str> {
    let now = unix_now();
    match transaction {
        LedgerTransaction::RegisterRecord { content_address } => {
            if content_address.is_empty() {
                return Err(revert::EMPTY_CONTENT_ADDRESS);
            }
            let mut seed = Vec::new();
            seed.extend_from_slice(signer.as_str().as_bytes());
            seed.extend_from_slice(&nonce.to_be_bytes());
            seed.extend_from_slice(content_address.as_str().as_bytes());
            let record_id = RecordId::derive(&seed);

            state.records.insert(
                record_id.clone(),
                RecordState {
                    content_address_history: vec![content_address.clone()],
                    owner_history: vec![signer.clone()],
                    created_at: now,
                    updated_at: now,
                },
            );
            Ok(vec![LedgerEvent::RecordRegistered {
                record_id,
                owner: signer.clone(),
                content_address: content_address.clone(),
            }])
        }
        LedgerTransaction::UpdateContent {
            record_id,
            content_address,
            expected_length,
        } => {
            let record = existing(state, record_id)?;
            if content_address.is_empty() {
                return Err(revert::EMPTY_CONTENT_ADDRESS);
            }
            if record.version() != *expected_length {
                return Err(revert::STALE_HISTORY);
            }
            record.content_address_history.push(content_address.clone());
            record.updated_at = now;
            Ok(vec![LedgerEvent::ContentUpdated {
                record_id: record_id.clone(),
                content_address: content_address.clone(),
                version: record.version(),
            }])
        }
        LedgerTransaction::TransferOwnership {
            record_id,
            new_owner,
        } => {
            let record = existing(state, record_id)?;
            let current = record.current_owner().cloned().unwrap_or_default();
            if !current.same_as(signer) {
                return Err(revert::NOT_CURRENT_OWNER);
            }
            if record.has_owned(new_owner) {
                return Err(revert::ALREADY_OWNER);
            }
            record.owner_history.push(new_owner.clone());
            record.updated_at = now;
            Ok(vec![LedgerEvent::OwnershipTransferred {
                record_id: record_id.clone(),
                from: current,
                to: new_owner.clone(),
            }])
        }
    }
}

fn existing<'a>(
    state: &'a mut LedgerState,
    record_id: &RecordId,
) -> Result<&'a mut RecordState, &'static str> {
    state
        .records
        .get_mut(record_id)
        .filter(|r| r.exists())
        .ok_or(revert::RECORD_NOT_FOUND)
}

fn derive_tx_id(signer: &Address, nonce: u64) -> TxId {
    let mut hasher = blake3::Hasher::new();
    hasher.update(b"artdid-tx-v1:");
    hasher.update(signer.as_str().as_bytes());
    hasher.update(&nonce.to_be_bytes());
    TxId::new(format!("0x{}", hex::encode(hasher.finalize().as_bytes())))
}

fn unix_now() -> u64 {
    chrono::Utc::now().timestamp().max(0) as u64
}

/// Connection to an [`InMemoryLedger`] bound to one signer.
#[derive(Clone, Debug)]
pub struct InMemoryConnection {
    ledger: Arc<InMemoryLedger>,
    signer: Address,
}

impl InMemoryConnection {
    pub fn ledger(&self) -> &Arc<InMemoryLedger> {
        &self.ledger
    }
}

#[async_trait]
impl LedgerTransport for InMemoryConnection {
    fn signer(&self) -> &Address {
        &self.signer
    }

    async fn query(&self, query: &LedgerQuery) -> LedgerResult<QueryResponse> {
        self.ledger.query(query)
    }

    async fn submit(&self, transaction: &LedgerTransaction) -> LedgerResult<TxId> {
        self.ledger.submit(&self.signer, transaction)
    }

    async fn wait_for_receipt(&self, tx_id: &TxId, confirmations: u64) -> LedgerResult<TxReceipt> {
        self.ledger.wait_for_receipt(tx_id, confirmations)
    }
}
