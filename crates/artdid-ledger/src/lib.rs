//! Ledger gateway for the art DID registry.
//!
//! The ledger is the sole source of truth for registry records. This crate
//! provides:
//! - `LedgerTransport`, the raw query/submit/receipt boundary to a ledger
//! - `LedgerGateway`, the typed seam that bounds calls, waits for finality,
//!   and decodes receipts and revert reasons into `LedgerError`
//! - `InMemoryLedger`, a registry contract for tests and embedding
//! - `HttpLedgerTransport`, a JSON client for a ledger node bridge

pub mod config;
pub mod error;
pub mod gateway;
pub mod http;
pub mod memory;
pub mod transport;

pub use config::LedgerConfig;
pub use error::{LedgerError, LedgerResult};
pub use gateway::{LedgerGateway, Registration};
pub use http::{HttpLedgerTransport, SubmitRequest, SubmitResponse};
pub use memory::{InMemoryConnection, InMemoryLedger, DEFAULT_RECEIPT_LIMIT};
pub use transport::{
    LedgerEvent, LedgerQuery, LedgerTransaction, LedgerTransport, QueryResponse, TxReceipt,
    TxStatus,
};
