//! Record orchestrator for the art DID registry.
//!
//! [`Registry`] composes the ledger gateway and the content store client
//! into the four record workflows (register, resolve, update, transfer)
//! plus the existence check. Every workflow validates its input before any
//! network call, so malformed requests never produce side effects.

pub mod error;
pub mod outcome;
pub mod registry;

pub use error::{ErrorKind, RegistryError, RegistryResult};
pub use outcome::{
    BlockchainData, Registered, Resolution, Transferred, Updated, NO_PREVIOUS_OWNER,
};
pub use registry::Registry;

// Re-export the types callers need to build and drive a registry
pub use artdid_ledger::{LedgerConfig, LedgerGateway};
pub use artdid_store::{ContentStoreClient, StoreClientConfig};
pub use artdid_types::{format_did, parse_did, Address, ContentAddress, Metadata, RecordId, TxId};
