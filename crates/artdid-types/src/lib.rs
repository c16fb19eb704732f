//! Foundation types for the art DID registry.
//!
//! Every other `artdid` crate depends on this one. It holds the pure,
//! side-effect-free pieces of the system: the DID codec and the value types
//! that flow between the orchestrator, the ledger gateway, and the content
//! store client.
//!
//! # Key Types
//!
//! - [`Did`]: `did:art:hkust:<recordId>` identifier with a lossless codec
//! - [`RecordId`]: opaque ledger-assigned record identifier
//! - [`ContentAddress`]: content-addressed identifier of a metadata blob
//! - [`Address`]: ledger account address (owners, signers)
//! - [`TxId`]: ledger transaction identifier
//! - [`Metadata`]: opaque JSON payload with a minimal shape check
//! - [`RecordState`]: full ledger view of a record's histories

pub mod address;
pub mod did;
pub mod error;
pub mod metadata;
pub mod millis;
pub mod record;

pub use address::{Address, ContentAddress, RecordId, TxId};
pub use did::{format_did, parse_did, Did, DID_METHOD, DID_NAMESPACE, DID_SCHEME};
pub use error::TypeError;
pub use metadata::Metadata;
pub use record::RecordState;
