//! Content store client for the art DID registry.
//!
//! Metadata blobs live in an external content-addressed network. This crate
//! uploads them to the node the registry operates and reads them back with
//! an ordered, timeout-bounded fallback across public gateways.
//!
//! # Sources
//!
//! All read sources implement [`ContentSource`]; the writable node also
//! implements [`ContentNode`]:
//!
//! - [`InMemoryContentNode`] -- hash-keyed local node for tests and embedding
//! - [`HttpContentNode`] -- content-network node HTTP API (`/api/v0/add`, `/api/v0/cat`)
//! - [`HttpGateway`] -- read-only public gateway (`/ipfs/<address>`)
//!
//! # Design Rules
//!
//! 1. Uploads go to the operated node only; mirrors are never written.
//! 2. Identical bytes always produce the identical address.
//! 3. Reads try the node first, then each fallback in priority order.
//! 4. Every source attempt carries its own timeout; attempts never overlap.
//! 5. Nothing is retried automatically.

pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod memory;
pub mod traits;

pub use client::ContentStoreClient;
pub use config::{StoreClientConfig, DEFAULT_FALLBACK_GATEWAYS};
pub use error::{FetchAttempt, StoreError, StoreResult};
pub use http::{HttpContentNode, HttpGateway};
pub use memory::InMemoryContentNode;
pub use traits::{ContentNode, ContentSource};
