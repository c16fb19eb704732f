use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::RwLock;

use artdid_types::ContentAddress;
use async_trait::async_trait;

use crate::error::{StoreError, StoreResult};
use crate::traits::{ContentNode, ContentSource};

/// In-memory, HashMap-based content node.
///
/// Addresses are BLAKE3-derived ([`ContentAddress::derive`]). The node can
/// be switched offline to simulate an outage, and counts fetch attempts so
/// callers can observe fallback behaviour.
pub struct InMemoryContentNode {
    name: String,
    blobs: RwLock<HashMap<ContentAddress, Vec<u8>>>,
    online: AtomicBool,
    fetches: AtomicUsize,
}

impl InMemoryContentNode {
    pub fn new() -> Self {
        Self::named("memory")
    }

    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            blobs: RwLock::new(HashMap::new()),
            online: AtomicBool::new(true),
            fetches: AtomicUsize::new(0),
        }
    }

    /// Toggle simulated availability. Offline nodes fail every call.
    pub fn set_online(&self, online: bool) {
        self.online.store(online, Ordering::SeqCst);
    }

    /// Store bytes directly, bypassing availability. Used to seed mirrors.
    pub fn insert(&self, data: &[u8]) -> StoreResult<ContentAddress> {
        let address = ContentAddress::derive(data);
        let mut blobs = self.blobs.write().map_err(|_| self.poisoned())?;
        blobs.entry(address.clone()).or_insert_with(|| data.to_vec());
        Ok(address)
    }

    /// Number of blobs currently stored.
    pub fn len(&self) -> usize {
        self.blobs.read().map(|b| b.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of `fetch` calls received, including failed ones.
    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }

    fn ensure_online(&self) -> StoreResult<()> {
        if self.online.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(StoreError::request(&self.name, "node offline"))
        }
    }

    fn poisoned(&self) -> StoreError {
        StoreError::request(&self.name, "blob map lock poisoned")
    }
}

impl Default for InMemoryContentNode {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ContentSource for InMemoryContentNode {
    fn name(&self) -> &str {
        &self.name
    }

    async fn fetch(&self, address: &ContentAddress) -> StoreResult<Vec<u8>> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        self.ensure_online()?;
        let blobs = self.blobs.read().map_err(|_| self.poisoned())?;
        blobs.get(address).cloned().ok_or_else(|| StoreError::NotFound {
            name: self.name.clone(),
            address: address.clone(),
        })
    }
}

#[async_trait]
impl ContentNode for InMemoryContentNode {
    async fn add(&self, data: &[u8]) -> StoreResult<ContentAddress> {
        self.ensure_online()?;
        self.insert(data)
    }
}

impl std::fmt::Debug for InMemoryContentNode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryContentNode")
            .field("name", &self.name)
            .field("blob_count", &self.len())
            .finish()
    }
}
