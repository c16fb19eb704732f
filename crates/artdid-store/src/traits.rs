use artdid_types::ContentAddress;
use async_trait::async_trait;

use crate::error::StoreResult;

/// Read side of a content-addressed source.
///
/// Implementations must treat content as opaque bytes and must not retry
/// internally; the client owns timeout and fallback policy.
#[async_trait]
pub trait ContentSource: Send + Sync {
    /// Human-readable source name used in logs and error reports.
    fn name(&self) -> &str;

    /// Fetch the bytes stored under `address`.
    async fn fetch(&self, address: &ContentAddress) -> StoreResult<Vec<u8>>;
}

/// A content node that also accepts uploads.
#[async_trait]
pub trait ContentNode: ContentSource {
    /// Store `data` and return its content address.
    ///
    /// Uploading the same bytes twice is a no-op and yields the same address.
    async fn add(&self, data: &[u8]) -> StoreResult<ContentAddress>;
}
