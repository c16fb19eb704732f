use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use artdid_types::ContentAddress;
use tracing::{debug, info, warn};

use crate::config::StoreClientConfig;
use crate::error::{FetchAttempt, StoreError, StoreResult};
use crate::traits::{ContentNode, ContentSource};

/// Content store client: uploads to the operated node, reads with fallback.
///
/// The client holds only shared, read-only handles and is built once at
/// startup.
#[derive(Clone)]
pub struct ContentStoreClient {
    node: Arc<dyn ContentNode>,
    fallbacks: Vec<Arc<dyn ContentSource>>,
    config: StoreClientConfig,
}

impl ContentStoreClient {
    pub fn new(node: Arc<dyn ContentNode>, config: StoreClientConfig) -> Self {
        Self {
            node,
            fallbacks: Vec::new(),
            config,
        }
    }

    /// Append a fallback source. Sources are tried in insertion order.
    pub fn with_fallback(mut self, source: Arc<dyn ContentSource>) -> Self {
        self.fallbacks.push(source);
        self
    }

    pub fn config(&self) -> &StoreClientConfig {
        &self.config
    }

    pub fn fallback_names(&self) -> Vec<&str> {
        self.fallbacks.iter().map(|s| s.name()).collect()
    }

    /// Upload `data` to the operated node and return its content address.
    pub async fn put(&self, data: &[u8]) -> StoreResult<ContentAddress> {
        if data.is_empty() {
            return Err(StoreError::InvalidInput("refusing to store empty content".into()));
        }

        let name = self.node.name().to_string();
        let result = bounded(&name, self.config.upload_timeout, self.node.add(data)).await;
        match result {
            Ok(address) => {
                info!(node = %name, address = %address, bytes = data.len(), "content stored");
                Ok(address)
            }
            Err(e) => {
                warn!(node = %name, error = %e, "content upload failed");
                Err(StoreError::Unavailable {
                    reason: e.to_string(),
                })
            }
        }
    }

    /// Fetch content by address.
    ///
    /// Tries the operated node first, then each fallback in priority order,
    /// one at a time, stopping at the first success.
    pub async fn get(&self, address: &ContentAddress) -> StoreResult<Vec<u8>> {
        let mut attempts = Vec::with_capacity(1 + self.fallbacks.len());

        let name = self.node.name().to_string();
        match bounded(&name, self.config.primary_timeout, self.node.fetch(address)).await {
            Ok(bytes) => {
                debug!(source = %name, address = %address, "content served by node");
                return Ok(bytes);
            }
            Err(e) => {
                warn!(source = %name, address = %address, error = %e, "node fetch failed, trying fallbacks");
                attempts.push(FetchAttempt {
                    source: name,
                    error: e.to_string(),
                });
            }
        }

        for source in &self.fallbacks {
            let name = source.name().to_string();
            match bounded(&name, self.config.fallback_timeout, source.fetch(address)).await {
                Ok(bytes) => {
                    info!(source = %name, address = %address, failed = attempts.len(), "content served by fallback");
                    return Ok(bytes);
                }
                Err(e) => {
                    warn!(source = %name, address = %address, error = %e, "fallback fetch failed");
                    attempts.push(FetchAttempt {
                        source: name,
                        error: e.to_string(),
                    });
                }
            }
        }

        Err(StoreError::FetchExhausted {
            address: address.clone(),
            attempts,
        })
    }

    /// Shareable URL of the content on the public gateway.
    pub fn content_url(&self, address: &ContentAddress) -> String {
        format!(
            "{}/ipfs/{address}",
            self.config.public_gateway_url.trim_end_matches('/')
        )
    }
}

async fn bounded<T>(
    name: &str,
    after: Duration,
    call: impl Future<Output = StoreResult<T>>,
) -> StoreResult<T> {
    tokio::time::timeout(after, call)
        .await
        .map_err(|_| StoreError::Timeout {
            name: name.to_string(),
            after,
        })?
}

impl std::fmt::Debug for ContentStoreClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContentStoreClient")
            .field("node", &self.node.name())
            .field("fallbacks", &self.fallback_names())
            .field("config", &self.config)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::InMemoryContentNode;
    use async_trait::async_trait;
    use std::time::Instant;

    /// Source that never answers within any reasonable bound.
    struct Stalled {
        name: String,
    }

    #[async_trait]
    impl ContentSource for Stalled {
        fn name(&self) -> &str {
            &self.name
        }

        async fn fetch(&self, _address: &ContentAddress) -> StoreResult<Vec<u8>> {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok(Vec::new())
        }
    }

    #[async_trait]
    impl ContentNode for Stalled {
        async fn add(&self, _data: &[u8]) -> StoreResult<ContentAddress> {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok(ContentAddress::new("never"))
        }
    }

    fn fast_config() -> StoreClientConfig {
        StoreClientConfig {
            primary_timeout: Duration::from_millis(100),
            fallback_timeout: Duration::from_millis(50),
            upload_timeout: Duration::from_millis(100),
            ..Default::default()
        }
    }

    fn stalled(name: &str) -> Arc<Stalled> {
        Arc::new(Stalled { name: name.into() })
    }

    #[tokio::test]
    async fn put_then_get_from_node() {
        let node = Arc::new(InMemoryContentNode::new());
        let client = ContentStoreClient::new(node, fast_config());
        let address = client.put(b"{\"title\":\"X\"}").await.unwrap();
        assert_eq!(client.get(&address).await.unwrap(), b"{\"title\":\"X\"}");
    }

    #[tokio::test]
    async fn put_is_deterministic() {
        let client = ContentStoreClient::new(Arc::new(InMemoryContentNode::new()), fast_config());
        let a1 = client.put(b"same bytes").await.unwrap();
        let a2 = client.put(b"same bytes").await.unwrap();
        let a3 = client.put(b"other bytes").await.unwrap();
        assert_eq!(a1, a2);
        assert_ne!(a1, a3);
    }

    #[tokio::test]
    async fn put_rejects_empty_payload() {
        let node = Arc::new(InMemoryContentNode::new());
        let client = ContentStoreClient::new(node.clone(), fast_config());
        let err = client.put(b"").await.unwrap_err();
        assert!(matches!(err, StoreError::InvalidInput(_)));
        assert!(node.is_empty());
    }

    #[tokio::test]
    async fn put_failure_is_unavailable_and_not_mirrored() {
        let node = Arc::new(InMemoryContentNode::new());
        node.set_online(false);
        let mirror = Arc::new(InMemoryContentNode::named("mirror"));
        let client = ContentStoreClient::new(node, fast_config()).with_fallback(mirror.clone());
        let err = client.put(b"data").await.unwrap_err();
        assert!(matches!(err, StoreError::Unavailable { .. }));
        assert!(mirror.is_empty());
    }

    #[tokio::test]
    async fn put_timeout_is_unavailable() {
        let client = ContentStoreClient::new(stalled("node"), fast_config());
        let err = client.put(b"data").await.unwrap_err();
        assert!(err.to_string().contains("timed out"));
    }

    #[tokio::test]
    async fn first_successful_fallback_short_circuits() {
        let node = Arc::new(InMemoryContentNode::named("node"));
        node.set_online(false);
        let first = Arc::new(InMemoryContentNode::named("first"));
        let second = Arc::new(InMemoryContentNode::named("second"));
        let address = first.insert(b"from-first").unwrap();
        second.insert(b"from-first").unwrap();

        let client = ContentStoreClient::new(node.clone(), fast_config())
            .with_fallback(first.clone())
            .with_fallback(second.clone());

        assert_eq!(client.get(&address).await.unwrap(), b"from-first");
        assert_eq!(node.fetch_count(), 1);
        assert_eq!(first.fetch_count(), 1);
        assert_eq!(second.fetch_count(), 0);
    }

    #[tokio::test]
    async fn fallbacks_are_tried_in_priority_order() {
        let node = Arc::new(InMemoryContentNode::named("node"));
        let empty = Arc::new(InMemoryContentNode::named("empty"));
        let holder = Arc::new(InMemoryContentNode::named("holder"));
        let address = holder.insert(b"payload").unwrap();

        let client = ContentStoreClient::new(node, fast_config())
            .with_fallback(empty.clone())
            .with_fallback(holder.clone());

        assert_eq!(client.get(&address).await.unwrap(), b"payload");
        assert_eq!(empty.fetch_count(), 1);
        assert_eq!(holder.fetch_count(), 1);
    }

    #[tokio::test]
    async fn stalled_node_falls_back_after_timeout() {
        let mirror = Arc::new(InMemoryContentNode::named("mirror"));
        let address = mirror.insert(b"mirrored").unwrap();
        let client = ContentStoreClient::new(stalled("node"), fast_config()).with_fallback(mirror);

        let started = Instant::now();
        assert_eq!(client.get(&address).await.unwrap(), b"mirrored");
        assert!(started.elapsed() >= Duration::from_millis(100));
    }

    #[tokio::test]
    async fn all_sources_failing_is_exhausted_within_bound() {
        let config = fast_config();
        let client = ContentStoreClient::new(stalled("node"), config.clone())
            .with_fallback(stalled("g1"))
            .with_fallback(stalled("g2"))
            .with_fallback(Arc::new(InMemoryContentNode::named("g3")));

        let started = Instant::now();
        let err = client.get(&ContentAddress::new("Qm123")).await.unwrap_err();
        let elapsed = started.elapsed();

        match err {
            StoreError::FetchExhausted { attempts, .. } => {
                let names: Vec<_> = attempts.iter().map(|a| a.source.as_str()).collect();
                assert_eq!(names, ["node", "g1", "g2", "g3"]);
            }
            other => panic!("expected FetchExhausted, got {other:?}"),
        }
        let bound = config.max_fetch_latency(3);
        assert!(elapsed >= Duration::from_millis(200));
        assert!(elapsed < bound + Duration::from_millis(500), "took {elapsed:?}");
    }

    #[tokio::test]
    async fn no_fallbacks_exhausts_after_node() {
        let client = ContentStoreClient::new(Arc::new(InMemoryContentNode::new()), fast_config());
        let err = client.get(&ContentAddress::new("Qm-missing")).await.unwrap_err();
        assert!(matches!(err, StoreError::FetchExhausted { ref attempts, .. } if attempts.len() == 1));
    }

    #[test]
    fn content_url_uses_public_gateway() {
        let config = StoreClientConfig {
            public_gateway_url: "https://gateway.example/".into(),
            ..Default::default()
        };
        let client = ContentStoreClient::new(Arc::new(InMemoryContentNode::new()), config);
        assert_eq!(
            client.content_url(&ContentAddress::new("Qm123")),
            "https://gateway.example/ipfs/Qm123"
        );
    }
}
