use std::sync::Arc;

use artdid_ledger::{HttpLedgerTransport, InMemoryLedger, LedgerGateway, LedgerTransport};
use artdid_registry::Registry;
use artdid_store::{ContentNode, ContentStoreClient, HttpContentNode, HttpGateway, InMemoryContentNode};
use artdid_types::Address;
use tokio::net::TcpListener;

use crate::config::{LedgerMode, NodeMode, ServerConfig};
use crate::error::{ServerError, ServerResult};
use crate::router::build_router;

/// Art DID registry server.
///
/// Ledger and content-store handles are built once from the config and
/// shared by every request.
pub struct ArtDidServer {
    config: ServerConfig,
    registry: Registry,
}

impl ArtDidServer {
    pub fn new(config: ServerConfig) -> ServerResult<Self> {
        config.validate()?;
        let registry = build_registry(&config)?;
        Ok(Self { config, registry })
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Build the router (useful for testing).
    pub fn router(&self) -> axum::Router {
        build_router(self.registry.clone())
    }

    /// Start serving requests.
    pub async fn serve(self) -> ServerResult<()> {
        let app = self.router();
        let listener = TcpListener::bind(&self.config.bind_addr).await?;
        tracing::info!(
            bind = %self.config.bind_addr,
            signer = %self.registry.ledger().signer(),
            "art DID registry listening"
        );
        axum::serve(listener, app)
            .await
            .map_err(|e| ServerError::Internal(e.to_string()))
    }
}

fn build_registry(config: &ServerConfig) -> ServerResult<Registry> {
    let signer = Address::parse(&config.ledger.signer)
        .map_err(|e| ServerError::Config(format!("ledger.signer: {e}")))?;

    let transport: Arc<dyn LedgerTransport> = match config.ledger.mode {
        LedgerMode::Memory => {
            tracing::warn!("using in-memory ledger; records are lost on restart");
            Arc::new(Arc::new(InMemoryLedger::new()).connect(signer))
        }
        LedgerMode::Http => {
            let endpoint = config
                .ledger
                .endpoint
                .as_deref()
                .ok_or_else(|| ServerError::Config("ledger.endpoint is required in http mode".into()))?;
            let transport = HttpLedgerTransport::new(endpoint, signer)
                .map_err(|e| ServerError::Config(format!("ledger.endpoint: {e}")))?;
            Arc::new(transport)
        }
    };
    let ledger = LedgerGateway::new(transport, config.ledger.client.clone());

    let node: Arc<dyn ContentNode> = match config.store.node {
        NodeMode::Memory => Arc::new(InMemoryContentNode::new()),
        NodeMode::Http => {
            let api_url = config.store.node_api_url.as_deref().ok_or_else(|| {
                ServerError::Config("store.node_api_url is required in http mode".into())
            })?;
            let node = HttpContentNode::new(api_url)
                .map_err(|e| ServerError::Config(format!("store.node_api_url: {e}")))?;
            Arc::new(node)
        }
    };
    let mut store = ContentStoreClient::new(node, config.store.client.clone());
    for url in &config.store.gateways {
        let gateway = HttpGateway::new(url)
            .map_err(|e| ServerError::Config(format!("store.gateways[{url}]: {e}")))?;
        store = store.with_fallback(Arc::new(gateway));
    }

    Ok(Registry::new(ledger, store))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LedgerSettings;

    #[test]
    fn server_construction() {
        let server = ArtDidServer::new(ServerConfig::default()).unwrap();
        assert_eq!(server.config().bind_addr, "127.0.0.1:8080".parse().unwrap());
        assert_eq!(server.registry().ledger().signer().as_str(), crate::config::DEFAULT_SIGNER);
        assert_eq!(
            server.registry().store().fallback_names(),
            vec!["ipfs.io", "gateway.pinata.cloud", "cloudflare-ipfs.com"]
        );
    }

    #[test]
    fn http_ledger_without_endpoint_fails() {
        let config = ServerConfig {
            ledger: LedgerSettings {
                mode: LedgerMode::Http,
                ..LedgerSettings::default()
            },
            ..ServerConfig::default()
        };
        assert!(matches!(ArtDidServer::new(config), Err(ServerError::Config(_))));
    }

    #[test]
    fn http_modes_build_remote_clients() {
        let config = ServerConfig::from_toml(
            r#"
            [ledger]
            mode = "http"
            endpoint = "http://127.0.0.1:8545"

            [store]
            node = "http"
            node_api_url = "http://127.0.0.1:5001"
            gateways = ["https://ipfs.io", "https://gateway.pinata.cloud"]
            "#,
        )
        .unwrap();
        let server = ArtDidServer::new(config).unwrap();
        assert_eq!(
            server.registry().store().fallback_names(),
            vec!["ipfs.io", "gateway.pinata.cloud"]
        );
    }

    #[test]
    fn router_builds() {
        let server = ArtDidServer::new(ServerConfig::default()).unwrap();
        let _router = server.router();
    }
}
