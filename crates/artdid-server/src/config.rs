use std::net::SocketAddr;
use std::path::Path;

use artdid_ledger::LedgerConfig;
use artdid_store::{StoreClientConfig, DEFAULT_FALLBACK_GATEWAYS};
use artdid_types::Address;
use serde::{Deserialize, Serialize};

use crate::error::{ServerError, ServerResult};

/// Signer used by the in-memory ledger when none is configured.
pub const DEFAULT_SIGNER: &str = "0x0000000000000000000000000000000000000001";

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind_addr: SocketAddr,
    pub ledger: LedgerSettings,
    pub store: StoreSettings,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 8080)),
            ledger: LedgerSettings::default(),
            store: StoreSettings::default(),
        }
    }
}

impl ServerConfig {
    /// Load a TOML config file. Absent keys fall back to defaults.
    pub fn load(path: impl AsRef<Path>) -> ServerResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| ServerError::Config(format!("reading {}: {e}", path.display())))?;
        Self::from_toml(&text)
    }

    pub fn from_toml(text: &str) -> ServerResult<Self> {
        let config: Self = toml::from_str(text).map_err(|e| ServerError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Reject combinations that cannot produce a working registry.
    pub fn validate(&self) -> ServerResult<()> {
        Address::parse(&self.ledger.signer)
            .map_err(|e| ServerError::Config(format!("ledger.signer: {e}")))?;
        if self.ledger.mode == LedgerMode::Http && self.ledger.endpoint.is_none() {
            return Err(ServerError::Config("ledger.endpoint is required in http mode".into()));
        }
        if self.store.node == NodeMode::Http && self.store.node_api_url.is_none() {
            return Err(ServerError::Config("store.node_api_url is required in http mode".into()));
        }
        Ok(())
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LedgerMode {
    /// Process-local ledger; state is lost on restart.
    #[default]
    Memory,
    /// JSON bridge to a ledger node.
    Http,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LedgerSettings {
    pub mode: LedgerMode,
    pub endpoint: Option<String>,
    /// Account that signs every mutation.
    pub signer: String,
    #[serde(flatten)]
    pub client: LedgerConfig,
}

impl Default for LedgerSettings {
    fn default() -> Self {
        Self {
            mode: LedgerMode::Memory,
            endpoint: None,
            signer: DEFAULT_SIGNER.to_string(),
            client: LedgerConfig::default(),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeMode {
    #[default]
    Memory,
    Http,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreSettings {
    pub node: NodeMode,
    pub node_api_url: Option<String>,
    /// Public gateways tried in order when the node cannot serve content.
    pub gateways: Vec<String>,
    #[serde(flatten)]
    pub client: StoreClientConfig,
}

impl Default for StoreSettings {
    fn default() -> Self {
        Self {
            node: NodeMode::Memory,
            node_api_url: None,
            gateways: DEFAULT_FALLBACK_GATEWAYS.iter().map(|g| g.to_string()).collect(),
            client: StoreClientConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn default_config() {
        let c = ServerConfig::default();
        assert_eq!(c.bind_addr, "127.0.0.1:8080".parse::<SocketAddr>().unwrap());
        assert_eq!(c.ledger.mode, LedgerMode::Memory);
        assert_eq!(c.store.node, NodeMode::Memory);
        assert_eq!(c.store.gateways.len(), 3);
        assert!(c.validate().is_ok());
    }

    #[test]
    fn empty_toml_is_default() {
        assert_eq!(ServerConfig::from_toml("").unwrap(), ServerConfig::default());
    }

    #[test]
    fn parse_full_toml() {
        let c = ServerConfig::from_toml(
            r#"
            bind_addr = "0.0.0.0:3000"

            [ledger]
            mode = "http"
            endpoint = "http://ledger.local:8545"
            signer = "0xaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa"
            call_timeout = 2000
            confirmations = 3

            [store]
            node = "http"
            node_api_url = "http://127.0.0.1:5001"
            gateways = ["https://ipfs.io"]
            fallback_timeout = 1500
            "#,
        )
        .unwrap();
        assert_eq!(c.bind_addr.port(), 3000);
        assert_eq!(c.ledger.mode, LedgerMode::Http);
        assert_eq!(c.ledger.client.call_timeout, Duration::from_secs(2));
        assert_eq!(c.ledger.client.confirmations, 3);
        assert_eq!(c.ledger.client.confirmation_timeout, Duration::from_secs(120));
        assert_eq!(c.store.gateways, vec!["https://ipfs.io".to_string()]);
        assert_eq!(c.store.client.fallback_timeout, Duration::from_millis(1500));
        assert_eq!(c.store.client.primary_timeout, Duration::from_secs(5));
    }

    #[test]
    fn http_modes_require_urls() {
        let err = ServerConfig::from_toml("[ledger]\nmode = \"http\"").unwrap_err();
        assert!(err.to_string().contains("ledger.endpoint"));
        let err = ServerConfig::from_toml("[store]\nnode = \"http\"").unwrap_err();
        assert!(err.to_string().contains("store.node_api_url"));
    }

    #[test]
    fn bad_signer_is_rejected() {
        let err = ServerConfig::from_toml("[ledger]\nsigner = \"0xA\"").unwrap_err();
        assert!(matches!(err, ServerError::Config(_)));
    }

    #[test]
    fn missing_file_is_a_config_error() {
        let err = ServerConfig::load("/nonexistent/artdid.toml").unwrap_err();
        assert!(err.to_string().contains("/nonexistent/artdid.toml"));
    }
}
