use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Public gateways tried after the operated node, highest priority first.
pub const DEFAULT_FALLBACK_GATEWAYS: &[&str] = &[
    "https://ipfs.io",
    "https://gateway.pinata.cloud",
    "https://cloudflare-ipfs.com",
];

/// Timeouts and URLs for the content store client.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreClientConfig {
    /// Bound on a single read from the operated node.
    #[serde(with = "artdid_types::millis")]
    pub primary_timeout: Duration,
    /// Bound on a single read from each fallback gateway.
    #[serde(with = "artdid_types::millis")]
    pub fallback_timeout: Duration,
    /// Bound on an upload to the operated node.
    #[serde(with = "artdid_types::millis")]
    pub upload_timeout: Duration,
    /// Base URL used to build shareable content links.
    pub public_gateway_url: String,
}

impl Default for StoreClientConfig {
    fn default() -> Self {
        Self {
            primary_timeout: Duration::from_secs(5),
            fallback_timeout: Duration::from_secs(3),
            upload_timeout: Duration::from_secs(30),
            public_gateway_url: DEFAULT_FALLBACK_GATEWAYS[0].to_string(),
        }
    }
}

impl StoreClientConfig {
    /// Worst-case latency of a fully failing fetch across `fallbacks` gateways.
    pub fn max_fetch_latency(&self, fallbacks: usize) -> Duration {
        self.primary_timeout + self.fallback_timeout * fallbacks as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let c = StoreClientConfig::default();
        assert_eq!(c.primary_timeout, Duration::from_secs(5));
        assert_eq!(c.fallback_timeout, Duration::from_secs(3));
        assert_eq!(c.public_gateway_url, "https://ipfs.io");
    }

    #[test]
    fn max_latency_is_sum_of_bounds() {
        let c = StoreClientConfig::default();
        assert_eq!(c.max_fetch_latency(3), Duration::from_secs(14));
    }

    #[test]
    fn durations_are_millis_in_json() {
        let json = serde_json::to_value(StoreClientConfig::default()).unwrap();
        assert_eq!(json["primary_timeout"], 5000);
        let parsed: StoreClientConfig =
            serde_json::from_str(r#"{"fallback_timeout": 250}"#).unwrap();
        assert_eq!(parsed.fallback_timeout, Duration::from_millis(250));
        assert_eq!(parsed.primary_timeout, Duration::from_secs(5));
    }
}
