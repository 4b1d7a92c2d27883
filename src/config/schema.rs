//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for a wallet
//! session. All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

use crate::network::registry::builtin_networks;
use crate::network::types::{NativeCurrency, NetworkDescriptor};

/// Root configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct WalletConfig {
    /// Network catalog, in the order it is offered to the user.
    pub networks: Vec<NetworkDescriptor>,

    /// Currency assumed for chains missing from the catalog.
    pub fallback_currency: NativeCurrency,

    /// JSON-RPC wallet relay settings.
    pub provider: ProviderConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

impl Default for WalletConfig {
    fn default() -> Self {
        Self {
            networks: builtin_networks(),
            fallback_currency: NativeCurrency::default(),
            provider: ProviderConfig::default(),
            observability: ObservabilityConfig::default(),
        }
    }
}

/// Settings for the JSON-RPC wallet relay.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ProviderConfig {
    /// Wallet relay endpoint URL.
    pub rpc_url: String,

    /// Per-request timeout in seconds.
    pub request_timeout_secs: u64,

    /// How often the relay is polled for chain/account changes, in milliseconds.
    pub poll_interval_ms: u64,

    /// Consecutive failed polls before the relay is reported disconnected.
    pub disconnect_after_failures: u32,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            rpc_url: "http://localhost:8545".to_string(),
            request_timeout_secs: 10,
            poll_interval_ms: 1000,
            disconnect_after_failures: 3,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Emit JSON log lines instead of the human readable format.
    pub json_logs: bool,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            json_logs: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::network::types::ChainId;

    #[test]
    fn test_default_config() {
        let config = WalletConfig::default();
        assert_eq!(config.networks.len(), 5);
        assert_eq!(config.fallback_currency.symbol, "ETH");
        assert_eq!(config.provider.request_timeout_secs, 10);
        assert_eq!(config.observability.log_level, "info");
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config: WalletConfig = toml::from_str(
            r#"
            [provider]
            rpc_url = "http://127.0.0.1:9545"
            "#,
        )
        .unwrap();

        assert_eq!(config.provider.rpc_url, "http://127.0.0.1:9545");
        assert_eq!(config.provider.poll_interval_ms, 1000);
        assert_eq!(config.networks.len(), 5);
    }

    #[test]
    fn test_networks_from_toml() {
        let config: WalletConfig = toml::from_str(
            r#"
            [[networks]]
            id = 11155111
            name = "Sepolia"
            rpc_urls = ["https://sepolia.infura.io/v3/"]
            explorer_urls = ["https://sepolia.etherscan.io"]

            [networks.native_currency]
            name = "Sepolia ETH"
            symbol = "SepETH"
            decimals = 18

            [[networks]]
            id = "0x89"
            name = "Polygon"

            [networks.native_currency]
            name = "MATIC"
            symbol = "MATIC"
            decimals = 18
            "#,
        )
        .unwrap();

        assert_eq!(config.networks.len(), 2);
        assert_eq!(config.networks[0].chain_id, ChainId(11155111));
        assert_eq!(config.networks[1].chain_id, ChainId(137));
        assert!(config.networks[1].rpc_urls.is_empty());
    }
}
