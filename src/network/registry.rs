//! Static catalog of known networks.
//!
//! # Responsibilities
//! - Hold the immutable list of network descriptors in declaration order
//! - Resolve a chain id to its descriptor
//! - Provide the currency used when a chain is not catalogued
//!
//! # Design Decisions
//! - Lookup misses are a normal outcome (`None`), never an error
//! - Chain ids are unique; construction rejects duplicates

use std::collections::HashMap;
use thiserror::Error;

use crate::config::schema::WalletConfig;
use crate::network::types::{ChainId, NativeCurrency, NetworkDescriptor};

/// Errors raised while building a registry.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// Two entries share a chain id.
    #[error("duplicate chain id {0} in network registry")]
    DuplicateChainId(ChainId),
}

/// Catalog of networks the application can present and register.
#[derive(Debug, Clone)]
pub struct NetworkRegistry {
    networks: Vec<NetworkDescriptor>,
    index: HashMap<ChainId, usize>,
    fallback_currency: NativeCurrency,
}

impl NetworkRegistry {
    /// Build a registry from descriptors, keeping their order.
    pub fn new(
        networks: Vec<NetworkDescriptor>,
        fallback_currency: NativeCurrency,
    ) -> Result<Self, RegistryError> {
        let mut index = HashMap::with_capacity(networks.len());
        for (i, network) in networks.iter().enumerate() {
            if index.insert(network.chain_id, i).is_some() {
                return Err(RegistryError::DuplicateChainId(network.chain_id));
            }
        }

        Ok(Self {
            networks,
            index,
            fallback_currency,
        })
    }

    /// Build the registry described by a configuration.
    pub fn from_config(config: &WalletConfig) -> Result<Self, RegistryError> {
        let registry = Self::new(config.networks.clone(), config.fallback_currency.clone())?;
        tracing::debug!(networks = registry.len(), "Network registry loaded");
        Ok(registry)
    }

    /// Look up a network by chain id.
    pub fn find(&self, chain_id: ChainId) -> Option<&NetworkDescriptor> {
        self.index.get(&chain_id).map(|&i| &self.networks[i])
    }

    /// All networks in declaration order.
    pub fn all(&self) -> &[NetworkDescriptor] {
        &self.networks
    }

    /// Display name for a chain, degrading to `Chain <id>` when unknown.
    pub fn display_name(&self, chain_id: ChainId) -> String {
        match self.find(chain_id) {
            Some(network) => network.name.clone(),
            None => format!("Chain {chain_id}"),
        }
    }

    /// Currency of a chain, or the fallback currency when unknown.
    pub fn currency_for(&self, chain_id: ChainId) -> &NativeCurrency {
        self.find(chain_id)
            .map(|network| &network.currency)
            .unwrap_or(&self.fallback_currency)
    }

    /// Number of catalogued networks.
    pub fn len(&self) -> usize {
        self.networks.len()
    }

    /// Whether the catalog is empty.
    pub fn is_empty(&self) -> bool {
        self.networks.is_empty()
    }
}

impl Default for NetworkRegistry {
    fn default() -> Self {
        let networks = builtin_networks();
        let index = networks
            .iter()
            .enumerate()
            .map(|(i, network)| (network.chain_id, i))
            .collect();

        Self {
            networks,
            index,
            fallback_currency: NativeCurrency::default(),
        }
    }
}

fn testnet(id: u64, name: &str, symbol: &str, host: &str) -> NetworkDescriptor {
    NetworkDescriptor {
        chain_id: ChainId(id),
        name: name.to_string(),
        currency: NativeCurrency {
            name: format!("{name} ETH"),
            symbol: symbol.to_string(),
            decimals: 18,
        },
        rpc_urls: vec![format!("https://{host}.infura.io/v3/")],
        explorer_urls: vec![format!("https://{host}.etherscan.io")],
    }
}

/// The catalog shipped with the crate.
pub fn builtin_networks() -> Vec<NetworkDescriptor> {
    vec![
        NetworkDescriptor {
            chain_id: ChainId(1),
            name: "Ethereum".to_string(),
            currency: NativeCurrency {
                name: "Ethers".to_string(),
                symbol: "ETH".to_string(),
                decimals: 18,
            },
            rpc_urls: Vec::new(),
            explorer_urls: Vec::new(),
        },
        testnet(5, "Goerli", "GoeETH", "goerli"),
        testnet(4, "Rinkeby", "RinETH", "rinkeby"),
        testnet(3, "Ropsten", "RopETH", "ropsten"),
        testnet(42, "Kovan", "KovETH", "kovan"),
    ]
}
