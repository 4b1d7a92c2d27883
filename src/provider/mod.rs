//! Wallet provider boundary.
//!
//! # Data Flow
//! ```text
//! WalletConnector::connect()          (wallet selection, black box)
//!     → Arc<dyn WalletProvider>       (request / accounts / chain / balance)
//!     → subscribe() → broadcast of ProviderEvent
//!         → session event pump (owned by EventSubscription)
//! ```
//!
//! # Design Decisions
//! - Only `request` and `subscribe` are required; the typed queries and the
//!   chain management calls default to the EIP-1193 methods
//! - Failures carry the wallet's numeric code so callers can branch on 4902
//! - Events are delivered through an explicit channel, never global listeners

pub mod rpc;
pub mod subscription;
pub mod types;

use alloy::primitives::{Address, U256};
use async_trait::async_trait;
use serde_json::{json, Value};
use std::sync::Arc;
use tokio::sync::broadcast;

use crate::network::types::{ChainId, NetworkDescriptor};

pub use rpc::{RpcConnector, RpcWallet};
pub use subscription::EventSubscription;
pub use types::{
    codes, AddChainParameter, ProviderError, ProviderEvent, ProviderResult, SwitchChainParameter,
};

/// A connected wallet.
#[async_trait]
pub trait WalletProvider: Send + Sync {
    /// Relay a JSON-RPC style request to the wallet.
    async fn request(&self, method: &str, params: Value) -> ProviderResult<Value>;

    /// Lifecycle events, or `None` when the provider cannot emit any.
    fn subscribe(&self) -> Option<broadcast::Receiver<ProviderEvent>>;

    /// Accounts exposed to the application.
    async fn accounts(&self) -> ProviderResult<Vec<Address>> {
        let value = self.request("eth_accounts", json!([])).await?;
        serde_json::from_value(value).map_err(|e| ProviderError::malformed("eth_accounts", e))
    }

    /// Chain the wallet is currently on.
    async fn chain_id(&self) -> ProviderResult<ChainId> {
        let value = self.request("eth_chainId", json!([])).await?;
        serde_json::from_value(value).map_err(|e| ProviderError::malformed("eth_chainId", e))
    }

    /// Native balance of an address at the latest block.
    async fn balance(&self, address: Address) -> ProviderResult<U256> {
        let value = self
            .request("eth_getBalance", json!([address, "latest"]))
            .await?;
        serde_json::from_value(value).map_err(|e| ProviderError::malformed("eth_getBalance", e))
    }

    /// Ask the wallet to move to another chain.
    async fn switch_chain(&self, chain_id: ChainId) -> ProviderResult<()> {
        self.request(
            "wallet_switchEthereumChain",
            json!([SwitchChainParameter::from(chain_id)]),
        )
        .await
        .map(|_| ())
    }

    /// Ask the wallet to register a chain it does not know yet.
    async fn add_chain(&self, network: &NetworkDescriptor) -> ProviderResult<()> {
        self.request(
            "wallet_addEthereumChain",
            json!([AddChainParameter::from(network)]),
        )
        .await
        .map(|_| ())
    }
}

/// The wallet-selection step that yields a connected provider.
#[async_trait]
pub trait WalletConnector: Send + Sync {
    /// Let the user pick and authorize a wallet.
    async fn connect(&self) -> ProviderResult<Arc<dyn WalletProvider>>;

    /// Forget the remembered wallet so the next `connect` prompts again.
    async fn clear_cached_provider(&self);
}
