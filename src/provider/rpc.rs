//! JSON-RPC wallet relay.
//!
//! # Responsibilities
//! - Relay wallet requests to an HTTP JSON-RPC endpoint with timeouts
//! - Keep the remote error code so the 4902 path works over the wire
//! - Synthesize lifecycle events by polling, since HTTP has no push channel

use alloy::primitives::{Address, U256};
use alloy::providers::{Provider, ProviderBuilder};
use alloy::transports::TransportError;
use async_trait::async_trait;
use serde_json::Value;
use std::future::IntoFuture;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;
use tokio::time::timeout;

use crate::config::ProviderConfig;
use crate::network::types::ChainId;
use crate::provider::types::{ProviderError, ProviderEvent, ProviderResult};
use crate::provider::{WalletConnector, WalletProvider};

/// Capacity of the event broadcast channel.
const EVENT_CAPACITY: usize = 16;

/// Wallet reached over HTTP JSON-RPC.
#[derive(Clone)]
pub struct RpcWallet {
    inner: Arc<RpcInner>,
}

struct RpcInner {
    provider: Arc<dyn Provider + Send + Sync>,
    rpc_url: String,
    timeout_duration: Duration,
    poll_interval: Duration,
    disconnect_after_failures: u32,
    events: broadcast::Sender<ProviderEvent>,
    polling: AtomicBool,
}

impl RpcWallet {
    /// Create a relay for the configured endpoint. Does not touch the network.
    pub fn new(config: &ProviderConfig) -> ProviderResult<Self> {
        if config.poll_interval_ms == 0 {
            return Err(ProviderError::internal("Event poll interval must be greater than zero"));
        }
        let url: url::Url = config.rpc_url.parse().map_err(|e| {
            ProviderError::internal(format!("Invalid RPC URL '{}': {}", config.rpc_url, e))
        })?;
        let provider = Arc::new(ProviderBuilder::new().connect_http(url)) as Arc<dyn Provider + Send + Sync>;
        let (events, _) = broadcast::channel(EVENT_CAPACITY);

        Ok(Self {
            inner: Arc::new(RpcInner {
                provider,
                rpc_url: config.rpc_url.clone(),
                timeout_duration: Duration::from_secs(config.request_timeout_secs),
                poll_interval: Duration::from_millis(config.poll_interval_ms),
                disconnect_after_failures: config.disconnect_after_failures,
                events,
                polling: AtomicBool::new(false),
            }),
        })
    }

    /// Endpoint this relay talks to.
    pub fn rpc_url(&self) -> &str {
        &self.inner.rpc_url
    }
}

impl RpcInner {
    async fn call<F, T>(&self, method: &str, fut: F) -> ProviderResult<T>
    where
        F: IntoFuture<Output = Result<T, TransportError>>,
    {
        match timeout(self.timeout_duration, fut).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(e)) => {
                let err = provider_error(e);
                tracing::debug!(method, code = err.code, error = %err.message, "RPC error");
                Err(err)
            }
            Err(_) => {
                tracing::warn!(method, timeout_secs = self.timeout_duration.as_secs(), "RPC timeout");
                Err(ProviderError::internal(format!(
                    "{method} timed out after {} seconds",
                    self.timeout_duration.as_secs()
                )))
            }
        }
    }

    async fn chain_id(&self) -> ProviderResult<ChainId> {
        self.call("eth_chainId", self.provider.get_chain_id()).await.map(ChainId)
    }

    async fn accounts(&self) -> ProviderResult<Vec<Address>> {
        self.call("eth_accounts", self.provider.get_accounts()).await
    }

    /// Poll the endpoint and broadcast changes until nobody listens anymore.
    async fn poll(self: Arc<Self>) {
        let mut ticker = tokio::time::interval(self.poll_interval);
        let mut last_chain: Option<ChainId> = None;
        let mut last_accounts: Option<Vec<Address>> = None;
        let mut failures = 0u32;

        tracing::debug!(rpc_url = %self.rpc_url, interval_ms = self.poll_interval.as_millis() as u64, "Event poller started");

        loop {
            ticker.tick().await;

            if self.events.receiver_count() == 0 {
                break;
            }

            let observed = match (self.chain_id().await, self.accounts().await) {
                (Ok(chain), Ok(accounts)) => (chain, accounts),
                (Err(e), _) | (_, Err(e)) => {
                    failures += 1;
                    tracing::warn!(failures, error = %e, "Event poll failed");
                    if failures >= self.disconnect_after_failures {
                        let _ = self.events.send(ProviderEvent::Disconnect);
                        break;
                    }
                    continue;
                }
            };
            failures = 0;

            let (chain, accounts) = observed;
            if last_chain.is_some_and(|last| last != chain) {
                let _ = self.events.send(ProviderEvent::ChainChanged(chain));
            }
            if last_accounts.as_ref().is_some_and(|last| *last != accounts) {
                let _ = self.events.send(ProviderEvent::AccountsChanged(accounts.clone()));
            }
            last_chain = Some(chain);
            last_accounts = Some(accounts);
        }

        self.polling.store(false, Ordering::SeqCst);
        tracing::debug!(rpc_url = %self.rpc_url, "Event poller stopped");
    }
}

#[async_trait]
impl WalletProvider for RpcWallet {
    async fn request(&self, method: &str, params: Value) -> ProviderResult<Value> {
        let raw_params = serde_json::value::to_raw_value(&params)
            .map_err(|e| ProviderError::internal(format!("unserializable params for {method}: {e}")))?;

        let raw = self
            .inner
            .call(
                method,
                self.inner
                    .provider
                    .raw_request_dyn(method.to_string().into(), &raw_params),
            )
            .await?;

        serde_json::from_str(raw.get()).map_err(|e| ProviderError::malformed(method, e))
    }

    fn subscribe(&self) -> Option<broadcast::Receiver<ProviderEvent>> {
        let rx = self.inner.events.subscribe();
        if !self.inner.polling.swap(true, Ordering::SeqCst) {
            tokio::spawn(self.inner.clone().poll());
        }
        Some(rx)
    }

    async fn accounts(&self) -> ProviderResult<Vec<Address>> {
        self.inner.accounts().await
    }

    async fn chain_id(&self) -> ProviderResult<ChainId> {
        self.inner.chain_id().await
    }

    async fn balance(&self, address: Address) -> ProviderResult<U256> {
        self.inner
            .call("eth_getBalance", self.inner.provider.get_balance(address))
            .await
    }
}

impl std::fmt::Debug for RpcWallet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RpcWallet")
            .field("rpc_url", &self.inner.rpc_url)
            .field("timeout_secs", &self.inner.timeout_duration.as_secs())
            .field("poll_interval_ms", &self.inner.poll_interval.as_millis())
            .finish()
    }
}

/// Keep the JSON-RPC error object when the remote returned one.
fn provider_error(err: TransportError) -> ProviderError {
    match err.as_error_resp() {
        Some(payload) => {
            let data = payload
                .data
                .as_ref()
                .and_then(|raw| serde_json::from_str(raw.get()).ok());
            ProviderError {
                code: payload.code,
                message: payload.message.to_string(),
                data,
            }
        }
        None => ProviderError::internal(err.to_string()),
    }
}

/// Connector for a JSON-RPC wallet relay.
///
/// There is no selection dialog; "connecting" means verifying the relay
/// answers. The cached flag mirrors the remembered-wallet behaviour of
/// browser connectors.
#[derive(Debug)]
pub struct RpcConnector {
    config: ProviderConfig,
    cached: AtomicBool,
}

impl RpcConnector {
    pub fn new(config: ProviderConfig) -> Self {
        Self {
            config,
            cached: AtomicBool::new(false),
        }
    }

    /// Whether a previous connection is remembered.
    pub fn has_cached_provider(&self) -> bool {
        self.cached.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl WalletConnector for RpcConnector {
    async fn connect(&self) -> ProviderResult<Arc<dyn WalletProvider>> {
        let wallet = RpcWallet::new(&self.config)?;
        let chain_id = wallet.chain_id().await?;

        self.cached.store(true, Ordering::SeqCst);
        tracing::info!(rpc_url = %wallet.rpc_url(), chain_id = %chain_id, "RPC wallet connected");
        Ok(Arc::new(wallet))
    }

    async fn clear_cached_provider(&self) {
        self.cached.store(false, Ordering::SeqCst);
    }
}
