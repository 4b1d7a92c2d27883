//! Account state store.
//!
//! # Responsibilities
//! - Query the session for address, chain and balance
//! - Publish wholesale snapshot replacements to observers
//! - Drop results that finished after a newer refresh started, or after
//!   the session they were read from went away
//!
//! # Design Decisions
//! - Every refresh and reset takes a new token; only the holder of the
//!   latest token may publish
//! - Failures keep the previous substantive fields, only `loading` and
//!   `error` change
//! - No automatic retry

use std::sync::{Arc, Mutex, PoisonError};
use thiserror::Error;
use tokio::sync::watch;

use crate::account::balance::Balance;
use crate::account::snapshot::AccountSnapshot;
use crate::network::registry::NetworkRegistry;
use crate::observability::metrics;
use crate::provider::{ProviderError, WalletProvider};
use crate::session::ProviderSession;

/// Errors that can occur while refreshing account state.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RefreshError {
    /// No connected session to query.
    #[error("Wallet is not connected")]
    NotConnected,

    /// The wallet exposes no account.
    #[error("Wallet exposes no accounts")]
    NoAccounts,

    /// A wallet query failed.
    #[error("Could not read account state: {0}")]
    Provider(#[from] ProviderError),
}

impl RefreshError {
    /// Classification used in logs.
    pub fn reason(&self) -> &'static str {
        match self {
            RefreshError::NotConnected => "not_connected",
            RefreshError::NoAccounts => "no_accounts",
            RefreshError::Provider(e) => e.kind(),
        }
    }
}

/// Result type for refreshes.
pub type RefreshResult<T> = Result<T, RefreshError>;

/// How a refresh ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// The fresh snapshot was published.
    Applied(Arc<AccountSnapshot>),
    /// A newer refresh, a reset or a disconnect overtook this one.
    Discarded,
}

impl RefreshOutcome {
    pub fn snapshot(&self) -> Option<&Arc<AccountSnapshot>> {
        match self {
            RefreshOutcome::Applied(snapshot) => Some(snapshot),
            RefreshOutcome::Discarded => None,
        }
    }
}

/// Holder of the current account snapshot.
#[derive(Debug)]
pub struct AccountState {
    registry: Arc<NetworkRegistry>,
    snapshot: watch::Sender<Arc<AccountSnapshot>>,
    latest_token: Mutex<u64>,
}

impl AccountState {
    pub fn new(registry: Arc<NetworkRegistry>) -> Self {
        let (snapshot, _) = watch::channel(Arc::new(AccountSnapshot::default()));
        Self {
            registry,
            snapshot,
            latest_token: Mutex::new(0),
        }
    }

    /// Current snapshot.
    pub fn snapshot(&self) -> Arc<AccountSnapshot> {
        self.snapshot.borrow().clone()
    }

    /// Observe snapshot replacements.
    pub fn subscribe(&self) -> watch::Receiver<Arc<AccountSnapshot>> {
        self.snapshot.subscribe()
    }

    /// Re-read account state from the connected session.
    pub async fn refresh(&self, session: &ProviderSession) -> RefreshResult<RefreshOutcome> {
        let Some(handle) = session.current() else {
            return Err(RefreshError::NotConnected);
        };

        let token = {
            let mut latest = self.latest_token.lock().unwrap_or_else(PoisonError::into_inner);
            *latest += 1;
            let loading = self.snapshot().loading();
            self.snapshot.send_replace(Arc::new(loading));
            *latest
        };
        tracing::debug!(token, session_id = handle.id(), "Account refresh started");

        let result = self.query(handle.provider()).await;

        let latest = self.latest_token.lock().unwrap_or_else(PoisonError::into_inner);
        if *latest != token {
            tracing::debug!(token, latest = *latest, "Discarding superseded account refresh");
            metrics::record_refresh("discarded");
            return Ok(RefreshOutcome::Discarded);
        }
        if !session.is_current(handle.id()) {
            tracing::debug!(token, session_id = handle.id(), "Discarding refresh from closed session");
            metrics::record_refresh("discarded");
            return Ok(RefreshOutcome::Discarded);
        }

        match result {
            Ok(fresh) => {
                let fresh = Arc::new(fresh);
                self.snapshot.send_replace(fresh.clone());
                metrics::record_refresh("applied");
                tracing::info!(
                    address = ?fresh.address,
                    chain_id = ?fresh.chain_id.map(u64::from),
                    "Account state refreshed"
                );
                Ok(RefreshOutcome::Applied(fresh))
            }
            Err(e) => {
                let failed = self.snapshot().failed(e.to_string());
                self.snapshot.send_replace(Arc::new(failed));
                metrics::record_refresh("failed");
                tracing::warn!(reason = e.reason(), error = %e, "Account refresh failed");
                Err(e)
            }
        }
    }

    /// Back to the empty snapshot. In-flight refreshes are discarded.
    pub fn reset(&self) -> Arc<AccountSnapshot> {
        let mut latest = self.latest_token.lock().unwrap_or_else(PoisonError::into_inner);
        *latest += 1;
        let empty = Arc::new(AccountSnapshot::default());
        self.snapshot.send_replace(empty.clone());
        tracing::debug!("Account state reset");
        empty
    }

    async fn query(&self, provider: &dyn WalletProvider) -> RefreshResult<AccountSnapshot> {
        let accounts = provider.accounts().await?;
        let address = accounts.first().copied().ok_or(RefreshError::NoAccounts)?;

        let chain_id = provider.chain_id().await?;
        let network = self.registry.find(chain_id).cloned();
        if network.is_none() {
            tracing::debug!(chain_id = %chain_id, "Connected chain is not in the registry");
        }

        let raw = provider.balance(address).await?;
        let balance = Balance::new(raw, self.registry.currency_for(chain_id));

        Ok(AccountSnapshot {
            address: Some(address),
            chain_id: Some(chain_id),
            network,
            balance: Some(balance),
            loading: false,
            error: None,
        })
    }
}
