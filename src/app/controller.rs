//! Application facade driven by UI commands.
//!
//! # Responsibilities
//! - Own the session, the switcher and the account state for one app
//! - Turn provider invalidations into refreshes or resets
//! - Keep the top-level error slot shown above the view
//!
//! # Design Decisions
//! - Invalidation callbacks hold a weak reference, so a dropped app stops
//!   reacting to its wallet
//! - Results of a switch whose session ended meanwhile are dropped, not
//!   reported

use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use tokio::sync::watch;

use crate::account::{AccountSnapshot, AccountState, RefreshOutcome};
use crate::app::view::{SwitchOption, ViewState};
use crate::config::WalletConfig;
use crate::error::WalletResult;
use crate::network::registry::NetworkRegistry;
use crate::network::types::ChainId;
use crate::provider::WalletConnector;
use crate::session::{InvalidateFn, Invalidation, ProviderSession, SessionError, SessionStatus};
use crate::switcher::{NetworkSwitcher, SwitchError, SwitchReport};

struct AppInner {
    registry: Arc<NetworkRegistry>,
    session: ProviderSession,
    switcher: NetworkSwitcher,
    account: AccountState,
    error: Mutex<Option<String>>,
}

impl AppInner {
    fn error_slot(&self) -> MutexGuard<'_, Option<String>> {
        self.error.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn set_error(&self, message: String) {
        *self.error_slot() = Some(message);
    }

    fn clear_error(&self) {
        self.error_slot().take();
    }

    /// Refresh whose failure is already recorded in the snapshot.
    async fn settle(&self) {
        if let Err(e) = self.account.refresh(&self.session).await {
            tracing::debug!(error = %e, "Refresh failure recorded in snapshot");
        }
    }
}

/// Wallet session core as seen by a UI layer.
///
/// Cheap to clone; clones share the same session.
#[derive(Clone)]
pub struct WalletApp {
    inner: Arc<AppInner>,
}

impl WalletApp {
    pub fn new(registry: Arc<NetworkRegistry>, connector: Arc<dyn WalletConnector>) -> Self {
        Self {
            inner: Arc::new(AppInner {
                switcher: NetworkSwitcher::new(registry.clone()),
                account: AccountState::new(registry.clone()),
                session: ProviderSession::new(connector),
                registry,
                error: Mutex::new(None),
            }),
        }
    }

    /// Build an app over the networks a configuration declares.
    pub fn from_config(config: &WalletConfig, connector: Arc<dyn WalletConnector>) -> WalletResult<Self> {
        let registry = NetworkRegistry::from_config(config)?;
        Ok(Self::new(Arc::new(registry), connector))
    }

    /// Connect a wallet and load its account.
    ///
    /// A failed first refresh still leaves the app connected, with the
    /// failure in the snapshot. A `disconnect` issued while the wallet is
    /// still being selected cancels the connect.
    pub async fn connect(&self) -> WalletResult<Arc<AccountSnapshot>> {
        self.inner.clear_error();

        let weak = Arc::downgrade(&self.inner);
        let on_invalidate: InvalidateFn = Arc::new(move |reason| invalidate(&weak, reason));

        match self.inner.session.connect(on_invalidate).await {
            Ok(_) => {
                self.inner.account.reset();
            }
            // Whatever overtook the attempt owns the state now.
            Err(SessionError::Cancelled) => return Err(SessionError::Cancelled.into()),
            Err(e) => {
                self.inner.account.reset();
                self.inner.set_error(e.to_string());
                return Err(e.into());
            }
        }

        self.inner.settle().await;
        Ok(self.snapshot())
    }

    /// End the session. A no-op when already disconnected.
    pub async fn disconnect(&self) {
        self.inner.session.disconnect().await;
        self.inner.account.reset();
        self.inner.clear_error();
    }

    /// Move the wallet to `target`, registering the chain first if needed.
    ///
    /// Returns `None` when the session ended while the switch was in
    /// flight; nothing is applied in that case.
    pub async fn switch_network(&self, target: ChainId) -> WalletResult<Option<SwitchReport>> {
        let Some(session) = self.inner.session.current() else {
            let e = SwitchError::NotConnected;
            self.inner.set_error(e.to_string());
            return Err(e.into());
        };
        self.inner.clear_error();

        let observed = self.inner.account.snapshot().chain_id;
        let result = self.inner.switcher.switch(&session, observed, target).await;

        if !self.inner.session.is_current(session.id()) {
            tracing::debug!(session_id = session.id(), chain_id = %target, "Discarding switch from closed session");
            return Ok(None);
        }

        match result {
            Ok(report) => {
                self.inner.settle().await;
                Ok(Some(report))
            }
            Err(e) => {
                self.inner.set_error(e.to_string());
                Err(e.into())
            }
        }
    }

    /// Re-read account state now.
    pub async fn refresh(&self) -> WalletResult<RefreshOutcome> {
        Ok(self.inner.account.refresh(&self.inner.session).await?)
    }

    pub fn status(&self) -> SessionStatus {
        self.inner.session.status()
    }

    pub fn snapshot(&self) -> Arc<AccountSnapshot> {
        self.inner.account.snapshot()
    }

    /// Observe snapshot replacements.
    pub fn subscribe(&self) -> watch::Receiver<Arc<AccountSnapshot>> {
        self.inner.account.subscribe()
    }

    /// Last failed command, cleared by the next command.
    pub fn error(&self) -> Option<String> {
        self.inner.error_slot().clone()
    }

    pub fn view(&self) -> ViewState {
        let error = self.error();
        ViewState::derive(self.status(), &self.snapshot(), error.as_deref())
    }

    /// Network selector entries in catalog order.
    pub fn switch_options(&self) -> Vec<SwitchOption> {
        let observed = self.snapshot().chain_id;
        self.inner
            .registry
            .all()
            .iter()
            .map(|network| SwitchOption {
                chain_id: network.chain_id,
                name: network.name.clone(),
                selected: observed == Some(network.chain_id),
            })
            .collect()
    }

    pub fn registry(&self) -> &NetworkRegistry {
        &self.inner.registry
    }
}

impl std::fmt::Debug for WalletApp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WalletApp")
            .field("status", &self.status())
            .field("error", &self.error())
            .finish()
    }
}

fn invalidate(app: &Weak<AppInner>, reason: Invalidation) {
    let Some(inner) = app.upgrade() else { return };
    tracing::debug!(?reason, "Account state invalidated");

    if reason.requires_refresh() {
        tokio::spawn(async move { inner.settle().await });
    } else {
        inner.account.reset();
        inner.clear_error();
    }
}
