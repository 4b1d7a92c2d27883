//! Provider session ownership.
//!
//! # Responsibilities
//! - Open a session through the connector and subscribe to its events
//! - Keep at most one session connected
//! - Tear down on explicit disconnect or on a provider disconnect event
//!
//! # Design Decisions
//! - The slot lock is never held across an await
//! - Both teardown paths release the subscription and clear the cached
//!   provider, so the next connect prompts for wallet selection again

use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use tokio::sync::broadcast::{self, error::RecvError};

use crate::observability::metrics;
use crate::provider::{
    EventSubscription, ProviderEvent, ProviderResult, WalletConnector, WalletProvider,
};
use crate::session::types::{
    InvalidateFn, Invalidation, Session, SessionError, SessionResult, SessionStatus,
};

#[derive(Default)]
struct SessionSlot {
    active: Option<ActiveSession>,
    next_id: u64,
    /// Generation of the connect awaiting the connector, if any.
    pending: Option<u64>,
    next_attempt: u64,
}

struct ActiveSession {
    session: Session,
    subscription: Option<EventSubscription>,
}

impl ActiveSession {
    fn teardown(self) {
        if let Some(subscription) = self.subscription {
            subscription.unsubscribe();
        }
    }
}

/// Owner of the single wallet session.
///
/// Clones share the same slot.
#[derive(Clone)]
pub struct ProviderSession {
    connector: Arc<dyn WalletConnector>,
    slot: Arc<Mutex<SessionSlot>>,
}

impl ProviderSession {
    pub fn new(connector: Arc<dyn WalletConnector>) -> Self {
        Self {
            connector,
            slot: Arc::new(Mutex::new(SessionSlot::default())),
        }
    }

    fn slot(&self) -> MutexGuard<'_, SessionSlot> {
        lock(&self.slot)
    }

    /// Current status.
    pub fn status(&self) -> SessionStatus {
        if self.slot().active.is_some() {
            SessionStatus::Connected
        } else {
            SessionStatus::Disconnected
        }
    }

    /// Handle of the connected session, if any.
    pub fn current(&self) -> Option<Session> {
        self.slot().active.as_ref().map(|active| active.session.clone())
    }

    /// Whether `id` still names the connected session.
    pub fn is_current(&self, id: u64) -> bool {
        self.slot()
            .active
            .as_ref()
            .is_some_and(|active| active.session.id() == id)
    }

    /// Connect a wallet and route its lifecycle events to `on_invalidate`.
    ///
    /// Any previous session is torn down first.
    ///
    /// A `disconnect` or another `connect` issued while the connector is
    /// still pending cancels this one with [`SessionError::Cancelled`].
    pub async fn connect(&self, on_invalidate: InvalidateFn) -> SessionResult<Session> {
        let attempt = {
            let mut slot = self.slot();
            if let Some(previous) = slot.active.take() {
                tracing::debug!(session_id = previous.session.id(), "Replacing existing session");
                previous.teardown();
            }
            slot.next_attempt += 1;
            slot.pending = Some(slot.next_attempt);
            slot.next_attempt
        };

        let connected = self.connector.connect().await;
        let (session, events) = self.install(attempt, connected)?;

        match events {
            Some(events) => {
                let task = tokio::spawn(pump_events(
                    events,
                    Arc::downgrade(&self.slot),
                    session.id(),
                    self.connector.clone(),
                    on_invalidate,
                ));
                let subscription = EventSubscription::new(task);

                let mut slot = self.slot();
                match slot.active.as_mut() {
                    Some(active) if active.session.id() == session.id() => {
                        active.subscription = Some(subscription);
                    }
                    // Already torn down while the pump was being spawned.
                    _ => subscription.unsubscribe(),
                }
            }
            None => {
                tracing::debug!(session_id = session.id(), "Provider does not emit lifecycle events");
            }
        }

        metrics::record_connect("connected");
        tracing::info!(session_id = session.id(), "Wallet session connected");
        Ok(session)
    }

    /// Install the provider a connect attempt produced, unless the attempt
    /// was overtaken while the connector was pending.
    fn install(
        &self,
        attempt: u64,
        connected: ProviderResult<Arc<dyn WalletProvider>>,
    ) -> SessionResult<(Session, Option<broadcast::Receiver<ProviderEvent>>)> {
        let mut slot = self.slot();
        if slot.pending != Some(attempt) {
            tracing::info!(attempt, "Wallet connection overtaken, discarding provider");
            metrics::record_connect("cancelled");
            return Err(SessionError::Cancelled);
        }
        slot.pending = None;

        let provider = connected.map_err(|e| {
            tracing::warn!(
                code = e.code,
                reason = e.kind(),
                error = %e.message,
                "Wallet connection failed"
            );
            metrics::record_connect("failed");
            SessionError::Connection(e)
        })?;
        let events = provider.subscribe();

        slot.next_id += 1;
        let session = Session::new(slot.next_id, provider);
        let replaced = slot.active.replace(ActiveSession {
            session: session.clone(),
            subscription: None,
        });
        if let Some(replaced) = replaced {
            replaced.teardown();
        }
        Ok((session, events))
    }

    /// End the session. A no-op when already disconnected.
    ///
    /// Also cancels a connect still waiting on the connector.
    pub async fn disconnect(&self) {
        let (active, cancelled) = {
            let mut slot = self.slot();
            (slot.active.take(), slot.pending.take())
        };

        if let Some(attempt) = cancelled {
            tracing::info!(attempt, "Pending wallet connection cancelled");
            metrics::record_session_event("connect_cancelled");
            if active.is_none() {
                self.connector.clear_cached_provider().await;
                return;
            }
        }

        let Some(active) = active else {
            tracing::debug!("Disconnect requested without an active session");
            return;
        };

        let id = active.session.id();
        active.teardown();
        self.connector.clear_cached_provider().await;

        metrics::record_session_event("disconnect_requested");
        tracing::info!(session_id = id, "Wallet session disconnected");
    }
}

impl std::fmt::Debug for ProviderSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderSession")
            .field("status", &self.status())
            .finish()
    }
}

fn lock(slot: &Mutex<SessionSlot>) -> MutexGuard<'_, SessionSlot> {
    slot.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Forward provider events for session `id` until it ends.
async fn pump_events(
    mut events: broadcast::Receiver<ProviderEvent>,
    slot: Weak<Mutex<SessionSlot>>,
    id: u64,
    connector: Arc<dyn WalletConnector>,
    on_invalidate: InvalidateFn,
) {
    loop {
        let event = match events.recv().await {
            Ok(event) => event,
            Err(RecvError::Lagged(skipped)) => {
                tracing::warn!(session_id = id, skipped, "Provider events dropped, resyncing");
                on_invalidate(Invalidation::Resync);
                continue;
            }
            Err(RecvError::Closed) => {
                tracing::debug!(session_id = id, "Provider event stream closed");
                break;
            }
        };

        let Some(slot) = slot.upgrade() else { break };
        metrics::record_session_event(event.kind());
        tracing::debug!(session_id = id, event = event.kind(), "Provider event received");

        match event {
            ProviderEvent::Disconnect => {
                let ended = {
                    let mut slot = lock(&slot);
                    match slot.active.as_ref() {
                        Some(active) if active.session.id() == id => slot.active.take(),
                        _ => None,
                    }
                };

                if let Some(ended) = ended {
                    // This task is the subscription; let it finish the teardown.
                    if let Some(subscription) = ended.subscription {
                        subscription.release();
                    }
                    tracing::info!(session_id = id, "Wallet disconnected by provider");
                    on_invalidate(Invalidation::Disconnected);
                    connector.clear_cached_provider().await;
                }
                break;
            }
            ProviderEvent::AccountsChanged(_) => on_invalidate(Invalidation::AccountsChanged),
            ProviderEvent::ChainChanged(_) => on_invalidate(Invalidation::ChainChanged),
        }
    }
}
