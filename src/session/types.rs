//! Session handle, status and error definitions.

use std::sync::Arc;
use thiserror::Error;

use crate::provider::{ProviderError, WalletProvider};

/// Connection status of the session owner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionStatus {
    #[default]
    Disconnected,
    Connected,
}

/// Why the session owner is asked to re-read account state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Invalidation {
    /// The wallet exposed different accounts.
    AccountsChanged,
    /// The wallet moved to another chain.
    ChainChanged,
    /// Events were dropped; state must be re-read from scratch.
    Resync,
    /// The provider ended the session; it has already been torn down.
    Disconnected,
}

impl Invalidation {
    /// Whether the owner should refresh (as opposed to reset).
    pub fn requires_refresh(self) -> bool {
        !matches!(self, Invalidation::Disconnected)
    }
}

/// Callback the session invokes when provider events invalidate state.
pub type InvalidateFn = Arc<dyn Fn(Invalidation) + Send + Sync>;

/// A live connection to one wallet provider.
///
/// Cheap to clone. The id changes on every connect, so an operation that
/// captured a `Session` can tell at completion time whether it still
/// belongs to the active connection.
#[derive(Clone)]
pub struct Session {
    id: u64,
    provider: Arc<dyn WalletProvider>,
}

impl Session {
    pub(crate) fn new(id: u64, provider: Arc<dyn WalletProvider>) -> Self {
        Self { id, provider }
    }

    /// Connection generation.
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Provider handle used for wallet calls.
    pub fn provider(&self) -> &dyn WalletProvider {
        self.provider.as_ref()
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session").field("id", &self.id).finish()
    }
}

/// Errors raised by the session owner.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SessionError {
    /// Wallet selection was cancelled or the provider refused.
    #[error("Could not connect wallet: {0}")]
    Connection(ProviderError),

    /// A disconnect or a newer connect overtook this one.
    #[error("Wallet connection was cancelled")]
    Cancelled,

    /// An operation needed an active session.
    #[error("Wallet is not connected")]
    NotConnected,
}

/// Result type for session operations.
pub type SessionResult<T> = Result<T, SessionError>;
