//! Wallet session subsystem.
//!
//! # Data Flow
//! ```text
//! connect(on_invalidate)
//!     → WalletConnector::connect (wallet selection)
//!     → Session { id, provider } installed in the single slot
//!     → event pump spawned, owned by EventSubscription
//!
//! provider event
//!     → accountsChanged / chainChanged → on_invalidate(refresh)
//!     → disconnect → slot cleared, cache cleared → on_invalidate(Disconnected)
//!
//! disconnect()
//!     → slot cleared, subscription aborted, cache cleared
//! ```
//!
//! # State Transitions
//! ```text
//! Disconnected → Connected: connect() succeeds
//! Connected → Connected: connect() again (old session torn down first)
//! Connected → Disconnected: disconnect() or provider disconnect event
//! ```

pub mod manager;
pub mod types;

pub use manager::ProviderSession;
pub use types::{InvalidateFn, Invalidation, Session, SessionError, SessionResult, SessionStatus};
