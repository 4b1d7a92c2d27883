//! Account state subsystem.
//!
//! # Data Flow
//! ```text
//! refresh(session)
//!     → eth_accounts (first entry) → eth_chainId → registry lookup
//!     → eth_getBalance → balance.rs (truncated rendering)
//!     → snapshot.rs (AccountSnapshot, built whole)
//!     → state.rs publishes via watch channel, if still the latest refresh
//!
//! reset()
//!     → empty snapshot published, in-flight refreshes invalidated
//! ```

pub mod balance;
pub mod snapshot;
pub mod state;

pub use balance::{Balance, BALANCE_DISPLAY_CHARS};
pub use snapshot::AccountSnapshot;
pub use state::{AccountState, RefreshError, RefreshOutcome, RefreshResult};
