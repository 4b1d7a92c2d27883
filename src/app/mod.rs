//! Application facade.
//!
//! # Data Flow
//! ```text
//! UI command (connect / disconnect / switch_network)
//!     → controller.rs (WalletApp)
//!         → session (ProviderSession) / switcher (NetworkSwitcher)
//!         → account (AccountState refresh or reset)
//!     → view.rs (ViewState derived from status + snapshot + error slot)
//!
//! Provider events
//!     → session pump → invalidation → refresh (spawned) or reset
//! ```

pub mod controller;
pub mod view;

pub use controller::WalletApp;
pub use view::{AccountCard, SwitchOption, ViewState};
