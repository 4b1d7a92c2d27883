//! Network switch subsystem.
//!
//! # Data Flow
//! ```text
//! switch_network(target)
//!     → machine.rs: compare with observed chain (AlreadyConnected guard)
//!     → wallet_switchEthereumChain
//!         → 4902 → registry lookup → wallet_addEthereumChain → one retry
//!     → SwitchReport, or SwitchError for the caller to surface
//! ```
//!
//! # Design Decisions
//! - The protocol is an explicit state machine, not nested error handling
//! - The switcher never touches account state; the caller refreshes

pub mod machine;
pub mod types;

pub use machine::NetworkSwitcher;
pub use types::{SwitchError, SwitchPhase, SwitchReport, SwitchResult};
