//! Wallet session core.
//!
//! Connects to a user-controlled wallet, switches its active network
//! (registering unknown chains on the way) and keeps a snapshot of the
//! connected account consistent with events the wallet emits.

// Domain
pub mod network;
pub mod provider;
pub mod session;
pub mod switcher;
pub mod account;

// Facade
pub mod app;

// Cross-cutting concerns
pub mod config;
pub mod error;
pub mod observability;

pub use account::{AccountSnapshot, AccountState};
pub use app::{ViewState, WalletApp};
pub use config::WalletConfig;
pub use error::{WalletError, WalletResult};
pub use network::{ChainId, NetworkDescriptor, NetworkRegistry};
pub use provider::{ProviderError, WalletConnector, WalletProvider};
pub use session::ProviderSession;
pub use switcher::NetworkSwitcher;
