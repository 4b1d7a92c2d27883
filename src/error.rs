//! Crate-level error type.

use thiserror::Error;

use crate::account::RefreshError;
use crate::config::ConfigError;
use crate::network::RegistryError;
use crate::session::SessionError;
use crate::switcher::SwitchError;

/// Any failure surfaced by the application facade.
#[derive(Debug, Error)]
pub enum WalletError {
    #[error(transparent)]
    Session(#[from] SessionError),

    #[error(transparent)]
    Switch(#[from] SwitchError),

    #[error(transparent)]
    Refresh(#[from] RefreshError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Registry(#[from] RegistryError),
}

pub type WalletResult<T> = Result<T, WalletError>;
