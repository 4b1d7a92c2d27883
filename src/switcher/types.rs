//! Switch protocol phases, outcomes and errors.

use thiserror::Error;

use crate::network::types::ChainId;
use crate::provider::ProviderError;

/// Phase of a single switch request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwitchPhase {
    Idle,
    /// First `wallet_switchEthereumChain` call.
    Switching,
    /// `wallet_addEthereumChain` after the wallet reported the chain unknown.
    Registering,
    /// The single switch retry after a successful registration.
    Retrying,
    Done,
    Failed,
}

impl SwitchPhase {
    pub fn as_str(self) -> &'static str {
        match self {
            SwitchPhase::Idle => "idle",
            SwitchPhase::Switching => "switching",
            SwitchPhase::Registering => "registering",
            SwitchPhase::Retrying => "retrying",
            SwitchPhase::Done => "done",
            SwitchPhase::Failed => "failed",
        }
    }
}

/// A completed switch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SwitchReport {
    /// Chain the wallet was moved to.
    pub chain_id: ChainId,
    /// Whether the chain had to be registered with the wallet first.
    pub registered: bool,
    /// Phases visited, in order, starting with `Idle`.
    pub phases: Vec<SwitchPhase>,
}

/// Errors that end a switch request.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SwitchError {
    /// The wallet is already on the requested chain.
    #[error("Already connected to {0}! Choose a different network")]
    AlreadyConnected(String),

    /// The wallet does not know the chain and the catalog cannot describe it.
    #[error("Network {0} is not supported")]
    UnsupportedNetwork(ChainId),

    /// The wallet refused or failed a switch or registration call.
    #[error("Network switch failed: {0}")]
    SwitchFailed(ProviderError),

    /// No session to switch.
    #[error("Wallet is not connected")]
    NotConnected,
}

impl SwitchError {
    /// Metric label for the outcome.
    pub fn label(&self) -> &'static str {
        match self {
            SwitchError::AlreadyConnected(_) => "already_connected",
            SwitchError::UnsupportedNetwork(_) => "unsupported",
            SwitchError::SwitchFailed(_) => "failed",
            SwitchError::NotConnected => "not_connected",
        }
    }

    /// Classification used in logs; wallet failures report their code class.
    pub fn reason(&self) -> &'static str {
        match self {
            SwitchError::SwitchFailed(cause) => cause.kind(),
            other => other.label(),
        }
    }
}

/// Result type for switch requests.
pub type SwitchResult<T> = Result<T, SwitchError>;
