//! Provider boundary types and error definitions.

use alloy::primitives::Address;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::network::types::{ChainId, NativeCurrency, NetworkDescriptor};

/// EIP-1193 / JSON-RPC error codes the session layer cares about.
pub mod codes {
    /// The user rejected the request.
    pub const USER_REJECTED: i64 = 4001;
    /// The requested method or account has not been authorized.
    pub const UNAUTHORIZED: i64 = 4100;
    /// The provider does not support the requested method.
    pub const UNSUPPORTED_METHOD: i64 = 4200;
    /// The provider is disconnected from all chains.
    pub const DISCONNECTED: i64 = 4900;
    /// The provider is not connected to the requested chain.
    pub const CHAIN_DISCONNECTED: i64 = 4901;
    /// The wallet does not know the requested chain (EIP-3326).
    pub const UNRECOGNIZED_CHAIN: i64 = 4902;
    /// Generic JSON-RPC internal error.
    pub const INTERNAL: i64 = -32603;
}

/// Failure reported by a wallet provider.
#[derive(Debug, Clone, PartialEq, Error, Serialize, Deserialize)]
#[error("{message} (code {code})")]
pub struct ProviderError {
    /// Machine readable code.
    pub code: i64,
    /// Human readable description.
    pub message: String,
    /// Optional structured payload.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl ProviderError {
    /// Create an error without data.
    pub fn new(code: i64, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            data: None,
        }
    }

    /// Attach a structured payload.
    pub fn with_data(mut self, data: Value) -> Self {
        self.data = Some(data);
        self
    }

    /// Internal error raised on this side of the boundary (timeouts, bad payloads).
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(codes::INTERNAL, message)
    }

    /// Error for a provider response that could not be decoded.
    pub fn malformed(method: &str, err: impl std::fmt::Display) -> Self {
        Self::internal(format!("malformed {method} response: {err}"))
    }

    /// Whether the wallet reported the chain as unknown.
    ///
    /// Some mobile wallets relay the code inside `data.originalError.code`
    /// under a generic `-32603`.
    pub fn is_unrecognized_chain(&self) -> bool {
        if self.code == codes::UNRECOGNIZED_CHAIN {
            return true;
        }
        self.data
            .as_ref()
            .and_then(|data| data.pointer("/originalError/code"))
            .and_then(Value::as_i64)
            == Some(codes::UNRECOGNIZED_CHAIN)
    }

    /// Whether the user declined the request in the wallet.
    pub fn is_user_rejection(&self) -> bool {
        self.code == codes::USER_REJECTED
    }

    /// Short classification used in logs.
    pub fn kind(&self) -> &'static str {
        if self.is_unrecognized_chain() {
            return "unrecognized_chain";
        }
        match self.code {
            codes::USER_REJECTED => "user_rejected",
            codes::UNAUTHORIZED => "unauthorized",
            codes::UNSUPPORTED_METHOD => "unsupported_method",
            codes::DISCONNECTED => "disconnected",
            codes::CHAIN_DISCONNECTED => "chain_disconnected",
            codes::INTERNAL => "internal",
            _ => "other",
        }
    }
}

/// Result type for provider calls.
pub type ProviderResult<T> = Result<T, ProviderError>;

/// Lifecycle notification pushed by a provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderEvent {
    /// The provider lost its connection or the wallet ended the session.
    Disconnect,
    /// The exposed accounts changed; the first entry is the selected one.
    AccountsChanged(Vec<Address>),
    /// The wallet moved to another chain.
    ChainChanged(ChainId),
}

impl ProviderEvent {
    /// Short name used in logs and metric labels.
    pub fn kind(&self) -> &'static str {
        match self {
            ProviderEvent::Disconnect => "disconnect",
            ProviderEvent::AccountsChanged(_) => "accounts_changed",
            ProviderEvent::ChainChanged(_) => "chain_changed",
        }
    }
}

/// Parameter of `wallet_switchEthereumChain` (EIP-3326).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SwitchChainParameter {
    pub chain_id: String,
}

impl From<ChainId> for SwitchChainParameter {
    fn from(chain_id: ChainId) -> Self {
        Self {
            chain_id: chain_id.to_hex(),
        }
    }
}

/// Parameter of `wallet_addEthereumChain` (EIP-3085).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AddChainParameter {
    pub chain_id: String,
    pub chain_name: String,
    pub rpc_urls: Vec<String>,
    pub native_currency: NativeCurrency,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub block_explorer_urls: Vec<String>,
}

impl From<&NetworkDescriptor> for AddChainParameter {
    fn from(network: &NetworkDescriptor) -> Self {
        Self {
            chain_id: network.chain_id.to_hex(),
            chain_name: network.name.clone(),
            rpc_urls: network.rpc_urls.clone(),
            native_currency: network.currency.clone(),
            block_explorer_urls: network.explorer_urls.clone(),
        }
    }
}
