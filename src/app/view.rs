//! View selection derived from session status and account snapshot.
//!
//! Nothing here is stored; the view is recomputed from its inputs, so it
//! cannot drift from them.

use serde::Serialize;

use crate::account::AccountSnapshot;
use crate::network::types::ChainId;
use crate::session::SessionStatus;

/// Account details shown on the card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AccountCard {
    pub address: String,
    pub network: String,
    pub balance: String,
}

/// What the UI should show.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "view", rename_all = "snake_case")]
pub enum ViewState {
    /// Offer to connect a wallet.
    Connect { loading: bool, error: Option<String> },
    /// Connected, account not loaded yet: network selector and disconnect.
    Action { loading: bool, error: Option<String> },
    /// Connected with a loaded account.
    Card {
        card: AccountCard,
        loading: bool,
        error: Option<String>,
    },
}

impl ViewState {
    /// Derive the view. `top_error` (a failed command) wins over the
    /// snapshot's refresh error.
    pub fn derive(status: SessionStatus, snapshot: &AccountSnapshot, top_error: Option<&str>) -> Self {
        let loading = snapshot.loading;
        let error = top_error.map(str::to_string).or_else(|| snapshot.error.clone());

        if status == SessionStatus::Disconnected {
            return ViewState::Connect { loading, error };
        }

        let card = match (
            snapshot.address_display(),
            snapshot.network_label(),
            snapshot.balance_display(),
        ) {
            (Some(address), Some(network), Some(balance)) => AccountCard {
                address,
                network,
                balance,
            },
            _ => return ViewState::Action { loading, error },
        };

        ViewState::Card { card, loading, error }
    }

    pub fn loading(&self) -> bool {
        match self {
            ViewState::Connect { loading, .. }
            | ViewState::Action { loading, .. }
            | ViewState::Card { loading, .. } => *loading,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            ViewState::Connect { error, .. }
            | ViewState::Action { error, .. }
            | ViewState::Card { error, .. } => error.as_deref(),
        }
    }
}

/// One entry of the network selector.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SwitchOption {
    pub chain_id: ChainId,
    pub name: String,
    pub selected: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::account::Balance;
    use crate::network::types::NativeCurrency;
    use alloy::primitives::{address, U256};

    fn loaded() -> AccountSnapshot {
        AccountSnapshot {
            address: Some(address!("f39fd6e51aad88f6f4ce6ab8827279cfffb92266")),
            chain_id: Some(ChainId(137)),
            network: None,
            balance: Some(Balance::new(U256::from(1_500_000_000_000_000_000u64), &NativeCurrency::default())),
            loading: false,
            error: None,
        }
    }

    #[test]
    fn test_disconnected_shows_connect() {
        let view = ViewState::derive(SessionStatus::Disconnected, &AccountSnapshot::default(), None);
        assert_eq!(view, ViewState::Connect { loading: false, error: None });
    }

    #[test]
    fn test_connected_without_account_shows_action() {
        let snapshot = AccountSnapshot {
            loading: true,
            ..AccountSnapshot::default()
        };
        let view = ViewState::derive(SessionStatus::Connected, &snapshot, None);
        assert_eq!(view, ViewState::Action { loading: true, error: None });
    }

    #[test]
    fn test_loaded_account_shows_card() {
        let view = ViewState::derive(SessionStatus::Connected, &loaded(), None);
        let ViewState::Card { card, loading, error } = view else {
            panic!("expected card view");
        };
        assert_eq!(card.address, "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266");
        assert_eq!(card.network, "Chain 137");
        assert_eq!(card.balance, "1.5 ETH");
        assert!(!loading);
        assert!(error.is_none());
    }

    #[test]
    fn test_top_error_overrides_snapshot_error() {
        let mut snapshot = loaded();
        snapshot.error = Some("refresh failed".to_string());

        let view = ViewState::derive(SessionStatus::Connected, &snapshot, None);
        assert_eq!(view.error(), Some("refresh failed"));

        let view = ViewState::derive(SessionStatus::Connected, &snapshot, Some("switch failed"));
        assert_eq!(view.error(), Some("switch failed"));
    }

    #[test]
    fn test_serializes_with_view_tag() {
        let view = ViewState::derive(SessionStatus::Disconnected, &AccountSnapshot::default(), None);
        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["view"], "connect");
        assert_eq!(json["loading"], false);
    }
}
