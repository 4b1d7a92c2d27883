//! Account snapshot.

use alloy::primitives::Address;

use crate::account::balance::Balance;
use crate::network::types::{ChainId, NetworkDescriptor};

/// What the application knows about the connected account.
///
/// Never mutated in place: every change publishes a new snapshot. While
/// `loading` is set, the other fields still describe the last completed
/// refresh.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AccountSnapshot {
    /// Selected account.
    pub address: Option<Address>,
    /// Chain the wallet reported.
    pub chain_id: Option<ChainId>,
    /// Catalog entry for `chain_id`, absent for uncatalogued chains.
    pub network: Option<NetworkDescriptor>,
    /// Native balance of `address`.
    pub balance: Option<Balance>,
    /// A refresh is in flight.
    pub loading: bool,
    /// Last refresh failure, human readable.
    pub error: Option<String>,
}

impl AccountSnapshot {
    /// Whether an account has been loaded.
    pub fn has_account(&self) -> bool {
        self.address.is_some()
    }

    /// EIP-55 checksummed address.
    pub fn address_display(&self) -> Option<String> {
        self.address.map(|address| address.to_checksum(None))
    }

    /// Network name, or `Chain <id>` for uncatalogued chains.
    pub fn network_label(&self) -> Option<String> {
        match (&self.network, self.chain_id) {
            (Some(network), _) => Some(network.name.clone()),
            (None, Some(chain_id)) => Some(format!("Chain {chain_id}")),
            (None, None) => None,
        }
    }

    /// Balance with currency symbol.
    pub fn balance_display(&self) -> Option<String> {
        self.balance.as_ref().map(Balance::to_string)
    }

    /// Copy marked as loading, with the error cleared.
    pub(crate) fn loading(&self) -> Self {
        Self {
            loading: true,
            error: None,
            ..self.clone()
        }
    }

    /// Copy carrying a failure, keeping the substantive fields.
    pub(crate) fn failed(&self, error: String) -> Self {
        Self {
            loading: false,
            error: Some(error),
            ..self.clone()
        }
    }
}
