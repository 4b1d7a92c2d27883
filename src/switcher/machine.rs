//! Network switch state machine.
//!
//! # State Transitions
//! ```text
//! Idle → Switching:      target differs from the observed chain
//! Switching → Done:      wallet switched
//! Switching → Registering: wallet reports 4902 and the catalog has the chain
//!                          with RPC endpoints to hand over
//! Switching → Failed:    any other wallet error, or 4902 for a chain the
//!                        catalog cannot describe
//! Registering → Retrying: wallet added the chain
//! Registering → Failed:  wallet refused to add it
//! Retrying → Done:       wallet switched
//! Retrying → Failed:     any wallet error, including another 4902
//! ```
//!
//! Retrying never leads back to Registering, so a request makes at most
//! one add-chain call and two switch calls.

use std::sync::Arc;

use crate::network::registry::NetworkRegistry;
use crate::network::types::{ChainId, NetworkDescriptor};
use crate::observability::metrics;
use crate::provider::ProviderError;
use crate::session::Session;
use crate::switcher::types::{SwitchError, SwitchPhase, SwitchReport, SwitchResult};

/// Working state, carrying what the next transition needs.
enum Step<'a> {
    Switching,
    Registering(&'a NetworkDescriptor),
    Retrying,
    Done,
    Failed(SwitchError),
}

impl Step<'_> {
    fn phase(&self) -> SwitchPhase {
        match self {
            Step::Switching => SwitchPhase::Switching,
            Step::Registering(_) => SwitchPhase::Registering,
            Step::Retrying => SwitchPhase::Retrying,
            Step::Done => SwitchPhase::Done,
            Step::Failed(_) => SwitchPhase::Failed,
        }
    }
}

/// Runs the switch protocol against a session.
#[derive(Debug, Clone)]
pub struct NetworkSwitcher {
    registry: Arc<NetworkRegistry>,
}

impl NetworkSwitcher {
    pub fn new(registry: Arc<NetworkRegistry>) -> Self {
        Self { registry }
    }

    /// Move the wallet behind `session` to `target`.
    ///
    /// `observed` is the chain the application last saw; when unknown the
    /// wallet is asked.
    pub async fn switch(
        &self,
        session: &Session,
        observed: Option<ChainId>,
        target: ChainId,
    ) -> SwitchResult<SwitchReport> {
        let result = self.run(session, observed, target).await;
        match &result {
            Ok(report) => {
                metrics::record_switch(if report.registered { "registered" } else { "switched" });
                tracing::info!(chain_id = %target, registered = report.registered, "Network switched");
            }
            Err(e) => {
                metrics::record_switch(e.label());
                tracing::warn!(
                    chain_id = %target,
                    reason = e.reason(),
                    error = %e,
                    "Network switch ended without change"
                );
            }
        }
        result
    }

    async fn run(
        &self,
        session: &Session,
        observed: Option<ChainId>,
        target: ChainId,
    ) -> SwitchResult<SwitchReport> {
        let provider = session.provider();

        let current = match observed {
            Some(chain_id) => chain_id,
            None => provider.chain_id().await.map_err(SwitchError::SwitchFailed)?,
        };
        if current == target {
            return Err(SwitchError::AlreadyConnected(self.registry.display_name(target)));
        }

        let mut phases = vec![SwitchPhase::Idle];
        let mut registered = false;
        let mut step = Step::Switching;

        loop {
            phases.push(step.phase());
            tracing::debug!(chain_id = %target, phase = step.phase().as_str(), "Switch phase");

            step = match step {
                Step::Switching => match provider.switch_chain(target).await {
                    Ok(()) => Step::Done,
                    Err(e) if e.is_unrecognized_chain() => self.registration_step(target, e),
                    Err(e) => Step::Failed(SwitchError::SwitchFailed(e)),
                },
                Step::Registering(network) => match provider.add_chain(network).await {
                    Ok(()) => {
                        registered = true;
                        Step::Retrying
                    }
                    Err(e) => Step::Failed(SwitchError::SwitchFailed(e)),
                },
                Step::Retrying => match provider.switch_chain(target).await {
                    Ok(()) => Step::Done,
                    Err(e) => Step::Failed(SwitchError::SwitchFailed(e)),
                },
                Step::Done => {
                    return Ok(SwitchReport {
                        chain_id: target,
                        registered,
                        phases,
                    });
                }
                Step::Failed(e) => return Err(e),
            };
        }
    }

    fn registration_step(&self, target: ChainId, cause: ProviderError) -> Step<'_> {
        match self.registry.find(target) {
            Some(network) if !network.requires_registration() => {
                tracing::warn!(
                    chain_id = %target,
                    name = %network.name,
                    error = %cause,
                    "Wallet does not know chain and the catalog has no RPC endpoints for it"
                );
                Step::Failed(SwitchError::UnsupportedNetwork(target))
            }
            Some(network) => {
                tracing::info!(chain_id = %target, name = %network.name, "Wallet does not know chain, registering");
                Step::Registering(network)
            }
            None => {
                tracing::debug!(chain_id = %target, error = %cause, "Unknown chain missing from registry");
                Step::Failed(SwitchError::UnsupportedNetwork(target))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::{codes, ProviderResult, ProviderEvent, WalletProvider};
    use async_trait::async_trait;
    use serde_json::Value;
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use tokio::sync::broadcast;

    /// Answers requests from a script and records the methods called.
    struct ScriptedWallet {
        chain: u64,
        replies: Mutex<VecDeque<ProviderResult<Value>>>,
        calls: Mutex<Vec<String>>,
    }

    impl ScriptedWallet {
        fn new(chain: u64, replies: Vec<ProviderResult<Value>>) -> Arc<Self> {
            Arc::new(Self {
                chain,
                replies: Mutex::new(replies.into()),
                calls: Mutex::new(Vec::new()),
            })
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl WalletProvider for ScriptedWallet {
        async fn request(&self, method: &str, _params: Value) -> ProviderResult<Value> {
            self.calls.lock().unwrap().push(method.to_string());
            if method == "eth_chainId" {
                return Ok(Value::String(ChainId(self.chain).to_hex()));
            }
            self.replies
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or(Ok(Value::Null))
        }

        fn subscribe(&self) -> Option<broadcast::Receiver<ProviderEvent>> {
            None
        }
    }

    const SWITCH: &str = "wallet_switchEthereumChain";
    const ADD: &str = "wallet_addEthereumChain";

    fn unknown_chain() -> ProviderResult<Value> {
        Err(ProviderError::new(codes::UNRECOGNIZED_CHAIN, "Unrecognized chain ID"))
    }

    fn rejected() -> ProviderResult<Value> {
        Err(ProviderError::new(codes::USER_REJECTED, "User rejected the request."))
    }

    fn setup(chain: u64, replies: Vec<ProviderResult<Value>>) -> (NetworkSwitcher, Session, Arc<ScriptedWallet>) {
        let wallet = ScriptedWallet::new(chain, replies);
        let session = Session::new(1, wallet.clone());
        let switcher = NetworkSwitcher::new(Arc::new(NetworkRegistry::default()));
        (switcher, session, wallet)
    }

    #[tokio::test]
    async fn test_same_chain_is_already_connected() {
        let (switcher, session, wallet) = setup(5, vec![]);

        let err = switcher.switch(&session, Some(ChainId(5)), ChainId(5)).await.unwrap_err();
        assert_eq!(err, SwitchError::AlreadyConnected("Goerli".to_string()));
        assert!(wallet.calls().is_empty());
    }

    #[tokio::test]
    async fn test_observed_chain_queried_when_unknown() {
        let (switcher, session, wallet) = setup(42, vec![]);

        let err = switcher.switch(&session, None, ChainId(42)).await.unwrap_err();
        assert_eq!(err, SwitchError::AlreadyConnected("Kovan".to_string()));
        assert_eq!(wallet.calls(), vec!["eth_chainId"]);
    }

    #[tokio::test]
    async fn test_direct_switch() {
        let (switcher, session, wallet) = setup(1, vec![Ok(Value::Null)]);

        let report = switcher.switch(&session, Some(ChainId(1)), ChainId(4)).await.unwrap();
        assert!(!report.registered);
        assert_eq!(
            report.phases,
            vec![SwitchPhase::Idle, SwitchPhase::Switching, SwitchPhase::Done]
        );
        assert_eq!(wallet.calls(), vec![SWITCH]);
    }

    #[tokio::test]
    async fn test_register_then_retry_once() {
        let (switcher, session, wallet) = setup(1, vec![unknown_chain(), Ok(Value::Null), Ok(Value::Null)]);

        let report = switcher.switch(&session, Some(ChainId(1)), ChainId(5)).await.unwrap();
        assert!(report.registered);
        assert_eq!(
            report.phases,
            vec![
                SwitchPhase::Idle,
                SwitchPhase::Switching,
                SwitchPhase::Registering,
                SwitchPhase::Retrying,
                SwitchPhase::Done,
            ]
        );
        assert_eq!(wallet.calls(), vec![SWITCH, ADD, SWITCH]);
    }

    #[tokio::test]
    async fn test_unknown_and_uncatalogued_is_unsupported() {
        let (switcher, session, wallet) = setup(1, vec![unknown_chain()]);

        let err = switcher.switch(&session, Some(ChainId(1)), ChainId(137)).await.unwrap_err();
        assert_eq!(err, SwitchError::UnsupportedNetwork(ChainId(137)));
        assert_eq!(wallet.calls(), vec![SWITCH]);
    }

    #[tokio::test]
    async fn test_other_error_fails_without_registration() {
        let (switcher, session, wallet) = setup(1, vec![rejected()]);

        let err = switcher.switch(&session, Some(ChainId(1)), ChainId(5)).await.unwrap_err();
        assert!(matches!(err, SwitchError::SwitchFailed(ref e) if e.code == codes::USER_REJECTED));
        assert_eq!(err.reason(), "user_rejected");
        assert_eq!(wallet.calls(), vec![SWITCH]);
    }

    #[tokio::test]
    async fn test_catalog_entry_without_rpc_urls_is_not_registered() {
        let (switcher, session, wallet) = setup(5, vec![unknown_chain()]);

        let err = switcher.switch(&session, Some(ChainId(5)), ChainId(1)).await.unwrap_err();
        assert_eq!(err, SwitchError::UnsupportedNetwork(ChainId(1)));
        assert_eq!(err.reason(), "unsupported");
        assert_eq!(wallet.calls(), vec![SWITCH]);
    }

    #[tokio::test]
    async fn test_rejected_registration_fails() {
        let (switcher, session, wallet) = setup(1, vec![unknown_chain(), rejected()]);

        let err = switcher.switch(&session, Some(ChainId(1)), ChainId(5)).await.unwrap_err();
        assert!(matches!(err, SwitchError::SwitchFailed(ref e) if e.code == codes::USER_REJECTED));
        assert_eq!(wallet.calls(), vec![SWITCH, ADD]);
    }

    #[tokio::test]
    async fn test_retry_is_not_repeated() {
        let (switcher, session, wallet) = setup(1, vec![unknown_chain(), Ok(Value::Null), unknown_chain()]);

        let err = switcher.switch(&session, Some(ChainId(1)), ChainId(5)).await.unwrap_err();
        assert!(matches!(err, SwitchError::SwitchFailed(ref e) if e.is_unrecognized_chain()));
        assert_eq!(wallet.calls(), vec![SWITCH, ADD, SWITCH]);
    }
}
