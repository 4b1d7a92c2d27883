//! Shared utilities for integration testing.

#![allow(dead_code)]

use std::collections::{HashMap, HashSet, VecDeque};
use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use alloy::primitives::{address, Address, U256};
use async_trait::async_trait;
use serde_json::{json, Value};
use tokio::sync::{broadcast, Notify};

use wallet_session::network::{ChainId, NetworkRegistry};
use wallet_session::provider::{
    codes, ProviderError, ProviderEvent, ProviderResult, WalletConnector, WalletProvider,
};
use wallet_session::WalletApp;

pub const ALICE: Address = address!("f39fd6e51aad88f6f4ce6ab8827279cfffb92266");
pub const BOB: Address = address!("70997970c51812dc3a010c7d01b50e0d17dc79c8");

/// 1 ether in wei.
pub const ONE_ETHER: u128 = 1_000_000_000_000_000_000;

/// A request paused until the test releases it.
#[derive(Clone, Default)]
pub struct Gate {
    reached: Arc<Notify>,
    release: Arc<Notify>,
}

impl Gate {
    /// Wait until the gated request is in flight.
    pub async fn reached(&self) {
        self.reached.notified().await;
    }

    /// Let the gated request answer.
    pub fn release(&self) {
        self.release.notify_one();
    }
}

struct WalletState {
    chain_id: u64,
    accounts: Vec<Address>,
    balance: U256,
    known_chains: HashSet<u64>,
}

/// In-memory wallet that behaves like a browser extension: it knows a set of
/// chains, answers 4902 for the others and adds chains on request.
pub struct MockWallet {
    state: Mutex<WalletState>,
    calls: Mutex<Vec<(String, Value)>>,
    failures: Mutex<HashMap<String, VecDeque<ProviderError>>>,
    gates: Mutex<HashMap<String, Gate>>,
    events: broadcast::Sender<ProviderEvent>,
}

impl MockWallet {
    /// Wallet on `chain_id` knowing `known` chains (plus the current one).
    pub fn new(chain_id: u64, known: &[u64]) -> Arc<Self> {
        let mut known_chains: HashSet<u64> = known.iter().copied().collect();
        known_chains.insert(chain_id);

        let (events, _) = broadcast::channel(16);
        Arc::new(Self {
            state: Mutex::new(WalletState {
                chain_id,
                accounts: vec![ALICE],
                balance: U256::from(ONE_ETHER),
                known_chains,
            }),
            calls: Mutex::new(Vec::new()),
            failures: Mutex::new(HashMap::new()),
            gates: Mutex::new(HashMap::new()),
            events,
        })
    }

    /// Wallet on mainnet that knows nothing else.
    pub fn mainnet() -> Arc<Self> {
        Self::new(1, &[])
    }

    pub fn set_chain(&self, chain_id: u64) {
        let mut state = self.state.lock().unwrap();
        state.chain_id = chain_id;
        state.known_chains.insert(chain_id);
    }

    pub fn set_accounts(&self, accounts: Vec<Address>) {
        self.state.lock().unwrap().accounts = accounts;
    }

    pub fn set_balance(&self, wei: u128) {
        self.state.lock().unwrap().balance = U256::from(wei);
    }

    pub fn chain(&self) -> u64 {
        self.state.lock().unwrap().chain_id
    }

    pub fn knows(&self, chain_id: u64) -> bool {
        self.state.lock().unwrap().known_chains.contains(&chain_id)
    }

    /// Fail the next call of `method` with `error`.
    pub fn fail_next(&self, method: &str, error: ProviderError) {
        self.failures
            .lock()
            .unwrap()
            .entry(method.to_string())
            .or_default()
            .push_back(error);
    }

    /// Hold the next call of `method` until the returned gate is released.
    pub fn gate(&self, method: &str) -> Gate {
        let gate = Gate::default();
        self.gates.lock().unwrap().insert(method.to_string(), gate.clone());
        gate
    }

    pub fn emit(&self, event: ProviderEvent) {
        let _ = self.events.send(event);
    }

    pub fn subscriber_count(&self) -> usize {
        self.events.receiver_count()
    }

    /// Methods called so far, in order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().iter().map(|(m, _)| m.clone()).collect()
    }

    /// Wallet-management calls only (`wallet_*`), in order.
    pub fn wallet_calls(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter(|m| m.starts_with("wallet_"))
            .collect()
    }

    pub fn count(&self, method: &str) -> usize {
        self.calls().iter().filter(|m| *m == method).count()
    }

    /// Params of the most recent call of `method`.
    pub fn last_params(&self, method: &str) -> Option<Value> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .rev()
            .find(|(m, _)| m == method)
            .map(|(_, params)| params.clone())
    }

    fn answer(&self, method: &str, params: &Value) -> ProviderResult<Value> {
        let mut state = self.state.lock().unwrap();
        match method {
            "eth_accounts" => Ok(json!(state.accounts)),
            "eth_chainId" => Ok(json!(format!("{:#x}", state.chain_id))),
            "eth_getBalance" => Ok(json!(state.balance)),
            "wallet_switchEthereumChain" => {
                let target = requested_chain(params)?;
                if !state.known_chains.contains(&target) {
                    return Err(ProviderError::new(
                        codes::UNRECOGNIZED_CHAIN,
                        format!("Unrecognized chain ID \"{:#x}\"", target),
                    ));
                }
                state.chain_id = target;
                Ok(Value::Null)
            }
            "wallet_addEthereumChain" => {
                let target = requested_chain(params)?;
                state.known_chains.insert(target);
                Ok(Value::Null)
            }
            _ => Err(ProviderError::new(codes::UNSUPPORTED_METHOD, "Method not supported")),
        }
    }
}

fn requested_chain(params: &Value) -> ProviderResult<u64> {
    params
        .pointer("/0/chainId")
        .and_then(Value::as_str)
        .and_then(|hex| hex.parse::<ChainId>().ok())
        .map(u64::from)
        .ok_or_else(|| ProviderError::new(-32602, "Invalid params"))
}

#[async_trait]
impl WalletProvider for MockWallet {
    async fn request(&self, method: &str, params: Value) -> ProviderResult<Value> {
        self.calls
            .lock()
            .unwrap()
            .push((method.to_string(), params.clone()));

        let gate = self.gates.lock().unwrap().remove(method);
        if let Some(gate) = gate {
            gate.reached.notify_one();
            gate.release.notified().await;
        }

        let failure = self
            .failures
            .lock()
            .unwrap()
            .get_mut(method)
            .and_then(VecDeque::pop_front);
        if let Some(error) = failure {
            return Err(error);
        }

        self.answer(method, &params)
    }

    fn subscribe(&self) -> Option<broadcast::Receiver<ProviderEvent>> {
        Some(self.events.subscribe())
    }
}

/// Hands out the same wallet on every connect.
pub struct MockConnector {
    wallet: Arc<MockWallet>,
    reject: Mutex<Option<ProviderError>>,
    gate: Mutex<Option<Gate>>,
    connects: AtomicUsize,
    clears: AtomicUsize,
}

impl MockConnector {
    pub fn new(wallet: Arc<MockWallet>) -> Arc<Self> {
        Arc::new(Self {
            wallet,
            reject: Mutex::new(None),
            gate: Mutex::new(None),
            connects: AtomicUsize::new(0),
            clears: AtomicUsize::new(0),
        })
    }

    /// Make the next connect fail, as if the user closed the wallet dialog.
    pub fn reject_next(&self, error: ProviderError) {
        *self.reject.lock().unwrap() = Some(error);
    }

    /// Hold the next connect, as if the user were still picking a wallet.
    pub fn gate_next(&self) -> Gate {
        let gate = Gate::default();
        *self.gate.lock().unwrap() = Some(gate.clone());
        gate
    }

    pub fn connects(&self) -> usize {
        self.connects.load(Ordering::SeqCst)
    }

    pub fn clears(&self) -> usize {
        self.clears.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl WalletConnector for MockConnector {
    async fn connect(&self) -> ProviderResult<Arc<dyn WalletProvider>> {
        self.connects.fetch_add(1, Ordering::SeqCst);
        let gate = self.gate.lock().unwrap().take();
        if let Some(gate) = gate {
            gate.reached.notify_one();
            gate.release.notified().await;
        }
        if let Some(error) = self.reject.lock().unwrap().take() {
            return Err(error);
        }
        Ok(self.wallet.clone())
    }

    async fn clear_cached_provider(&self) {
        self.clears.fetch_add(1, Ordering::SeqCst);
    }
}

/// App over the built-in catalog, plus handles on its wallet and connector.
pub fn app_with(wallet: Arc<MockWallet>) -> (WalletApp, Arc<MockConnector>) {
    let connector = MockConnector::new(wallet);
    let app = WalletApp::new(Arc::new(NetworkRegistry::default()), connector.clone());
    (app, connector)
}

/// Poll `condition` until it holds, failing the test after two seconds.
pub async fn eventually<F>(mut condition: F)
where
    F: FnMut() -> bool,
{
    let deadline = tokio::time::Instant::now() + Duration::from_secs(2);
    while !condition() {
        assert!(tokio::time::Instant::now() < deadline, "condition not reached in time");
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}

/// Await `future`, failing the test after two seconds.
pub async fn within<F: Future>(future: F) -> F::Output {
    tokio::time::timeout(Duration::from_secs(2), future)
        .await
        .expect("operation timed out")
}
