//! Metrics collection.
//!
//! # Metrics
//! - `wallet_connect_total` (counter): connection attempts by outcome
//! - `wallet_session_events_total` (counter): provider events by kind
//! - `wallet_switch_total` (counter): network switches by outcome
//! - `wallet_refresh_total` (counter): account refreshes by outcome
//!
//! # Design Decisions
//! - Label values are static strings, no per-address cardinality

pub fn record_connect(outcome: &'static str) {
    metrics::counter!("wallet_connect_total", "outcome" => outcome).increment(1);
}

pub fn record_session_event(kind: &'static str) {
    metrics::counter!("wallet_session_events_total", "kind" => kind).increment(1);
}

pub fn record_switch(outcome: &'static str) {
    metrics::counter!("wallet_switch_total", "outcome" => outcome).increment(1);
}

pub fn record_refresh(outcome: &'static str) {
    metrics::counter!("wallet_refresh_total", "outcome" => outcome).increment(1);
}
