//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Chain ids unique across the catalog
//! - URLs parse, currencies are usable, intervals are non-zero
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: WalletConfig → Result<(), Vec<ValidationError>>

use std::collections::HashSet;
use thiserror::Error;

use crate::config::schema::WalletConfig;
use crate::network::types::{ChainId, NativeCurrency};

/// Largest decimal count whose unit still fits in a U256.
const MAX_DECIMALS: u8 = 77;

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("chain id {0} is declared more than once")]
    DuplicateChainId(ChainId),

    #[error("network {0} has an empty name")]
    EmptyName(ChainId),

    #[error("{context}: currency symbol is empty")]
    EmptySymbol { context: String },

    #[error("{context}: {decimals} decimals exceeds the maximum of 77")]
    TooManyDecimals { context: String, decimals: u8 },

    #[error("{context}: invalid URL '{url}'")]
    InvalidUrl { context: String, url: String },

    #[error("{field} must be greater than zero")]
    Zero { field: &'static str },
}

/// Validate a parsed configuration.
pub fn validate_config(config: &WalletConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();
    let mut seen = HashSet::new();

    for network in &config.networks {
        let id = network.chain_id;
        let context = format!("network {id}");

        if !seen.insert(id) {
            errors.push(ValidationError::DuplicateChainId(id));
        }
        if network.name.trim().is_empty() {
            errors.push(ValidationError::EmptyName(id));
        }
        check_currency(&network.currency, &context, &mut errors);

        for url in network.rpc_urls.iter().chain(&network.explorer_urls) {
            if url::Url::parse(url).is_err() {
                errors.push(ValidationError::InvalidUrl {
                    context: context.clone(),
                    url: url.clone(),
                });
            }
        }
    }

    check_currency(&config.fallback_currency, "fallback currency", &mut errors);

    let provider = &config.provider;
    if url::Url::parse(&provider.rpc_url).is_err() {
        errors.push(ValidationError::InvalidUrl {
            context: "provider".to_string(),
            url: provider.rpc_url.clone(),
        });
    }
    if provider.request_timeout_secs == 0 {
        errors.push(ValidationError::Zero { field: "provider.request_timeout_secs" });
    }
    if provider.poll_interval_ms == 0 {
        errors.push(ValidationError::Zero { field: "provider.poll_interval_ms" });
    }
    if provider.disconnect_after_failures == 0 {
        errors.push(ValidationError::Zero { field: "provider.disconnect_after_failures" });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_currency(currency: &NativeCurrency, context: &str, errors: &mut Vec<ValidationError>) {
    if currency.symbol.trim().is_empty() {
        errors.push(ValidationError::EmptySymbol { context: context.to_string() });
    }
    if currency.decimals > MAX_DECIMALS {
        errors.push(ValidationError::TooManyDecimals {
            context: context.to_string(),
            decimals: currency.decimals,
        });
    }
}
