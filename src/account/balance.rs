//! Balance rendering.

use alloy::primitives::U256;
use std::fmt;

use crate::network::types::NativeCurrency;

/// Characters of the decimal rendering kept for display, point included.
pub const BALANCE_DISPLAY_CHARS: usize = 6;

/// Largest decimal count whose unit fits in a U256.
const MAX_DECIMALS: u8 = 77;

/// A native-currency balance ready for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Balance {
    /// Raw amount in the smallest unit.
    pub raw: U256,
    /// Truncated decimal rendering.
    pub amount: String,
    /// Currency symbol.
    pub symbol: String,
}

impl Balance {
    pub fn new(raw: U256, currency: &NativeCurrency) -> Self {
        Self {
            raw,
            amount: truncate_display(&format_units(raw, currency.decimals)),
            symbol: currency.symbol.clone(),
        }
    }
}

impl fmt::Display for Balance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.amount, self.symbol)
    }
}

/// Render `raw` with `decimals` fractional digits, trailing zeros removed but
/// at least one fractional digit kept (`1` ether is `"1.0"`).
pub fn format_units(raw: U256, decimals: u8) -> String {
    let decimals = decimals.min(MAX_DECIMALS);
    let unit = U256::from(10u64).pow(U256::from(decimals));

    let integer = raw / unit;
    let fraction = raw % unit;

    let digits = format!("{:0>width$}", fraction.to_string(), width = decimals as usize);
    let trimmed = digits.trim_end_matches('0');
    let fraction = if trimmed.is_empty() { "0" } else { trimmed };

    format!("{integer}.{fraction}")
}

/// Keep the first characters of a rendering. Truncates, never rounds.
pub fn truncate_display(rendered: &str) -> String {
    rendered.chars().take(BALANCE_DISPLAY_CHARS).collect()
}
