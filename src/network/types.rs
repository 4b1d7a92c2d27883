//! Chain identifiers and network descriptors.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Chain ID type for strong typing.
///
/// Providers report chain ids as `0x`-prefixed hex strings while catalogs and
/// users tend to write decimals. Everything is normalized into this integer
/// form before comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "ChainIdRepr", into = "u64")]
pub struct ChainId(pub u64);

impl ChainId {
    /// Wire form used in `wallet_switchEthereumChain` / `wallet_addEthereumChain`:
    /// lowercase hex, `0x` prefix, no leading zeros.
    pub fn to_hex(self) -> String {
        format!("{:#x}", self.0)
    }
}

impl From<u64> for ChainId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

impl From<ChainId> for u64 {
    fn from(id: ChainId) -> Self {
        id.0
    }
}

impl fmt::Display for ChainId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

/// Error returned when a chain id string cannot be normalized.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid chain id '{input}'")]
pub struct ChainIdParseError {
    pub input: String,
}

impl FromStr for ChainId {
    type Err = ChainIdParseError;

    /// Accepts `"5"`, `"0x5"`, `"0x05"` and `"0X5"`. Hex digits are
    /// case-insensitive.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ChainIdParseError { input: s.to_string() };

        let (digits, radix) = match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
            Some(hex) => (hex, 16),
            None => (s, 10),
        };

        // from_str_radix tolerates a leading '+', which is not a chain id.
        if digits.is_empty() || !digits.chars().all(|c| c.is_digit(radix)) {
            return Err(err());
        }

        u64::from_str_radix(digits, radix).map(ChainId).map_err(|_| err())
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ChainIdRepr {
    Num(u64),
    Str(String),
}

impl TryFrom<ChainIdRepr> for ChainId {
    type Error = ChainIdParseError;

    fn try_from(repr: ChainIdRepr) -> Result<Self, Self::Error> {
        match repr {
            ChainIdRepr::Num(n) => Ok(ChainId(n)),
            ChainIdRepr::Str(s) => s.parse(),
        }
    }
}

/// Native currency of a network.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NativeCurrency {
    /// Human readable name (e.g., "Goerli ETH").
    pub name: String,
    /// Ticker symbol shown next to balances.
    pub symbol: String,
    /// Decimal places of the smallest unit.
    pub decimals: u8,
}

impl Default for NativeCurrency {
    fn default() -> Self {
        Self {
            name: "Ether".to_string(),
            symbol: "ETH".to_string(),
            decimals: 18,
        }
    }
}

/// A known network.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkDescriptor {
    /// Chain id, unique within a registry.
    #[serde(rename = "id")]
    pub chain_id: ChainId,

    /// Display name.
    pub name: String,

    /// Native currency.
    #[serde(rename = "native_currency")]
    pub currency: NativeCurrency,

    /// RPC endpoints handed to the wallet when registering the chain.
    /// Empty for networks every wallet ships with.
    #[serde(default)]
    pub rpc_urls: Vec<String>,

    /// Block explorer URLs.
    #[serde(default)]
    pub explorer_urls: Vec<String>,
}

impl NetworkDescriptor {
    /// Whether the wallet needs RPC endpoints to register this network.
    pub fn requires_registration(&self) -> bool {
        !self.rpc_urls.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chain_id_conversion() {
        let chain_id = ChainId::from(5u64);
        assert_eq!(chain_id.0, 5);
        assert_eq!(u64::from(chain_id), 5);
        assert_eq!(chain_id.to_string(), "5");
    }

    #[test]
    fn test_parse_decimal_and_hex_agree() {
        let decimal: ChainId = "42".parse().unwrap();
        assert_eq!(decimal, ChainId(42));
        assert_eq!("0x2a".parse::<ChainId>().unwrap(), decimal);
        assert_eq!("0x2A".parse::<ChainId>().unwrap(), decimal);
        assert_eq!("0X2a".parse::<ChainId>().unwrap(), decimal);
        assert_eq!("0x002a".parse::<ChainId>().unwrap(), decimal);
    }

    #[test]
    fn test_parse_rejects_garbage() {
        for input in ["", "0x", "+5", "-5", " 5", "0xzz", "5.0", "18446744073709551616"] {
            assert!(input.parse::<ChainId>().is_err(), "{input:?} should not parse");
        }
        let err = "0x".parse::<ChainId>().unwrap_err();
        assert_eq!(err.to_string(), "invalid chain id '0x'");
    }

    #[test]
    fn test_hex_wire_form() {
        assert_eq!(ChainId(1).to_hex(), "0x1");
        assert_eq!(ChainId(5).to_hex(), "0x5");
        assert_eq!(ChainId(42).to_hex(), "0x2a");
        assert_eq!(ChainId(11155111).to_hex(), "0xaa36a7");
    }

    #[test]
    fn test_deserialize_number_or_string() {
        #[derive(Deserialize)]
        struct Holder {
            id: ChainId,
        }

        let a: Holder = serde_json::from_str(r#"{"id": 5}"#).unwrap();
        let b: Holder = serde_json::from_str(r#"{"id": "0x5"}"#).unwrap();
        let c: Holder = serde_json::from_str(r#"{"id": "5"}"#).unwrap();
        assert_eq!(a.id, ChainId(5));
        assert_eq!(b.id, ChainId(5));
        assert_eq!(c.id, ChainId(5));
        assert!(serde_json::from_str::<Holder>(r#"{"id": "0x"}"#).is_err());
    }

    #[test]
    fn test_requires_registration() {
        let mut network = NetworkDescriptor {
            chain_id: ChainId(1),
            name: "Ethereum".to_string(),
            currency: NativeCurrency::default(),
            rpc_urls: Vec::new(),
            explorer_urls: Vec::new(),
        };
        assert!(!network.requires_registration());
        network.rpc_urls.push("https://rpc.example".to_string());
        assert!(network.requires_registration());
    }
}
