//! Token registry
//!
//! Maps currency symbols to token contracts and decimals, and converts amounts between
//! human units and base units. A symbol missing from the registry is an
//! `UnsupportedToken` error everywhere.

use std::collections::HashMap;

use ethers::types::{Address, U256};
use ethers::utils::{format_units, parse_units};
use tracing::{debug, warn};

use crate::error::{Result, SwapError};
use crate::types::TokenDetails;

/// Symbol → token details lookup
#[derive(Debug, Clone, Default)]
pub struct TokenRegistry {
    tokens: HashMap<String, TokenDetails>,
}

impl TokenRegistry {
    /// Build a registry from a symbol map
    pub fn new(tokens: HashMap<String, TokenDetails>) -> Self {
        Self { tokens }
    }

    /// Replace the registry content, e.g. after refreshing the aggregator token list
    pub fn replace(&mut self, tokens: HashMap<String, TokenDetails>) {
        debug!("Token registry refreshed with {} entries", tokens.len());
        self.tokens = tokens;
    }

    pub fn contains(&self, symbol: &str) -> bool {
        self.tokens.contains_key(symbol)
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Details for a symbol
    pub fn details(&self, symbol: &str) -> Result<&TokenDetails> {
        self.tokens.get(symbol).ok_or_else(|| {
            warn!("Token {} is not in the registry", symbol);
            SwapError::UnsupportedToken(symbol.to_string())
        })
    }

    /// Contract address of a token; the native currency has none
    pub fn token_address(&self, symbol: &str) -> Result<Address> {
        self.details(symbol)?
            .address
            .ok_or_else(|| SwapError::UnsupportedToken(symbol.to_string()))
    }

    pub fn token_decimals(&self, symbol: &str) -> Result<u8> {
        Ok(self.details(symbol)?.decimals)
    }

    /// Convert a human amount ("1.5") into base units, rounding down
    pub fn to_base_units(&self, symbol: &str, value: &str) -> Result<U256> {
        let decimals = self.token_decimals(symbol)?;
        to_base_units(value, decimals)
    }

    /// Convert base units into a human amount string
    pub fn from_base_units(&self, symbol: &str, value: U256) -> Result<String> {
        let decimals = self.token_decimals(symbol)?;
        format_units(value, decimals as u32)
            .map(|s| trim_fraction(&s))
            .map_err(|e| SwapError::InvalidAmount(e.to_string()))
    }
}

/// Convert a decimal string into base units, dropping digits beyond `decimals`
///
/// Only plain decimals are accepted: ASCII digits with at most one `.`.
pub fn to_base_units(value: &str, decimals: u8) -> Result<U256> {
    let value = value.trim();
    let (whole, fraction) = value.split_once('.').unwrap_or((value, ""));

    let is_digits = |s: &str| s.bytes().all(|b| b.is_ascii_digit());
    if (whole.is_empty() && fraction.is_empty()) || !is_digits(whole) || !is_digits(fraction) {
        return Err(SwapError::InvalidAmount(value.to_string()));
    }

    // ASCII only past this point, byte offsets are char boundaries
    let fraction = &fraction[..fraction.len().min(decimals as usize)];
    let normalized = match (whole.is_empty(), fraction.is_empty()) {
        (true, _) => format!("0.{}", fraction),
        (false, true) => whole.to_string(),
        (false, false) => format!("{}.{}", whole, fraction),
    };

    parse_units(normalized.as_str(), decimals as u32)
        .map(Into::into)
        .map_err(|e| SwapError::InvalidAmount(format!("{}: {}", value, e)))
}

fn trim_fraction(s: &str) -> String {
    if !s.contains('.') {
        return s.to_string();
    }
    let trimmed = s.trim_end_matches('0').trim_end_matches('.');
    trimmed.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn registry() -> TokenRegistry {
        let mut tokens = HashMap::new();
        tokens.insert(
            "ETH".to_string(),
            TokenDetails { name: "Ether".into(), address: None, decimals: 18 },
        );
        tokens.insert(
            "USDC".to_string(),
            TokenDetails {
                name: "USD Coin".into(),
                address: Some(
                    Address::from_str("0xa0b86991c6218b36c1d19d4a2e9eb0ce3606eb48").unwrap(),
                ),
                decimals: 6,
            },
        );
        TokenRegistry::new(tokens)
    }

    #[test]
    fn test_token_lookup() {
        let registry = registry();
        assert_eq!(registry.token_decimals("USDC").unwrap(), 6);
        assert!(registry.token_address("USDC").is_ok());
        assert_eq!(
            registry.token_address("XYZ"),
            Err(SwapError::UnsupportedToken("XYZ".into()))
        );
        // native currency has no contract
        assert_eq!(
            registry.token_address("ETH"),
            Err(SwapError::UnsupportedToken("ETH".into()))
        );
    }

    #[test]
    fn test_to_base_units() {
        let registry = registry();
        assert_eq!(registry.to_base_units("USDC", "1.5").unwrap(), U256::from(1_500_000));
        assert_eq!(registry.to_base_units("USDC", "2").unwrap(), U256::from(2_000_000));
        assert_eq!(registry.to_base_units("ETH", "1").unwrap(), U256::exp10(18));
    }

    #[test]
    fn test_to_base_units_rounds_down() {
        assert_eq!(to_base_units("1.23456789", 6).unwrap(), U256::from(1_234_567));
        assert_eq!(to_base_units("7.9", 0).unwrap(), U256::from(7));
    }

    #[test]
    fn test_to_base_units_rejects_garbage() {
        assert!(to_base_units("", 6).is_err());
        assert!(to_base_units("-1", 6).is_err());
        assert!(to_base_units("abc", 6).is_err());
        assert!(to_base_units("1.2.3", 6).is_err());
        assert!(to_base_units(".", 6).is_err());
        assert!(to_base_units("1e18", 18).is_err());
    }

    #[test]
    fn test_to_base_units_non_ascii_is_invalid() {
        assert_eq!(
            to_base_units("1.a\u{e9}\u{e9}\u{e9}\u{e9}", 6),
            Err(SwapError::InvalidAmount("1.a\u{e9}\u{e9}\u{e9}\u{e9}".into()))
        );
        assert!(to_base_units("\u{661}.5", 6).is_err());
        assert!(to_base_units("1.\u{e9}", 0).is_err());
    }

    #[test]
    fn test_to_base_units_partial_forms() {
        assert_eq!(to_base_units(".5", 1).unwrap(), U256::from(5));
        assert_eq!(to_base_units("3.", 2).unwrap(), U256::from(300));
        assert_eq!(to_base_units(" 0.000001 ", 6).unwrap(), U256::from(1));
    }

    #[test]
    fn test_from_base_units() {
        let registry = registry();
        assert_eq!(registry.from_base_units("USDC", U256::from(1_500_000)).unwrap(), "1.5");
        assert_eq!(registry.from_base_units("ETH", U256::exp10(18)).unwrap(), "1");
    }
}
