/// Configuration module for dexag
///
/// This module defines the configuration used by the swap engine: aggregator and RPC
/// endpoints, the wrapped native token, supported liquidity sources, disabled
/// currencies and the token registry.

use std::collections::{HashMap, HashSet};
use std::env;
use std::fs;
use std::path::Path;
use std::str::FromStr;

use anyhow::{Result, Context, bail};
use ethers::types::Address;
use serde::{Serialize, Deserialize};
use tracing::{info, warn};

use crate::tokens::TokenRegistry;
use crate::types::TokenDetails;

/// Network served by the aggregator
pub const SUPPORTED_NETWORK: &str = "ETH";

/// Wrapped ether on Ethereum mainnet
pub const WETH_TOKEN_ADDRESS: &str = "0xc02aaa39b223fe8d0a0e5c4f27ead9083c756cc2";

/// Prefix of environment variables overriding the file configuration
pub const ENV_PREFIX: &str = "DEXAG_";

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DexAgConfig {
    /// Network identifier (only ETH is served)
    pub network: String,

    /// Symbol of the network's native currency
    pub base_currency: String,

    /// Symbol of the wrapped native token
    pub wrapped_currency: String,

    /// Wrapped native token contract
    pub weth_address: Address,

    /// Aggregator REST endpoint
    pub api_url: String,

    /// JSON-RPC endpoint used for allowance and balance reads
    pub rpc_url: String,

    /// HTTP timeout for aggregator calls, in seconds
    pub request_timeout_secs: u64,

    /// Liquidity sources known to work; others get a zero rate
    pub supported_dexes: Vec<String>,

    /// Currencies that must never be swapped
    pub disabled_symbols: HashSet<String>,

    /// Token registry seed, symbol → details
    pub tokens: HashMap<String, TokenDetails>,

    /// Log level (error, warn, info, debug, trace)
    pub log_level: String,
}

impl Default for DexAgConfig {
    fn default() -> Self {
        Self {
            network: SUPPORTED_NETWORK.to_string(),
            base_currency: "ETH".to_string(),
            wrapped_currency: "WETH".to_string(),
            weth_address: parse_address(WETH_TOKEN_ADDRESS),
            api_url: "https://api-v2.dex.ag".to_string(),
            rpc_url: "https://cloudflare-eth.com".to_string(),
            request_timeout_secs: 30,
            supported_dexes: ["ag", "kyber", "uniswap", "bancor", "oasis", "zero_x", "curvefi"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            disabled_symbols: ["USDT".to_string()].into_iter().collect(),
            tokens: default_tokens(),
            log_level: "info".to_string(),
        }
    }
}

fn parse_address(s: &str) -> Address {
    Address::from_str(s).unwrap_or_default()
}

fn default_tokens() -> HashMap<String, TokenDetails> {
    let entries: [(&str, &str, Option<&str>, u8); 5] = [
        ("ETH", "Ether", None, 18),
        ("WETH", "Wrapped Ether", Some(WETH_TOKEN_ADDRESS), 18),
        ("DAI", "Dai Stablecoin", Some("0x6b175474e89094c44da98b954eedeac495271d0f"), 18),
        ("USDC", "USD Coin", Some("0xa0b86991c6218b36c1d19d4a2e9eb0ce3606eb48"), 6),
        ("USDT", "Tether USD", Some("0xdac17f958d2ee523a2206206994597c13d831ec7"), 6),
    ];

    entries
        .iter()
        .map(|(symbol, name, address, decimals)| {
            (
                symbol.to_string(),
                TokenDetails {
                    name: name.to_string(),
                    address: address.map(parse_address),
                    decimals: *decimals,
                },
            )
        })
        .collect()
}

impl DexAgConfig {
    /// Apply `DEXAG_*` environment overrides
    pub fn apply_env_overrides(&mut self) -> Result<()> {
        self.apply_overrides(|key| env::var(format!("{}{}", ENV_PREFIX, key)).ok())
    }

    fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup("NETWORK") {
            self.network = v;
        }
        if let Some(v) = lookup("API_URL") {
            self.api_url = v;
        }
        if let Some(v) = lookup("RPC_URL") {
            self.rpc_url = v;
        }
        if let Some(v) = lookup("LOG_LEVEL") {
            self.log_level = v;
        }
        if let Some(v) = lookup("WETH_ADDRESS") {
            self.weth_address = Address::from_str(&v)
                .with_context(|| format!("Invalid {}WETH_ADDRESS: {}", ENV_PREFIX, v))?;
        }
        if let Some(v) = lookup("REQUEST_TIMEOUT_SECS") {
            self.request_timeout_secs = v
                .parse()
                .with_context(|| format!("Invalid {}REQUEST_TIMEOUT_SECS: {}", ENV_PREFIX, v))?;
        }
        if let Some(v) = lookup("DISABLED_SYMBOLS") {
            self.disabled_symbols = v
                .split(',')
                .map(|s| s.trim().to_uppercase())
                .filter(|s| !s.is_empty())
                .collect();
        }
        Ok(())
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.network.trim().is_empty() {
            bail!("network must not be empty");
        }
        if self.api_url.trim().is_empty() {
            bail!("api_url must not be empty");
        }
        if self.rpc_url.trim().is_empty() {
            bail!("rpc_url must not be empty");
        }
        if self.weth_address == Address::zero() {
            bail!("weth_address must be set");
        }
        if self.request_timeout_secs == 0 {
            bail!("request_timeout_secs must be greater than 0");
        }
        if !self.network.eq_ignore_ascii_case(SUPPORTED_NETWORK) {
            warn!(
                "Network {} is not served by the aggregator, swaps will be rejected",
                self.network
            );
        }
        Ok(())
    }

    /// Swap policy derived from this configuration
    pub fn policy(&self) -> SwapPolicy {
        SwapPolicy {
            network: self.network.clone(),
            base_currency: self.base_currency.clone(),
            wrapped_currency: self.wrapped_currency.clone(),
            weth_address: self.weth_address,
            supported_dexes: self.supported_dexes.clone(),
            disabled_symbols: self.disabled_symbols.clone(),
        }
    }

    /// Token registry seeded from this configuration
    pub fn token_registry(&self) -> TokenRegistry {
        TokenRegistry::new(self.tokens.clone())
    }
}

/// Policy values the swap engine is constructed with
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SwapPolicy {
    /// Network the engine is bound to
    pub network: String,

    /// Native currency; needs no allowance
    pub base_currency: String,

    /// Wrapped native token symbol
    pub wrapped_currency: String,

    /// Wrapped native token contract
    pub weth_address: Address,

    /// Liquidity sources known to work
    pub supported_dexes: Vec<String>,

    /// Currencies that must never be swapped
    pub disabled_symbols: HashSet<String>,
}

impl Default for SwapPolicy {
    fn default() -> Self {
        DexAgConfig::default().policy()
    }
}

impl SwapPolicy {
    /// Case-insensitive, like `is_native`
    pub fn is_disabled(&self, symbol: &str) -> bool {
        self.disabled_symbols
            .iter()
            .any(|disabled| disabled.eq_ignore_ascii_case(symbol))
    }

    pub fn is_native(&self, symbol: &str) -> bool {
        self.base_currency.eq_ignore_ascii_case(symbol)
    }

    pub fn is_supported_network(&self) -> bool {
        self.network.eq_ignore_ascii_case(SUPPORTED_NETWORK)
    }

    pub fn is_supported_dex(&self, dex: &str) -> bool {
        self.supported_dexes.iter().any(|d| d == dex)
    }
}

/// Loads the configuration from a file
pub struct ConfigManager {
    /// Path to the configuration file (YAML or JSON)
    pub config_path: String,
}

impl ConfigManager {
    pub fn new(config_path: &str) -> Self {
        Self {
            config_path: config_path.to_string(),
        }
    }

    /// Load, override from the environment and validate
    ///
    /// A missing file yields the default configuration.
    pub fn load(&self) -> Result<DexAgConfig> {
        let path = Path::new(&self.config_path);

        let mut config = if path.exists() {
            let content = fs::read_to_string(path).with_context(|| {
                format!("Failed to read configuration file: {}", self.config_path)
            })?;
            let config = Self::parse(&self.config_path, &content)?;
            info!("Configuration loaded from {}", self.config_path);
            config
        } else {
            info!("Configuration file not found, using default configuration");
            DexAgConfig::default()
        };

        config.apply_env_overrides()?;
        config.validate()?;
        Ok(config)
    }

    fn parse(path: &str, content: &str) -> Result<DexAgConfig> {
        if path.ends_with(".json") {
            serde_json::from_str(content).context("Failed to parse JSON configuration")
        } else {
            serde_yaml::from_str(content).context("Failed to parse YAML configuration")
        }
    }
}
