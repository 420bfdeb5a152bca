//! dex.ag REST client
//!
//! `GET /trade` returns the executable trade together with its quote metadata,
//! `GET /price` the per-source prices, `GET /token-list-full` the token list,
//! `GET /status/{id}` the status of an order and `GET /validate-address` whether
//! an address can receive a currency.

use std::collections::HashMap;
use std::str::FromStr;
use std::time::Duration;

use async_trait::async_trait;
use ethers::types::Address;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::{debug, error, info};

use super::AggregatorApi;
use crate::config::{DexAgConfig, SUPPORTED_NETWORK};
use crate::error::{Result, SwapError};
use crate::types::{DexPrice, SwapRequest, TokenDetails, TradeQuote};

#[derive(Debug, Deserialize)]
struct TokenListEntry {
    #[serde(default)]
    name: String,
    symbol: String,
    #[serde(default)]
    address: Option<String>,
    decimals: u8,
}

#[derive(Debug, Deserialize)]
struct PriceEntry {
    dex: String,
    price: serde_json::Value,
}

#[derive(Debug, Deserialize)]
struct StatusResponse {
    status: String,
}

#[derive(Debug, Deserialize)]
struct ValidateAddressResponse {
    result: bool,
}

/// HTTP client for the dex.ag API
#[derive(Debug, Clone)]
pub struct DexAgClient {
    base_url: String,
    client: Client,
}

impl DexAgClient {
    /// Create a client for `base_url` with a per-request timeout
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| SwapError::Aggregator(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    pub fn from_config(config: &DexAgConfig) -> Result<Self> {
        Self::new(&config.api_url, Duration::from_secs(config.request_timeout_secs))
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str, query: &[(&str, &str)]) -> Result<T> {
        let url = format!("{}{}", self.base_url, path);
        debug!("GET {} {:?}", url, query);

        let response = self
            .client
            .get(&url)
            .query(query)
            .send()
            .await
            .map_err(|e| SwapError::Aggregator(format!("Request to {} failed: {}", url, e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!("{} returned {}: {}", url, status, body);
            return Err(SwapError::Aggregator(format!("{} returned {}: {}", path, status, body)));
        }

        response
            .json::<T>()
            .await
            .map_err(|e| SwapError::Aggregator(format!("Invalid response from {}: {}", path, e)))
    }
}

fn price_to_string(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        serde_json::Value::Null => "0".to_string(),
        other => other.to_string(),
    }
}

#[async_trait]
impl AggregatorApi for DexAgClient {
    async fn create_trade(&self, request: &SwapRequest, dex: &str) -> Result<TradeQuote> {
        let query = [
            ("from", request.from_currency.as_str()),
            ("to", request.to_currency.as_str()),
            ("fromAmount", request.from_value.as_str()),
            ("dex", dex),
        ];

        let quote: TradeQuote = self.get_json("/trade", &query).await.map_err(|e| match e {
            SwapError::Aggregator(message) => SwapError::QuoteCreation(message),
            other => other,
        })?;

        info!(
            "Created {} trade {} -> {} via {} targeting {:?}",
            request.from_value, request.from_currency, request.to_currency, dex, quote.trade.to
        );
        Ok(quote)
    }

    async fn query_order_status(&self, order_id: &str, network: &str) -> Result<String> {
        let path = format!("/status/{}", order_id);
        let response: StatusResponse = self.get_json(&path, &[("network", network)]).await?;
        debug!("Order {} status: {}", order_id, response.status);
        Ok(response.status)
    }

    async fn validate_address(
        &self,
        currency: &str,
        address: &str,
        network: &str,
    ) -> Result<bool> {
        if !network.eq_ignore_ascii_case(SUPPORTED_NETWORK) {
            debug!("Address validation for {} on unsupported network {}", currency, network);
            return Ok(false);
        }

        let query = [("currency", currency), ("address", address.trim()), ("network", network)];
        let response: ValidateAddressResponse = self.get_json("/validate-address", &query).await?;
        debug!("Address {} for {}: valid = {}", address, currency, response.result);
        Ok(response.result)
    }

    async fn get_price(&self, from: &str, to: &str, amount: &str) -> Result<Vec<DexPrice>> {
        let query = [("from", from), ("to", to), ("fromAmount", amount), ("dex", "all")];
        let entries: Vec<PriceEntry> = self.get_json("/price", &query).await?;

        Ok(entries
            .into_iter()
            .map(|entry| DexPrice {
                price: price_to_string(&entry.price),
                dex: entry.dex,
            })
            .collect())
    }

    async fn get_supported_currencies(
        &self,
        network: &str,
    ) -> Result<HashMap<String, TokenDetails>> {
        if !network.eq_ignore_ascii_case(SUPPORTED_NETWORK) {
            return Err(SwapError::InvalidNetwork(network.to_string()));
        }

        let entries: Vec<TokenListEntry> = self.get_json("/token-list-full", &[]).await?;
        let mut tokens = HashMap::with_capacity(entries.len());

        for entry in entries {
            let address = match entry.address.as_deref().map(str::trim) {
                None | Some("") => None,
                Some(raw) => match Address::from_str(raw) {
                    Ok(address) if address != Address::zero() => Some(address),
                    Ok(_) => None,
                    Err(e) => {
                        error!(
                            "Skipping token {} with invalid address {}: {}",
                            entry.symbol, raw, e
                        );
                        continue;
                    }
                },
            };

            tokens.insert(
                entry.symbol.to_uppercase(),
                TokenDetails {
                    name: entry.name,
                    address,
                    decimals: entry.decimals,
                },
            );
        }

        info!("Loaded {} tokens from the aggregator", tokens.len());
        Ok(tokens)
    }
}
