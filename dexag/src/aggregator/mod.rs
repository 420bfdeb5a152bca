//! Module aggregator
//!
//! Module này định nghĩa giao diện tới dịch vụ tổng hợp thanh khoản (dex.ag):
//! - `AggregatorApi`: trait mà `SwapOrchestrator` phụ thuộc vào
//! - http: client REST dùng reqwest

use std::collections::HashMap;

use async_trait::async_trait;

use crate::error::Result;
use crate::types::{DexPrice, SwapRequest, TokenDetails, TradeQuote};

pub mod http;

pub use http::DexAgClient;

/// Remote aggregator operations used by the swap engine
///
/// Failures surface as `SwapError`; implementations do not retry.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AggregatorApi: Send + Sync {
    /// Create a trade (quote plus executable call) for `request` routed through `dex`
    async fn create_trade(&self, request: &SwapRequest, dex: &str) -> Result<TradeQuote>;

    /// Raw status code of an order
    async fn query_order_status(&self, order_id: &str, network: &str) -> Result<String>;

    /// Whether `address` can receive `currency` on `network`
    async fn validate_address(&self, currency: &str, address: &str, network: &str) -> Result<bool>;

    /// Price per liquidity source for selling `amount` of `from` for `to`
    async fn get_price(&self, from: &str, to: &str, amount: &str) -> Result<Vec<DexPrice>>;

    /// Tokens tradable on `network`, keyed by symbol
    async fn get_supported_currencies(
        &self,
        network: &str,
    ) -> Result<HashMap<String, TokenDetails>>;
}
