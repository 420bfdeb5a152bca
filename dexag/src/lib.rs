//! dexag Library
//!
//! Swap engine for the dex.ag liquidity aggregator. It turns a swap request and an
//! aggregator trade into the ordered list of unsigned transactions (allowance reset,
//! approval, wrap, swap) the caller must broadcast, and maps aggregator order
//! statuses onto notification statuses.

pub mod aggregator;
pub mod chain_adapters;
pub mod config;
pub mod error;
pub mod tokens;
pub mod tradelogic;
pub mod types;

// Re-export các kiểu dùng chung từ common
pub use common::{ExchangeStatus, NotificationStatus, ProviderKind, TransactionKind};

pub use aggregator::{AggregatorApi, DexAgClient};
pub use chain_adapters::{EvmLedgerClient, LedgerClient};
pub use config::{ConfigManager, DexAgConfig, SwapPolicy};
pub use error::{Result, SwapError};
pub use tokens::TokenRegistry;
pub use tradelogic::{create_swap_orchestrator, SwapOrchestrator};
pub use types::{
    OrderNotice, ParsedOrder, PreparedTransaction, RateQuote, SwapRequest, SwapResult, TradeQuote,
};

use anyhow::Context;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Initialize logging
///
/// `RUST_LOG` takes precedence over `log_level` when set.
pub fn init_logging(log_level: &str) -> anyhow::Result<()> {
    let level = match log_level.to_lowercase().as_str() {
        "trace" => "trace",
        "debug" => "debug",
        "warn" => "warn",
        "error" => "error",
        _ => "info",
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set global default subscriber")?;

    info!("Logging initialized at {} level", level);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_logging_only_once() {
        let _ = init_logging("debug");
        assert!(init_logging("info").is_err());
    }
}
