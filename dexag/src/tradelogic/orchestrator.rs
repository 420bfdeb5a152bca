//! Swap Orchestrator
//!
//! Entry point of the swap engine. Given a swap request and a trade quote from the
//! aggregator, it reads the current allowance and balances, decides which approval
//! and wrap transactions are needed and returns the ordered transaction list the
//! caller must sign and broadcast.
//!
//! # Flow
//! 1. Resolve the spender (`metadata.input.spender`, else `trade.to`)
//! 2. Read allowance and balances concurrently
//! 3. Run `AllowanceResolver` and, for wrapped-native sources, `WrapCalculator`
//! 4. Assemble reset / approve / wrap / swap in that order
//!
//! Nothing is broadcast here and nothing is retried. Ledger state can change between
//! these reads and the broadcast; callers should prepare right before signing.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use ethers::types::{Address, U256};
use tokio::sync::RwLock;
use tracing::{debug, error, info, warn};

use common::{NotificationStatus, ProviderKind, TransactionKind};

use super::allowance::{AllowanceResolver, ApprovalSteps};
use super::assembler::TransactionAssembler;
use super::status::StatusMapper;
use super::wrap::{WrapCalculator, WrapStep};
use crate::aggregator::{AggregatorApi, DexAgClient};
use crate::chain_adapters::{EvmLedgerClient, LedgerClient};
use crate::config::{DexAgConfig, SwapPolicy};
use crate::error::{Result, SwapError};
use crate::tokens::TokenRegistry;
use crate::types::{
    OrderNotice, PendingOrder, PreparedTransaction, RateQuote, SpenderSource, SwapRequest,
    SwapResult, TradeQuote, AGGREGATE_DEX, SWAP_VALID_FOR_SECS,
};

/// Source label attached to rate quotes
const RATE_SOURCE: &str = "dexag";

/// Prepares swaps through the aggregator and tracks their orders
pub struct SwapOrchestrator {
    /// Chain reads and call encoding
    ledger: Arc<dyn LedgerClient>,

    /// Remote aggregator API
    aggregator: Arc<dyn AggregatorApi>,

    /// Network, native/wrapped currency, supported dexes, disabled symbols
    policy: SwapPolicy,

    /// Known tokens; refreshed from the aggregator token list
    tokens: RwLock<TokenRegistry>,

    allowance: AllowanceResolver,
    wrap: WrapCalculator,
    assembler: TransactionAssembler,
    status: StatusMapper,
}

impl SwapOrchestrator {
    /// Create an orchestrator from its collaborators
    pub fn new(
        ledger: Arc<dyn LedgerClient>,
        aggregator: Arc<dyn AggregatorApi>,
        policy: SwapPolicy,
        tokens: TokenRegistry,
    ) -> Self {
        Self {
            ledger,
            aggregator,
            allowance: AllowanceResolver::new(policy.clone()),
            wrap: WrapCalculator::new(),
            assembler: TransactionAssembler::new(),
            status: StatusMapper::new(),
            policy,
            tokens: RwLock::new(tokens),
        }
    }

    pub fn policy(&self) -> &SwapPolicy {
        &self.policy
    }

    /// Whether `from` → `to` can be swapped on the configured network
    pub async fn valid_swap(&self, from: &str, to: &str) -> bool {
        self.check_pair(from, to).await.is_ok()
    }

    fn check_disabled(&self, from: &str, to: &str) -> Result<()> {
        for symbol in [from, to] {
            if self.policy.is_disabled(symbol) {
                warn!("Rejecting swap {} -> {}: {} is disabled", from, to, symbol);
                return Err(SwapError::DisabledCurrency(symbol.to_string()));
            }
        }
        Ok(())
    }

    async fn check_pair(&self, from: &str, to: &str) -> Result<()> {
        self.check_disabled(from, to)?;

        if !self.policy.is_supported_network() {
            return Err(SwapError::InvalidNetwork(self.policy.network.clone()));
        }

        let tokens = self.tokens.read().await;
        for symbol in [from, to] {
            if !tokens.contains(symbol) {
                return Err(SwapError::UnsupportedToken(symbol.to_string()));
            }
        }
        Ok(())
    }

    /// Liquidity source for a request: the preferred dex if supported, else the aggregate route
    pub fn select_dex(&self, preferred: Option<&str>) -> String {
        match preferred {
            Some(dex) if self.policy.is_supported_dex(dex) => dex.to_string(),
            Some(dex) => {
                debug!("Dex {} is not supported, routing through {}", dex, AGGREGATE_DEX);
                AGGREGATE_DEX.to_string()
            }
            None => AGGREGATE_DEX.to_string(),
        }
    }

    /// Create a trade for `request` and prepare its transactions
    pub async fn start_swap(&self, request: SwapRequest) -> Result<SwapResult> {
        // 1. Reject pairs the aggregator cannot serve
        self.check_pair(&request.from_currency, &request.to_currency).await?;
        if !request.network.eq_ignore_ascii_case(&self.policy.network) {
            return Err(SwapError::InvalidNetwork(request.network.clone()));
        }

        // 2. Create the trade
        let dex = self.select_dex(request.provider.as_deref());
        let quote = self
            .aggregator
            .create_trade(&request, &dex)
            .await
            .map_err(|e| {
                error!(
                    "Failed to create trade {} -> {}: {}",
                    request.from_currency, request.to_currency, e
                );
                match e {
                    SwapError::QuoteCreation(message) | SwapError::Aggregator(message) => {
                        SwapError::QuoteCreation(message)
                    }
                    other => other,
                }
            })?;

        // 3. Prepare transactions against the quote
        let mut result = self.start_swap_with_quote(request, quote).await?;
        result.dex = dex;
        Ok(result)
    }

    /// Prepare the transactions for an already created trade
    pub async fn start_swap_with_quote(
        &self,
        request: SwapRequest,
        quote: TradeQuote,
    ) -> Result<SwapResult> {
        self.check_disabled(&request.from_currency, &request.to_currency)?;

        let (spender, source) = quote.spender();
        match source {
            SpenderSource::InputSpender => debug!("Spender {:?} taken from trade input", spender),
            SpenderSource::TradeTarget => {
                debug!("No input spender, using trade target {:?}", spender)
            }
        }

        let native = self.policy.is_native(&request.from_currency);
        let token = if native {
            None
        } else {
            Some(self.source_token(&request, &quote).await?)
        };
        let required = self.required_amount(&request, &quote).await?;
        let wraps = token == Some(self.policy.weth_address);
        let owner = request.from_address;

        let (allowance, balances) = tokio::try_join!(
            self.read_allowance(token, owner, spender),
            self.read_wrap_balances(wraps, owner),
        )?;

        let decision = self.allowance.resolve(&request.from_currency, allowance, required)?;
        let approval = match token {
            Some(token) => decision.to_steps(self.ledger.as_ref(), token, spender)?,
            None => ApprovalSteps::default(),
        };

        let wrap = match balances {
            Some((wrapped, native_balance)) => self.wrap.step(
                self.ledger.as_ref(),
                self.policy.weth_address,
                required,
                wrapped,
                native_balance,
            )?,
            None => WrapStep::Skip,
        };

        let swap_data = quote.trade.data.clone();
        let swap = PreparedTransaction::new(TransactionKind::Swap, quote.trade.to, swap_data)
            .with_value(quote.trade.value)
            .with_gas_price(quote.metadata.gas_price);

        let transactions = self.assembler.assemble(approval, wrap, swap)?;

        let dex = quote
            .metadata
            .query
            .dex
            .clone()
            .unwrap_or_else(|| self.select_dex(request.provider.as_deref()));

        info!(
            "Prepared swap {} {} -> {} with {} transactions via {}",
            request.from_value,
            request.from_currency,
            request.to_currency,
            transactions.len(),
            dex
        );

        Ok(SwapResult {
            provider_receives: request.from_value.clone(),
            provider_sends: quote.metadata.query.to_amount.clone(),
            request,
            transactions,
            provider_address: spender,
            pending_order: PendingOrder {
                send_to_address: spender,
                status: NotificationStatus::Pending,
                valid_for_secs: SWAP_VALID_FOR_SECS,
                created_at: Utc::now(),
            },
            dex,
            provider_kind: ProviderKind::Dex,
            is_exit_to_fiat: false,
        })
    }

    /// Token contract being sold: the trade input if reported, else the registry
    async fn source_token(&self, request: &SwapRequest, quote: &TradeQuote) -> Result<Address> {
        match quote.input_token() {
            Some(token) => Ok(token),
            None => self.tokens.read().await.token_address(&request.from_currency),
        }
    }

    /// Amount being sold in base units
    ///
    /// The trade input if reported, else converted from the request value.
    async fn required_amount(&self, request: &SwapRequest, quote: &TradeQuote) -> Result<U256> {
        match quote.input_amount() {
            Some(amount) => Ok(amount),
            None => self
                .tokens
                .read()
                .await
                .to_base_units(&request.from_currency, &request.from_value),
        }
    }

    async fn read_allowance(
        &self,
        token: Option<Address>,
        owner: Address,
        spender: Address,
    ) -> Result<U256> {
        match token {
            Some(token) => self.ledger.read_allowance(token, owner, spender).await,
            None => Ok(U256::zero()),
        }
    }

    /// (wrapped, native) balances of `owner` when the source is the wrapped native token
    async fn read_wrap_balances(
        &self,
        wraps: bool,
        owner: Address,
    ) -> Result<Option<(U256, U256)>> {
        if !wraps {
            return Ok(None);
        }
        let (wrapped, native) = tokio::try_join!(
            self.ledger.read_token_balance(self.policy.weth_address, owner),
            self.ledger.read_native_balance(owner),
        )?;
        Ok(Some((wrapped, native)))
    }

    /// Poll the aggregator and map the order status
    pub async fn get_order_status(
        &self,
        notice: &OrderNotice,
        network: &str,
    ) -> Result<NotificationStatus> {
        let code = self
            .aggregator
            .query_order_status(&notice.status_id, network)
            .await
            .map_err(|e| {
                error!("Failed to query status of order {}: {}", notice.status_id, e);
                e
            })?;
        self.status.map(&code)
    }

    /// Rates per liquidity source; sources not known to work are reported at rate 0
    pub async fn get_rate(&self, from: &str, to: &str, amount: &str) -> Result<Vec<RateQuote>> {
        let prices = self.aggregator.get_price(from, to, amount).await?;

        Ok(prices
            .into_iter()
            .map(|price| {
                let rate = if self.policy.is_supported_dex(&price.dex) {
                    price.price
                } else {
                    "0".to_string()
                };
                RateQuote {
                    from_currency: from.to_string(),
                    to_currency: to.to_string(),
                    provider: price.dex,
                    rate,
                    source: RATE_SOURCE.to_string(),
                }
            })
            .collect())
    }

    /// Whether `address` can receive `currency` on the configured network
    pub async fn validate_address(&self, currency: &str, address: &str) -> Result<bool> {
        self.aggregator
            .validate_address(currency, address, &self.policy.network)
            .await
    }

    /// Reload the token registry from the aggregator token list
    ///
    /// On failure the current registry is kept.
    pub async fn refresh_currencies(&self) -> Result<usize> {
        let fetched = self.aggregator.get_supported_currencies(&self.policy.network).await;
        let tokens: HashMap<_, _> = match fetched {
            Ok(tokens) => tokens,
            Err(e) => {
                warn!("Keeping current token list, refresh failed: {}", e);
                return Err(e);
            }
        };

        if tokens.is_empty() {
            warn!("Aggregator returned an empty token list, keeping current registry");
            return Ok(0);
        }

        let count = tokens.len();
        self.tokens.write().await.replace(tokens);
        Ok(count)
    }
}

/// Build an orchestrator talking to the configured RPC node and aggregator
pub fn create_swap_orchestrator(config: &DexAgConfig) -> Result<Arc<SwapOrchestrator>> {
    let ledger = Arc::new(EvmLedgerClient::new(&config.rpc_url)?) as Arc<dyn LedgerClient>;
    let aggregator = Arc::new(DexAgClient::from_config(config)?) as Arc<dyn AggregatorApi>;

    Ok(Arc::new(SwapOrchestrator::new(
        ledger,
        aggregator,
        config.policy(),
        config.token_registry(),
    )))
}
