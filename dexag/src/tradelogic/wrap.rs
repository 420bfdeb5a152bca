//! Wrap calculation
//!
//! When the swap sells the wrapped native token, any shortfall in the wrapped balance is
//! covered by wrapping native currency first.

use ethers::types::{Address, U256};
use serde::{Serialize, Deserialize};
use tracing::{debug, warn};

use common::TransactionKind;

use crate::chain_adapters::LedgerClient;
use crate::error::Result;
use crate::types::PreparedTransaction;

/// Outcome of comparing wrapped and native balances with the required amount
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WrapDecision {
    /// Wrapped balance already covers the amount
    NotRequired,

    /// Wrap this much native currency (the shortfall)
    Wrap(U256),

    /// Native plus wrapped balance does not cover the amount
    InsufficientFunds,
}

/// Wrap transaction, or the reason there is none
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WrapStep {
    Skip,
    Wrap(PreparedTransaction),
    Insufficient { required: U256, available: U256 },
}

#[derive(Debug, Clone, Copy, Default)]
pub struct WrapCalculator;

impl WrapCalculator {
    pub fn new() -> Self {
        Self
    }

    /// Decide how much native currency must be wrapped
    pub fn resolve(&self, required: U256, wrapped: U256, native: U256) -> WrapDecision {
        if wrapped >= required {
            return WrapDecision::NotRequired;
        }

        if native.saturating_add(wrapped) < required {
            warn!(
                "Insufficient funds to wrap: required {}, wrapped {}, native {}",
                required, wrapped, native
            );
            return WrapDecision::InsufficientFunds;
        }

        // wrapped < required here, so the shortfall is strictly positive
        let shortfall = required - wrapped;
        debug!("Wrapping {} (required {}, wrapped {})", shortfall, required, wrapped);
        WrapDecision::Wrap(shortfall)
    }

    /// Resolve and build the wrap transaction against the wrapped token contract
    pub fn step(
        &self,
        ledger: &dyn LedgerClient,
        weth: Address,
        required: U256,
        wrapped: U256,
        native: U256,
    ) -> Result<WrapStep> {
        match self.resolve(required, wrapped, native) {
            WrapDecision::NotRequired => Ok(WrapStep::Skip),
            WrapDecision::InsufficientFunds => Ok(WrapStep::Insufficient {
                required,
                available: native.saturating_add(wrapped),
            }),
            WrapDecision::Wrap(amount) => {
                let data = ledger.encode_wrap_call()?;
                let tx =
                    PreparedTransaction::new(TransactionKind::Wrap, weth, data).with_value(amount);
                Ok(WrapStep::Wrap(tx))
            }
        }
    }
}
