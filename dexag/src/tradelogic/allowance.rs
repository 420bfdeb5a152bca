//! # Allowance resolution
//!
//! Decides whether the spender needs a new ERC20 allowance before the swap, and
//! whether an existing allowance must first be cleared.
//!
//! Some tokens reject changing a non-zero allowance to another non-zero value, so
//! an insufficient existing allowance always goes through zero:
//! `approve(spender, 0)` then `approve(spender, amount)`.

use ethers::types::{Address, U256};
use serde::{Serialize, Deserialize};
use tracing::{debug, info};

use common::TransactionKind;

use crate::chain_adapters::LedgerClient;
use crate::config::SwapPolicy;
use crate::error::{Result, SwapError};
use crate::types::PreparedTransaction;

/// What must happen to the allowance before the swap
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ApprovalDecision {
    /// Existing allowance is enough, or none is needed
    None,

    /// No allowance yet: approve the amount
    Approve(U256),

    /// Non-zero but insufficient allowance: reset to zero, then approve the amount
    ResetThenApprove(U256),
}

impl ApprovalDecision {
    /// Number of transactions the decision expands to
    pub fn transaction_count(&self) -> usize {
        match self {
            Self::None => 0,
            Self::Approve(_) => 1,
            Self::ResetThenApprove(_) => 2,
        }
    }

    /// Expand the decision into approval transactions against `token`
    pub fn to_steps(
        &self,
        ledger: &dyn LedgerClient,
        token: Address,
        spender: Address,
    ) -> Result<ApprovalSteps> {
        let approve = |amount: U256, kind: TransactionKind| -> Result<PreparedTransaction> {
            let data = ledger.encode_approve_call(token, spender, amount)?;
            Ok(PreparedTransaction::new(kind, token, data))
        };

        match *self {
            Self::None => Ok(ApprovalSteps::default()),
            Self::Approve(amount) => Ok(ApprovalSteps {
                reset: None,
                approve: Some(approve(amount, TransactionKind::Approve)?),
            }),
            Self::ResetThenApprove(amount) => Ok(ApprovalSteps {
                reset: Some(approve(U256::zero(), TransactionKind::ResetApproval)?),
                approve: Some(approve(amount, TransactionKind::Approve)?),
            }),
        }
    }
}

/// Approval transactions produced from an `ApprovalDecision`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ApprovalSteps {
    /// `approve(spender, 0)`
    pub reset: Option<PreparedTransaction>,

    /// `approve(spender, amount)`
    pub approve: Option<PreparedTransaction>,
}

/// Resolves the approval needed for a swap
#[derive(Debug, Clone)]
pub struct AllowanceResolver {
    policy: SwapPolicy,
}

impl AllowanceResolver {
    pub fn new(policy: SwapPolicy) -> Self {
        Self { policy }
    }

    /// Whether spending `currency` requires an allowance at all
    pub fn requires_allowance(&self, currency: &str) -> bool {
        !self.policy.is_native(currency)
    }

    /// Decide the approval for spending `required` of `currency` given `current` allowance
    pub fn resolve(
        &self,
        currency: &str,
        current: U256,
        required: U256,
    ) -> Result<ApprovalDecision> {
        if self.policy.is_disabled(currency) {
            return Err(SwapError::DisabledCurrency(currency.to_string()));
        }

        let decision = if required.is_zero() || !self.requires_allowance(currency) {
            ApprovalDecision::None
        } else if current.is_zero() {
            ApprovalDecision::Approve(required)
        } else if current < required {
            ApprovalDecision::ResetThenApprove(required)
        } else {
            ApprovalDecision::None
        };

        match decision {
            ApprovalDecision::ResetThenApprove(_) => info!(
                "Allowance {} for {} is below {}, resetting before approval",
                current, currency, required
            ),
            _ => debug!(
                "Approval for {} (allowance {}, required {}): {:?}",
                currency, current, required, decision
            ),
        }

        Ok(decision)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ethers::types::Bytes;

    use crate::chain_adapters::ledger::MockLedgerClient;

    fn resolver() -> AllowanceResolver {
        AllowanceResolver::new(SwapPolicy::default())
    }

    #[test]
    fn test_zero_allowance_approves_required() {
        for required in [1u64, 300, 1_000_000] {
            let decision = resolver().resolve("DAI", U256::zero(), U256::from(required)).unwrap();
            assert_eq!(decision, ApprovalDecision::Approve(U256::from(required)));
        }
    }

    #[test]
    fn test_insufficient_allowance_resets_first() {
        for (current, required) in [(1u64, 2u64), (500, 1000), (999, 1000)] {
            let decision = resolver()
                .resolve("DAI", U256::from(current), U256::from(required))
                .unwrap();
            assert_eq!(decision, ApprovalDecision::ResetThenApprove(U256::from(required)));
            assert_eq!(decision.transaction_count(), 2);
        }
    }

    #[test]
    fn test_sufficient_allowance_is_reused() {
        for (current, required) in [(500u64, 300u64), (1000, 1000)] {
            let decision = resolver()
                .resolve("DAI", U256::from(current), U256::from(required))
                .unwrap();
            assert_eq!(decision, ApprovalDecision::None);
        }
        let decision = resolver().resolve("DAI", U256::MAX, U256::from(1)).unwrap();
        assert_eq!(decision, ApprovalDecision::None);
    }

    #[test]
    fn test_native_currency_and_zero_amount_need_nothing() {
        assert_eq!(
            resolver().resolve("ETH", U256::zero(), U256::from(1000)).unwrap(),
            ApprovalDecision::None
        );
        assert_eq!(
            resolver().resolve("DAI", U256::zero(), U256::zero()).unwrap(),
            ApprovalDecision::None
        );
        assert!(!resolver().requires_allowance("ETH"));
        assert!(resolver().requires_allowance("WETH"));
    }

    #[test]
    fn test_disabled_currency_rejected() {
        let result = resolver().resolve("USDT", U256::zero(), U256::from(1));
        assert_eq!(result, Err(SwapError::DisabledCurrency("USDT".into())));
    }

    #[test]
    fn test_reset_then_approve_expands_in_order() {
        let token = Address::from_low_u64_be(0xaa);
        let spender = Address::from_low_u64_be(0xbb);

        let mut ledger = MockLedgerClient::new();
        ledger
            .expect_encode_approve_call()
            .withf(move |t, s, amount| *t == token && *s == spender && amount.is_zero())
            .times(1)
            .returning(|_, _, _| Ok(Bytes::from(vec![0x00])));
        ledger
            .expect_encode_approve_call()
            .withf(move |t, s, amount| *t == token && *s == spender && *amount == U256::from(1000))
            .times(1)
            .returning(|_, _, _| Ok(Bytes::from(vec![0x01])));

        let steps = ApprovalDecision::ResetThenApprove(U256::from(1000))
            .to_steps(&ledger, token, spender)
            .unwrap();

        let reset = steps.reset.unwrap();
        let approve = steps.approve.unwrap();
        assert_eq!(reset.kind(), TransactionKind::ResetApproval);
        assert_eq!(reset.to(), token);
        assert_eq!(reset.data(), &Bytes::from(vec![0x00]));
        assert_eq!(approve.kind(), TransactionKind::Approve);
        assert_eq!(approve.data(), &Bytes::from(vec![0x01]));
        assert!(approve.value().is_zero());
    }

    #[test]
    fn test_none_expands_to_nothing() {
        let ledger = MockLedgerClient::new();
        let steps = ApprovalDecision::None
            .to_steps(&ledger, Address::zero(), Address::zero())
            .unwrap();
        assert_eq!(steps, ApprovalSteps::default());
    }
}
