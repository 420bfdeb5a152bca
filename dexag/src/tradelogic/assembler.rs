//! Transaction assembly
//!
//! Produces the final broadcast list: reset approval, approval, wrap, swap. Stages may
//! be absent but never appear out of order.

use tracing::debug;

use common::TransactionKind;

use super::allowance::ApprovalSteps;
use super::wrap::WrapStep;
use crate::error::{Result, SwapError};
use crate::types::PreparedTransaction;

/// Append-only transaction list that enforces stage order
#[derive(Debug, Default)]
pub struct OrderedTransactions {
    transactions: Vec<PreparedTransaction>,
    last: Option<TransactionKind>,
}

impl OrderedTransactions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a transaction; its stage must come strictly after the previous one
    pub fn push(&mut self, tx: PreparedTransaction) -> Result<()> {
        let kind = tx.kind();
        if let Some(previous) = self.last {
            if kind <= previous {
                return Err(SwapError::TransactionOrder {
                    previous: previous.to_string(),
                    attempted: kind.to_string(),
                });
            }
        }
        self.last = Some(kind);
        self.transactions.push(tx);
        Ok(())
    }

    /// Append if present
    pub fn push_opt(&mut self, tx: Option<PreparedTransaction>) -> Result<()> {
        match tx {
            Some(tx) => self.push(tx),
            None => Ok(()),
        }
    }

    pub fn len(&self) -> usize {
        self.transactions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty()
    }

    pub fn into_vec(self) -> Vec<PreparedTransaction> {
        self.transactions
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct TransactionAssembler;

impl TransactionAssembler {
    pub fn new() -> Self {
        Self
    }

    /// Combine the prepared steps into the broadcast list
    pub fn assemble(
        &self,
        approval: ApprovalSteps,
        wrap: WrapStep,
        swap: PreparedTransaction,
    ) -> Result<Vec<PreparedTransaction>> {
        let wrap_tx = match wrap {
            WrapStep::Skip => None,
            WrapStep::Wrap(tx) => Some(tx),
            WrapStep::Insufficient { required, available } => {
                return Err(SwapError::InsufficientFunds { required, available });
            }
        };

        let mut ordered = OrderedTransactions::new();
        ordered.push_opt(approval.reset)?;
        ordered.push_opt(approval.approve)?;
        ordered.push_opt(wrap_tx)?;
        ordered.push(swap)?;

        debug!("Assembled {} transactions", ordered.len());
        Ok(ordered.into_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ethers::types::{Address, Bytes, U256};

    fn tx(kind: TransactionKind) -> PreparedTransaction {
        PreparedTransaction::new(kind, Address::from_low_u64_be(1), Bytes::new())
    }

    fn kinds(txs: &[PreparedTransaction]) -> Vec<TransactionKind> {
        txs.iter().map(|t| t.kind()).collect()
    }

    #[test]
    fn test_full_order() {
        let approval = ApprovalSteps {
            reset: Some(tx(TransactionKind::ResetApproval)),
            approve: Some(tx(TransactionKind::Approve)),
        };
        let txs = TransactionAssembler::new()
            .assemble(
                approval,
                WrapStep::Wrap(tx(TransactionKind::Wrap)),
                tx(TransactionKind::Swap),
            )
            .unwrap();
        assert_eq!(
            kinds(&txs),
            vec![
                TransactionKind::ResetApproval,
                TransactionKind::Approve,
                TransactionKind::Wrap,
                TransactionKind::Swap,
            ]
        );
    }

    #[test]
    fn test_swap_only() {
        let txs = TransactionAssembler::new()
            .assemble(ApprovalSteps::default(), WrapStep::Skip, tx(TransactionKind::Swap))
            .unwrap();
        assert_eq!(kinds(&txs), vec![TransactionKind::Swap]);
    }

    #[test]
    fn test_approve_then_swap() {
        let approval = ApprovalSteps {
            reset: None,
            approve: Some(tx(TransactionKind::Approve)),
        };
        let txs = TransactionAssembler::new()
            .assemble(approval, WrapStep::Skip, tx(TransactionKind::Swap))
            .unwrap();
        assert_eq!(kinds(&txs), vec![TransactionKind::Approve, TransactionKind::Swap]);
    }

    #[test]
    fn test_insufficient_wrap_fails() {
        let result = TransactionAssembler::new().assemble(
            ApprovalSteps::default(),
            WrapStep::Insufficient {
                required: U256::from(1000),
                available: U256::from(10),
            },
            tx(TransactionKind::Swap),
        );
        assert_eq!(
            result,
            Err(SwapError::InsufficientFunds {
                required: U256::from(1000),
                available: U256::from(10),
            })
        );
    }

    #[test]
    fn test_builder_rejects_regression() {
        let mut ordered = OrderedTransactions::new();
        ordered.push(tx(TransactionKind::Wrap)).unwrap();
        let err = ordered.push(tx(TransactionKind::Approve)).unwrap_err();
        assert!(matches!(err, SwapError::TransactionOrder { .. }));
        assert_eq!(ordered.len(), 1);
    }

    #[test]
    fn test_builder_rejects_duplicate_stage() {
        let mut ordered = OrderedTransactions::new();
        ordered.push(tx(TransactionKind::Swap)).unwrap();
        assert!(ordered.push(tx(TransactionKind::Swap)).is_err());
    }

    #[test]
    fn test_mislabelled_step_is_rejected() {
        // A wrap placed in the approval slot would precede the real approval
        let approval = ApprovalSteps {
            reset: Some(tx(TransactionKind::Wrap)),
            approve: Some(tx(TransactionKind::Approve)),
        };
        let result = TransactionAssembler::new()
            .assemble(approval, WrapStep::Skip, tx(TransactionKind::Swap));
        assert!(matches!(result, Err(SwapError::TransactionOrder { .. })));
    }
}
