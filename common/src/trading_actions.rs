//! Common trading action definitions
//!
//! This module contains the standardized enums describing the transactions a swap
//! is made of and the kind of provider that executes it, shared across crates.

use serde::{Serialize, Deserialize};
use std::fmt;

/// Kind of an unsigned transaction prepared for a swap
///
/// Variants are declared in broadcast order, so the derived ordering is the
/// order in which prepared transactions must be sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionKind {
    /// Set an existing non-zero allowance back to zero
    ResetApproval,

    /// Approve the spender for the swap amount
    Approve,

    /// Convert native currency into its wrapped token
    Wrap,

    /// The swap call itself
    Swap,
}

impl fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ResetApproval => write!(f, "reset_approval"),
            Self::Approve => write!(f, "approve"),
            Self::Wrap => write!(f, "wrap"),
            Self::Swap => write!(f, "swap"),
        }
    }
}

/// Kind of provider executing a swap
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderKind {
    /// Direct on-chain liquidity source (DEX / aggregator)
    Dex,

    /// Custodial exchange taking a deposit
    Custodial,
}

impl ProviderKind {
    /// Check if the provider settles directly on-chain
    pub fn is_dex(&self) -> bool {
        matches!(self, Self::Dex)
    }
}

impl Default for ProviderKind {
    fn default() -> Self {
        Self::Dex
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transaction_kind_order() {
        assert!(TransactionKind::ResetApproval < TransactionKind::Approve);
        assert!(TransactionKind::Approve < TransactionKind::Wrap);
        assert!(TransactionKind::Wrap < TransactionKind::Swap);
    }

    #[test]
    fn test_provider_kind() {
        assert!(ProviderKind::default().is_dex());
        assert!(!ProviderKind::Custodial.is_dex());
    }
}
