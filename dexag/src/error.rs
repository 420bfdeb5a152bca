//! Error types for the swap engine
//!
//! Every failure in the swap flow surfaces as a `SwapError`. Nothing is retried
//! here; retry policy belongs to the caller or transport layer.

use ethers::types::U256;
use thiserror::Error;

/// Errors raised while assembling a swap or polling its order
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SwapError {
    /// Reading allowance or balances from the ledger failed
    #[error("Ledger read failed ({operation}): {message}")]
    LedgerRead {
        /// Which read failed (allowance, token_balance, native_balance)
        operation: String,
        /// Underlying error message
        message: String,
    },

    /// The aggregator could not create a trade for the request
    #[error("Quote creation failed: {0}")]
    QuoteCreation(String),

    /// Native plus wrapped balance cannot cover the swap amount
    #[error("Insufficient funds: required {required}, available {available}")]
    InsufficientFunds {
        /// Wrapped amount the swap needs
        required: U256,
        /// Native + wrapped balance of the owner
        available: U256,
    },

    /// The aggregator reported a status code outside the known set
    #[error("Unknown order status code: {0}")]
    UnknownStatusCode(String),

    /// The currency has no known token address or decimals
    #[error("Token [{0}] not included in dex.ag list of tokens")]
    UnsupportedToken(String),

    /// The currency is disabled by swap policy
    #[error("Currency {0} is disabled for swaps")]
    DisabledCurrency(String),

    /// The configured network is not served by the aggregator
    #[error("Network {0} is not supported")]
    InvalidNetwork(String),

    /// Amount could not be parsed or converted
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    /// ABI encoding of a call failed
    #[error("Encoding failed: {0}")]
    Encoding(String),

    /// A transaction was pushed out of broadcast order
    #[error("Transaction order violated: {attempted} cannot follow {previous}")]
    TransactionOrder {
        /// Kind already in the list
        previous: String,
        /// Kind that was rejected
        attempted: String,
    },

    /// Any other aggregator API failure (status poll, validation, pricing)
    #[error("Aggregator error: {0}")]
    Aggregator(String),
}

impl SwapError {
    /// Build a ledger read error for the given operation
    pub fn ledger_read(operation: impl Into<String>, message: impl ToString) -> Self {
        SwapError::LedgerRead {
            operation: operation.into(),
            message: message.to_string(),
        }
    }

    /// Check if the error is something the user can fix (fund the wallet, pick another token)
    pub fn is_user_actionable(&self) -> bool {
        matches!(
            self,
            SwapError::InsufficientFunds { .. }
                | SwapError::UnsupportedToken(_)
                | SwapError::DisabledCurrency(_)
                | SwapError::InvalidAmount(_)
        )
    }

    /// Check if the error came from an external collaborator (ledger or aggregator)
    pub fn is_external(&self) -> bool {
        matches!(
            self,
            SwapError::LedgerRead { .. } | SwapError::QuoteCreation(_) | SwapError::Aggregator(_)
        )
    }
}

/// Result type for the swap engine
pub type Result<T> = std::result::Result<T, SwapError>;
