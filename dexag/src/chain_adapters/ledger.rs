//! Ledger capability
//!
//! The swap engine only reads chain state and encodes calls. Everything it needs
//! from the chain goes through `LedgerClient`, so the engine does not depend on a
//! particular RPC client.

use async_trait::async_trait;
use ethers::types::{Address, Bytes, U256};

use crate::error::Result;

/// Read-only view of the ledger plus call encoding
///
/// Reads are assumed idempotent; implementations must not retry on their own.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LedgerClient: Send + Sync {
    /// ERC20 `allowance(owner, spender)` of `token`
    async fn read_allowance(
        &self,
        token: Address,
        owner: Address,
        spender: Address,
    ) -> Result<U256>;

    /// ERC20 `balanceOf(owner)` of `token`
    async fn read_token_balance(&self, token: Address, owner: Address) -> Result<U256>;

    /// Native currency balance of `owner`
    async fn read_native_balance(&self, owner: Address) -> Result<U256>;

    /// Call data for `token.approve(spender, amount)`
    fn encode_approve_call(&self, token: Address, spender: Address, amount: U256) -> Result<Bytes>;

    /// Call data wrapping native currency into the wrapped token
    fn encode_wrap_call(&self) -> Result<Bytes>;
}
