//! EVM Adapter
//!
//! `LedgerClient` implementation over an ethers JSON-RPC provider. Allowance and
//! token balances are read with `eth_call`, native balances with `eth_getBalance`.

use async_trait::async_trait;
use ethers::providers::{Http, Middleware, Provider};
use ethers::types::transaction::eip2718::TypedTransaction;
use ethers::types::{Address, Bytes, TransactionRequest, U256};
use tracing::{debug, error};

use super::abi;
use super::ledger::LedgerClient;
use crate::error::{Result, SwapError};

/// Ledger client backed by an HTTP JSON-RPC endpoint
#[derive(Debug, Clone)]
pub struct EvmLedgerClient {
    provider: Provider<Http>,
}

impl EvmLedgerClient {
    /// Connect to the given RPC URL
    pub fn new(rpc_url: &str) -> Result<Self> {
        let provider = Provider::<Http>::try_from(rpc_url).map_err(|e| {
            error!("Invalid RPC URL {}: {}", rpc_url, e);
            SwapError::ledger_read("connect", format!("invalid RPC URL {}: {}", rpc_url, e))
        })?;
        Ok(Self { provider })
    }

    /// Wrap an existing provider
    pub fn from_provider(provider: Provider<Http>) -> Self {
        Self { provider }
    }

    async fn call_uint(
        &self,
        operation: &str,
        function: &str,
        token: Address,
        data: Bytes,
    ) -> Result<U256> {
        let tx: TypedTransaction = TransactionRequest::new().to(token).data(data).into();

        let output = self.provider.call(&tx, None).await.map_err(|e| {
            error!("{} call on {:?} failed: {}", function, token, e);
            SwapError::ledger_read(operation, e)
        })?;

        abi::decode_erc20_output(function, &output)
            .map_err(|e| SwapError::ledger_read(operation, e))
    }
}

#[async_trait]
impl LedgerClient for EvmLedgerClient {
    async fn read_allowance(
        &self,
        token: Address,
        owner: Address,
        spender: Address,
    ) -> Result<U256> {
        let data = abi::encode_allowance(owner, spender)?;
        let allowance = self.call_uint("allowance", "allowance", token, data).await?;
        debug!("Allowance of {:?} for {:?} on {:?}: {}", owner, spender, token, allowance);
        Ok(allowance)
    }

    async fn read_token_balance(&self, token: Address, owner: Address) -> Result<U256> {
        let data = abi::encode_balance_of(owner)?;
        let balance = self.call_uint("token_balance", "balanceOf", token, data).await?;
        debug!("Token balance of {:?} on {:?}: {}", owner, token, balance);
        Ok(balance)
    }

    async fn read_native_balance(&self, owner: Address) -> Result<U256> {
        let balance = self.provider.get_balance(owner, None).await.map_err(|e| {
            error!("eth_getBalance for {:?} failed: {}", owner, e);
            SwapError::ledger_read("native_balance", e)
        })?;
        debug!("Native balance of {:?}: {}", owner, balance);
        Ok(balance)
    }

    fn encode_approve_call(
        &self,
        _token: Address,
        spender: Address,
        amount: U256,
    ) -> Result<Bytes> {
        abi::encode_approve(spender, amount)
    }

    fn encode_wrap_call(&self) -> Result<Bytes> {
        abi::encode_deposit()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_rejects_invalid_url() {
        let result = EvmLedgerClient::new("not a url");
        assert!(matches!(result, Err(SwapError::LedgerRead { .. })));
    }

    #[test]
    fn test_encoding_does_not_need_connection() {
        let client = EvmLedgerClient::new("http://127.0.0.1:8545").unwrap();
        let approve = client
            .encode_approve_call(Address::zero(), Address::from_low_u64_be(7), U256::from(1))
            .unwrap();
        assert_eq!(&approve[..4], &[0x09, 0x5e, 0xa7, 0xb3]);
        assert_eq!(&client.encode_wrap_call().unwrap()[..], &[0xd0, 0xe3, 0x0d, 0xb0]);
    }

    #[tokio::test]
    async fn test_read_fails_when_node_unreachable() {
        // Port 9 (discard) is not an RPC endpoint
        let client = EvmLedgerClient::new("http://127.0.0.1:9").unwrap();
        let result = client.read_native_balance(Address::zero()).await;
        assert!(matches!(
            result,
            Err(SwapError::LedgerRead { ref operation, .. }) if operation == "native_balance"
        ));
    }
}
