//! Module chain_adapters
//!
//! Module này chịu trách nhiệm tương tác với blockchain EVM cho luồng swap:
//! - ledger: trait `LedgerClient` mà engine swap phụ thuộc vào
//! - evm_adapter: triển khai `LedgerClient` qua JSON-RPC (ethers)
//! - abi: mã hóa các lời gọi ERC20 / WETH

pub mod abi;
pub mod evm_adapter;
pub mod ledger;

pub use evm_adapter::EvmLedgerClient;
pub use ledger::LedgerClient;
