//! ABI helpers for the ERC20 and WETH calls a swap needs
//!
//! Contracts are parsed once from human-readable signatures and reused.

use ethers::abi::{parse_abi, Detokenize, Tokenize};
use ethers::contract::BaseContract;
use ethers::types::{Address, Bytes, U256};
use once_cell::sync::Lazy;

use crate::error::{Result, SwapError};

static ERC20: Lazy<std::result::Result<BaseContract, String>> = Lazy::new(|| {
    parse_abi(&[
        "function approve(address spender, uint256 amount) returns (bool)",
        "function allowance(address owner, address spender) view returns (uint256)",
        "function balanceOf(address account) view returns (uint256)",
    ])
    .map(BaseContract::from)
    .map_err(|e| e.to_string())
});

static WETH: Lazy<std::result::Result<BaseContract, String>> = Lazy::new(|| {
    parse_abi(&[
        "function deposit() payable",
        "function withdraw(uint256 wad)",
    ])
    .map(BaseContract::from)
    .map_err(|e| e.to_string())
});

fn contract(
    abi: &'static Lazy<std::result::Result<BaseContract, String>>,
) -> Result<&'static BaseContract> {
    Lazy::force(abi)
        .as_ref()
        .map_err(|e| SwapError::Encoding(format!("Failed to parse ABI: {}", e)))
}

fn encode<T: Tokenize>(
    abi: &'static Lazy<std::result::Result<BaseContract, String>>,
    function: &str,
    args: T,
) -> Result<Bytes> {
    contract(abi)?
        .encode(function, args)
        .map_err(|e| SwapError::Encoding(format!("Failed to encode {}: {}", function, e)))
}

/// `approve(spender, amount)`
pub fn encode_approve(spender: Address, amount: U256) -> Result<Bytes> {
    encode(&ERC20, "approve", (spender, amount))
}

/// `allowance(owner, spender)`
pub fn encode_allowance(owner: Address, spender: Address) -> Result<Bytes> {
    encode(&ERC20, "allowance", (owner, spender))
}

/// `balanceOf(account)`
pub fn encode_balance_of(account: Address) -> Result<Bytes> {
    encode(&ERC20, "balanceOf", account)
}

/// WETH `deposit()`; the amount travels as the transaction value
pub fn encode_deposit() -> Result<Bytes> {
    encode(&WETH, "deposit", ())
}

/// Decode the return value of an ERC20 view call
pub fn decode_erc20_output<D: Detokenize>(function: &str, data: &[u8]) -> Result<D> {
    contract(&ERC20)?
        .decode_output(function, data)
        .map_err(|e| SwapError::Encoding(format!("Failed to decode {}: {}", function, e)))
}
