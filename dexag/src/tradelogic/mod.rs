//! TradeLogic module for dexag
//!
//! Core swap logic: approval decisions, wrap calculation, transaction ordering,
//! order status mapping and the orchestrator tying them together.

pub mod allowance;
pub mod assembler;
pub mod orchestrator;
pub mod status;
pub mod wrap;

pub use allowance::{AllowanceResolver, ApprovalDecision, ApprovalSteps};
pub use assembler::{OrderedTransactions, TransactionAssembler};
pub use orchestrator::{create_swap_orchestrator, SwapOrchestrator};
pub use status::{map_status, StatusMapper};
pub use wrap::{WrapCalculator, WrapDecision, WrapStep};
