// Common library for the dexag workspace
//
// This crate provides the shared types used by the swap engine and by callers that
// track swap orders: order status codes, normalized notification statuses and the
// kinds of transactions a swap is made of.

pub mod swap_types;
pub mod trading_actions;

pub use swap_types::{ExchangeStatus, NotificationStatus};
pub use trading_actions::{ProviderKind, TransactionKind};
