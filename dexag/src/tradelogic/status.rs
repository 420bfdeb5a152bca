//! Order status mapping
//!
//! Maps the aggregator's order status codes onto `NotificationStatus`.

use std::str::FromStr;

use tracing::warn;

use common::{ExchangeStatus, NotificationStatus};

use crate::error::{Result, SwapError};

#[derive(Debug, Clone, Copy, Default)]
pub struct StatusMapper;

impl StatusMapper {
    pub fn new() -> Self {
        Self
    }

    /// Map a raw external code; unknown codes are an error
    pub fn map(&self, code: &str) -> Result<NotificationStatus> {
        match ExchangeStatus::from_str(code) {
            Ok(status) => Ok(map_status(status)),
            Err(_) => {
                warn!("Unknown order status code: {}", code);
                Err(SwapError::UnknownStatusCode(code.to_string()))
            }
        }
    }
}

/// Total mapping from the parsed external status
pub fn map_status(status: ExchangeStatus) -> NotificationStatus {
    match status {
        ExchangeStatus::New => NotificationStatus::New,
        ExchangeStatus::Waiting => NotificationStatus::Sent,
        ExchangeStatus::Confirming
        | ExchangeStatus::Exchanging
        | ExchangeStatus::Sending
        | ExchangeStatus::Hold => NotificationStatus::Pending,
        ExchangeStatus::Finished => NotificationStatus::Complete,
        ExchangeStatus::Failed => NotificationStatus::Failed,
        ExchangeStatus::Overdue | ExchangeStatus::Refunded => NotificationStatus::Cancelled,
    }
}
