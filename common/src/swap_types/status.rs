//! Swap order status types
//!
//! This module defines the exchange-side order status codes reported by the
//! aggregator and the normalized `NotificationStatus` the rest of the system
//! works with. The mapping between the two lives with the swap engine.

use serde::{Serialize, Deserialize};
use std::fmt;
use std::str::FromStr;

/// Order status code as reported by the aggregator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExchangeStatus {
    /// Order created, nothing received yet
    New,
    /// Waiting for the deposit
    Waiting,
    /// Deposit seen, waiting for confirmations
    Confirming,
    /// Funds are being exchanged
    Exchanging,
    /// Payout is being sent
    Sending,
    /// Order put on hold by the provider
    Hold,
    /// Payout delivered
    Finished,
    /// Order failed
    Failed,
    /// Deposit did not arrive in time
    Overdue,
    /// Deposit returned to the sender
    Refunded,
}

impl ExchangeStatus {
    /// Every code the aggregator is known to emit
    pub const ALL: [ExchangeStatus; 10] = [
        Self::New,
        Self::Waiting,
        Self::Confirming,
        Self::Exchanging,
        Self::Sending,
        Self::Hold,
        Self::Finished,
        Self::Failed,
        Self::Overdue,
        Self::Refunded,
    ];

    /// Wire code of the status
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::New => "new",
            Self::Waiting => "waiting",
            Self::Confirming => "confirming",
            Self::Exchanging => "exchanging",
            Self::Sending => "sending",
            Self::Hold => "hold",
            Self::Finished => "finished",
            Self::Failed => "failed",
            Self::Overdue => "overdue",
            Self::Refunded => "refunded",
        }
    }
}

impl fmt::Display for ExchangeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ExchangeStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|status| status.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("Unknown exchange status: {}", s))
    }
}

/// Normalized status used for swap notifications
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum NotificationStatus {
    /// Order exists, funds not sent yet
    New,
    /// Funds sent by the user
    Sent,
    /// Order in progress
    Pending,
    /// Order finished successfully
    Complete,
    /// Order failed
    Failed,
    /// Order cancelled or refunded
    Cancelled,
}

impl NotificationStatus {
    /// Check if the status is terminal (no further updates expected)
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Complete | Self::Failed | Self::Cancelled)
    }

    /// Check if the order finished successfully
    pub fn is_successful(&self) -> bool {
        matches!(self, Self::Complete)
    }
}

impl fmt::Display for NotificationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::New => write!(f, "NEW"),
            Self::Sent => write!(f, "SENT"),
            Self::Pending => write!(f, "PENDING"),
            Self::Complete => write!(f, "COMPLETE"),
            Self::Failed => write!(f, "FAILED"),
            Self::Cancelled => write!(f, "CANCELLED"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exchange_status_parse() {
        assert_eq!("overdue".parse::<ExchangeStatus>(), Ok(ExchangeStatus::Overdue));
        assert_eq!("HOLD".parse::<ExchangeStatus>(), Ok(ExchangeStatus::Hold));
        assert_eq!(" finished ".parse::<ExchangeStatus>(), Ok(ExchangeStatus::Finished));
        assert!("expired".parse::<ExchangeStatus>().is_err());
        assert!("".parse::<ExchangeStatus>().is_err());
    }

    #[test]
    fn test_exchange_status_display_matches_wire_code() {
        for status in ExchangeStatus::ALL {
            assert_eq!(status.to_string().parse::<ExchangeStatus>(), Ok(status));
        }
        assert_eq!(
            serde_json::to_string(&ExchangeStatus::Refunded).unwrap(),
            "\"refunded\""
        );
    }

    #[test]
    fn test_notification_status_properties() {
        assert!(NotificationStatus::Complete.is_terminal());
        assert!(NotificationStatus::Failed.is_terminal());
        assert!(NotificationStatus::Cancelled.is_terminal());
        assert!(!NotificationStatus::Pending.is_terminal());
        assert!(!NotificationStatus::New.is_terminal());

        assert!(NotificationStatus::Complete.is_successful());
        assert!(!NotificationStatus::Cancelled.is_successful());
        assert_eq!(NotificationStatus::Cancelled.to_string(), "CANCELLED");
    }
}
