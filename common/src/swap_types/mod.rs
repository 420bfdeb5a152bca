//! # Swap Types Module
//!
//! Kiểu dữ liệu dùng chung cho luồng swap qua aggregator: trạng thái order
//! phía sàn và trạng thái thông báo đã chuẩn hóa.

pub mod status;

pub use status::{ExchangeStatus, NotificationStatus};
