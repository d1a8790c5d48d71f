//! Timestamp formatting for order records

use chrono::Local;

/// Layout of `Order::created_at`
pub const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Current local time, formatted for an order record
pub fn formatted_now() -> String {
    Local::now().format(TIME_FORMAT).to_string()
}
