//! Order records
//!
//! - Requests: what a sender submits, without an id
//! - Orders: persisted records, keyed by their id
//! - Ledger data: the on-disk layout (players + orders)

pub mod record;
pub mod types;

// Re-exports
pub use record::{LedgerData, NewOrderRequest, Order, OrderId, NO_COMMENT};
pub use types::*;
