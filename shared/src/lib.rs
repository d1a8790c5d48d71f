//! Shared types for the post ledger
//!
//! Persisted order records, the ledger file layout, and the rejection
//! codes the command layer renders.

pub mod order;

// Re-exports
pub use serde::{Deserialize, Serialize};

pub use order::{CommandError, CommandErrorCode, LedgerData, NewOrderRequest, Order, OrderId};
