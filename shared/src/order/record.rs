//! Order records and the persisted ledger layout
//!
//! ```text
//! {
//!   "players": ["alice", "bob"],
//!   "orders": {
//!     "1": { "id": 1, "sender": "alice", "receiver": "bob", ... }
//!   }
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Order id, unique among live orders
pub type OrderId = u64;

/// Comment stored when the sender gives none
pub const NO_COMMENT: &str = "no comment";

/// A pending transfer as submitted by the sender
///
/// Carries no id: the ledger assigns one on insertion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewOrderRequest {
    pub sender: String,
    pub receiver: String,
    /// Opaque serialized item payload
    pub item: String,
    pub comment: String,
    /// Formatted creation timestamp
    pub created_at: String,
}

impl NewOrderRequest {
    pub fn new(
        sender: impl Into<String>,
        receiver: impl Into<String>,
        item: impl Into<String>,
        comment: Option<String>,
        created_at: impl Into<String>,
    ) -> Self {
        Self {
            sender: sender.into(),
            receiver: receiver.into(),
            item: item.into(),
            comment: comment.unwrap_or_else(|| NO_COMMENT.to_string()),
            created_at: created_at.into(),
        }
    }

    /// Bind the request to an allocated id
    pub fn into_order(self, id: OrderId) -> Order {
        Order {
            id,
            sender: self.sender,
            receiver: self.receiver,
            item: self.item,
            comment: self.comment,
            created_at: self.created_at,
        }
    }
}

/// A live order in the ledger
///
/// Only produced by the ledger itself or by deserialization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub sender: String,
    pub receiver: String,
    pub item: String,
    #[serde(default = "default_comment")]
    pub comment: String,
    #[serde(rename = "time")]
    pub created_at: String,
}

fn default_comment() -> String {
    NO_COMMENT.to_string()
}

/// Raw ledger file contents
///
/// Keys of `orders` are kept as strings: whether a key agrees with the
/// embedded id is only decided by the consistency pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerData {
    #[serde(default)]
    pub players: Vec<String>,
    #[serde(default)]
    pub orders: BTreeMap<String, Order>,
}
