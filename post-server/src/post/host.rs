//! Game integration seam
//!
//! The post service never talks to the game directly. Reading and
//! replacing the item a player holds, and rendering notices (text, sound),
//! are the host's job.

use serde::{Deserialize, Serialize};
use shared::order::OrderId;

/// Something a player should be told about
///
/// Serializes as `{"type": "INCOMING_ORDER", ...}` for hosts that forward
/// notices to a client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Notice {
    /// A new order was posted to this player
    IncomingOrder { order_id: OrderId, sender: String },
    /// Sent some time after login when orders are waiting
    PendingOrders { count: usize },
    /// An order addressed to this player was cancelled by its sender
    OrderCancelled { order_id: OrderId, sender: String },
}

/// Host-side operations the post service depends on
pub trait GameHost: Send + Sync {
    /// Serialized form of the held item, `None` if the hand is empty
    fn held_item(&self, player: &str) -> Option<String>;

    /// Put `item` into the player's hand, replacing whatever is there
    fn replace_held_item(&self, player: &str, item: &str);

    fn clear_held_item(&self, player: &str);

    fn notify(&self, player: &str, notice: Notice);
}
