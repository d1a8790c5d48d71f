//! Secondary indices: sender → order ids, receiver → order ids
//!
//! Derived data only. Never persisted, rebuilt from the ledger on load and
//! updated in lock-step with every ledger mutation. Lists keep insertion
//! order; a player whose list empties is dropped from the map.

use shared::order::{Order, OrderId};
use std::collections::HashMap;

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct OrderIndex {
    by_sender: HashMap<String, Vec<OrderId>>,
    by_receiver: HashMap<String, Vec<OrderId>>,
}

impl OrderIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clear both maps and repopulate from `orders`, one pass
    pub fn rebuild<'a>(&mut self, orders: impl IntoIterator<Item = &'a Order>) {
        self.by_sender.clear();
        self.by_receiver.clear();
        for order in orders {
            self.insert(order);
        }
    }

    /// Append the order's id to both lists
    pub fn insert(&mut self, order: &Order) {
        self.by_sender
            .entry(order.sender.clone())
            .or_default()
            .push(order.id);
        self.by_receiver
            .entry(order.receiver.clone())
            .or_default()
            .push(order.id);
    }

    /// Remove the order's id from both lists
    pub fn remove(&mut self, order: &Order) {
        remove_id(&mut self.by_sender, &order.sender, order.id);
        remove_id(&mut self.by_receiver, &order.receiver, order.id);
    }

    pub fn sent_by(&self, player: &str) -> &[OrderId] {
        self.by_sender.get(player).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn addressed_to(&self, player: &str) -> &[OrderId] {
        self.by_receiver.get(player).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Number of live orders sent by `player`
    pub fn sent_count(&self, player: &str) -> usize {
        self.sent_by(player).len()
    }

    /// Total ids held across all sender lists and all receiver lists
    #[cfg(test)]
    pub(crate) fn sizes(&self) -> (usize, usize) {
        (
            self.by_sender.values().map(Vec::len).sum(),
            self.by_receiver.values().map(Vec::len).sum(),
        )
    }
}

fn remove_id(map: &mut HashMap<String, Vec<OrderId>>, player: &str, id: OrderId) {
    let Some(ids) = map.get_mut(player) else {
        return;
    };
    if let Some(pos) = ids.iter().position(|&x| x == id) {
        ids.remove(pos);
    }
    if ids.is_empty() {
        map.remove(player);
    }
}
