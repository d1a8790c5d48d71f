//! Order ledger - the authoritative id → order store
//!
//! Also owns the registered-player set, since both are persisted together.
//! A ledger is only ever built by the consistency pass, so every stored
//! order sits under its own id.

use shared::order::{LedgerData, NewOrderRequest, Order, OrderId};
use std::collections::BTreeMap;

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct OrderLedger {
    players: Vec<String>,
    orders: BTreeMap<OrderId, Order>,
}

impl OrderLedger {
    pub(crate) fn from_parts(players: Vec<String>, orders: BTreeMap<OrderId, Order>) -> Self {
        debug_assert!(orders.iter().all(|(id, order)| *id == order.id));
        Self { players, orders }
    }

    /// Persisted form: orders keyed by the decimal string of their id
    pub fn to_data(&self) -> LedgerData {
        LedgerData {
            players: self.players.clone(),
            orders: self
                .orders
                .values()
                .map(|order| (order.id.to_string(), order.clone()))
                .collect(),
        }
    }

    // ========== Orders ==========

    /// Smallest positive id not used by a live order
    ///
    /// Freed ids are handed out again before any higher one.
    pub fn next_id(&self) -> OrderId {
        let mut candidate = 1;
        for &id in self.orders.keys() {
            if id == candidate {
                candidate += 1;
            } else if id > candidate {
                break;
            }
        }
        candidate
    }

    /// Store the request under a freshly allocated id
    pub fn insert(&mut self, request: NewOrderRequest) -> &Order {
        let id = self.next_id();
        self.orders
            .entry(id)
            .or_insert_with(|| request.into_order(id))
    }

    pub fn remove(&mut self, id: OrderId) -> Option<Order> {
        self.orders.remove(&id)
    }

    pub fn get(&self, id: OrderId) -> Option<&Order> {
        self.orders.get(&id)
    }

    pub fn contains(&self, id: OrderId) -> bool {
        self.orders.contains_key(&id)
    }

    /// Live orders in ascending id order
    pub fn orders(&self) -> impl Iterator<Item = &Order> {
        self.orders.values()
    }

    pub fn len(&self) -> usize {
        self.orders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }

    // ========== Registered players ==========

    pub fn players(&self) -> &[String] {
        &self.players
    }

    pub fn is_registered(&self, player: &str) -> bool {
        self.players.iter().any(|p| p == player)
    }

    /// Returns false if the player was already registered
    pub fn add_player(&mut self, player: &str) -> bool {
        if self.is_registered(player) {
            return false;
        }
        self.players.push(player.to_string());
        true
    }

    /// Returns false if the player was not registered
    pub fn remove_player(&mut self, player: &str) -> bool {
        match self.players.iter().position(|p| p == player) {
            Some(pos) => {
                self.players.remove(pos);
                true
            }
            None => false,
        }
    }
}
