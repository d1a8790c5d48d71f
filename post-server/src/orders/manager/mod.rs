//! OrdersManager - ledger + secondary indices behind one lock
//!
//! This module handles:
//! - Loading (consistency pass, then index rebuild)
//! - Id allocation and the create/remove/pop transitions
//! - Per-sender quota checks
//! - Persistence of the full ledger through [`LedgerStorage`]
//!
//! # Locking
//!
//! ```text
//! RwLock<LedgerState { ledger, index }>
//!     ├─ reads   : read lock, records cloned out
//!     ├─ mutations: one write lock for the whole read-modify-write
//!     └─ save    : upgradable read (or the mutation's write lock), so
//!                  saves never overlap
//! ```
//!
//! Holding the lock across a save means an older snapshot can never be
//! written after a newer one.

mod error;
pub use error::*;

use super::index::OrderIndex;
use super::integrity::{LoadReport, RepairPolicy, check_ledger};
use super::ledger::OrderLedger;
use super::quota::StoragePolicy;
use super::storage::LedgerStorage;
use parking_lot::RwLock;
use shared::order::{NewOrderRequest, Order, OrderId};
use std::sync::Arc;

/// Which side of an order a player claims to be
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Party {
    Sender,
    Receiver,
}

#[derive(Debug, Default)]
struct LedgerState {
    ledger: OrderLedger,
    index: OrderIndex,
}

impl LedgerState {
    fn new(ledger: OrderLedger) -> Self {
        let mut index = OrderIndex::new();
        index.rebuild(ledger.orders());
        Self { ledger, index }
    }

    fn add(&mut self, request: NewOrderRequest) -> OrderId {
        let order = self.ledger.insert(request);
        self.index.insert(order);
        order.id
    }

    fn remove(&mut self, id: OrderId) -> Option<Order> {
        let order = self.ledger.remove(id)?;
        self.index.remove(&order);
        Some(order)
    }

    fn resolve(&self, ids: &[OrderId]) -> Vec<Order> {
        ids.iter()
            .filter_map(|id| self.ledger.get(*id).cloned())
            .collect()
    }
}

/// OrdersManager for the mail ledger
pub struct OrdersManager {
    storage: Arc<dyn LedgerStorage>,
    repair: RepairPolicy,
    quota: StoragePolicy,
    state: RwLock<LedgerState>,
}

impl std::fmt::Debug for OrdersManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OrdersManager")
            .field("storage", &"<LedgerStorage>")
            .field("repair", &self.repair)
            .field("quota", &self.quota)
            .finish()
    }
}

impl OrdersManager {
    /// Open the ledger from `storage`, running the consistency pass
    pub fn open(
        storage: Arc<dyn LedgerStorage>,
        repair: RepairPolicy,
        quota: StoragePolicy,
    ) -> ManagerResult<(Self, LoadReport)> {
        let manager = Self {
            storage,
            repair,
            quota,
            state: RwLock::new(LedgerState::default()),
        };
        let report = manager.load()?;
        Ok((manager, report))
    }

    /// Replace the in-memory ledger with what storage holds
    ///
    /// On failure the current state is left untouched. If the consistency
    /// pass repaired anything, the repaired ledger is saved before it
    /// replaces the current state.
    pub fn load(&self) -> ManagerResult<LoadReport> {
        let data = self.storage.load()?;
        let (ledger, report) = check_ledger(data, self.repair)?;

        let mut state = self.state.write();
        if !report.is_clean() {
            tracing::warn!(
                rekeyed = report.rekeyed.len(),
                reassigned = report.reassigned.len(),
                duplicate_players = report.duplicate_players.len(),
                "Ledger repaired during load, saving"
            );
            self.storage.save(&ledger.to_data())?;
        }

        *state = LedgerState::new(ledger);
        tracing::info!(
            orders = state.ledger.len(),
            players = state.ledger.players().len(),
            "Ledger loaded"
        );
        Ok(report)
    }

    /// Serialize the ledger and player set back to storage
    ///
    /// Saves exclude each other and every mutation (which save under the
    /// write lock), while plain reads carry on.
    pub fn save(&self) -> ManagerResult<()> {
        let state = self.state.upgradable_read();
        self.storage.save(&state.ledger.to_data())?;
        Ok(())
    }

    pub fn quota(&self) -> StoragePolicy {
        self.quota
    }

    // ========== Orders ==========

    /// Smallest positive id not used by a live order
    pub fn get_next_id(&self) -> OrderId {
        self.state.read().ledger.next_id()
    }

    /// Store a new order, updating both indices. Caller persists.
    pub fn add_order(&self, request: NewOrderRequest) -> OrderId {
        let id = self.state.write().add(request);
        tracing::debug!(order_id = id, "Order added");
        id
    }

    /// Like [`add_order`](Self::add_order), but refused when the sender is
    /// at quota. A refused request consumes no id.
    pub fn try_add_order(&self, request: NewOrderRequest) -> ManagerResult<OrderId> {
        let mut state = self.state.write();
        if self.quota.is_full(state.index.sent_count(&request.sender)) {
            return Err(ManagerError::QuotaExceeded {
                limit: self.quota.max_storage(),
            });
        }
        let id = state.add(request);
        tracing::debug!(order_id = id, "Order added");
        Ok(id)
    }

    /// Delete a live order from the ledger and both indices
    ///
    /// Returns false, touching nothing, if `id` is not live.
    pub fn remove_order(&self, id: OrderId) -> bool {
        let removed = self.state.write().remove(id).is_some();
        if removed {
            tracing::debug!(order_id = id, "Order removed");
        }
        removed
    }

    /// Remove a live order and persist, returning the removed record
    pub fn pop_order(&self, id: OrderId) -> ManagerResult<Order> {
        let mut state = self.state.write();
        let order = state.remove(id).ok_or(ManagerError::OrderNotFound(id))?;
        self.persist_after_pop(&state, id);
        Ok(order)
    }

    /// [`pop_order`](Self::pop_order) restricted to one side of the order
    ///
    /// The ownership check and the removal happen under the same lock.
    pub fn pop_order_as(&self, id: OrderId, player: &str, party: Party) -> ManagerResult<Order> {
        let mut state = self.state.write();
        let order = state
            .ledger
            .get(id)
            .ok_or(ManagerError::OrderNotFound(id))?;
        check_party(order, player, party)?;

        let order = state.remove(id).ok_or(ManagerError::OrderNotFound(id))?;
        self.persist_after_pop(&state, id);
        Ok(order)
    }

    // The order is already out of the ledger and is handed back to the
    // caller regardless; a failed save leaves the change in memory only.
    fn persist_after_pop(&self, state: &LedgerState, id: OrderId) {
        match self.storage.save(&state.ledger.to_data()) {
            Ok(()) => tracing::info!(order_id = id, "Order popped"),
            Err(e) => tracing::error!(
                order_id = id,
                error = %e,
                "Order popped but ledger save failed, change is unsaved"
            ),
        }
    }

    /// Check that `player` is the given side of a live order
    pub fn check_party(&self, id: OrderId, player: &str, party: Party) -> ManagerResult<()> {
        let state = self.state.read();
        let order = state
            .ledger
            .get(id)
            .ok_or(ManagerError::OrderNotFound(id))?;
        check_party(order, player, party)
    }

    pub fn get_order(&self, id: OrderId) -> Option<Order> {
        self.state.read().ledger.get(id).cloned()
    }

    /// All live orders, ascending by id
    pub fn get_orders(&self) -> Vec<Order> {
        self.state.read().ledger.orders().cloned().collect()
    }

    /// Orders sent by `player`, in posting order
    pub fn get_orders_by_sender(&self, player: &str) -> Vec<Order> {
        let state = self.state.read();
        state.resolve(state.index.sent_by(player))
    }

    /// Orders addressed to `player`, in posting order
    pub fn get_orders_by_receiver(&self, player: &str) -> Vec<Order> {
        let state = self.state.read();
        state.resolve(state.index.addressed_to(player))
    }

    pub fn get_order_ids_by_sender(&self, player: &str) -> Vec<OrderId> {
        self.state.read().index.sent_by(player).to_vec()
    }

    pub fn get_order_ids_by_receiver(&self, player: &str) -> Vec<OrderId> {
        self.state.read().index.addressed_to(player).to_vec()
    }

    pub fn has_unreceived_order(&self, player: &str) -> bool {
        !self.state.read().index.addressed_to(player).is_empty()
    }

    /// Whether `player` has reached the outstanding-order quota
    pub fn is_storage_full(&self, player: &str) -> bool {
        self.quota.is_full(self.state.read().index.sent_count(player))
    }

    // ========== Registered players ==========

    pub fn is_player_registered(&self, player: &str) -> bool {
        self.state.read().ledger.is_registered(player)
    }

    pub fn add_player(&self, player: &str) -> bool {
        self.state.write().ledger.add_player(player)
    }

    pub fn remove_player(&self, player: &str) -> bool {
        self.state.write().ledger.remove_player(player)
    }

    /// Registered players in registration order
    pub fn get_players(&self) -> Vec<String> {
        self.state.read().ledger.players().to_vec()
    }
}

fn check_party(order: &Order, player: &str, party: Party) -> ManagerResult<()> {
    match party {
        Party::Receiver if order.receiver != player => Err(ManagerError::NotReceiver {
            order_id: order.id,
            player: player.to_string(),
        }),
        Party::Sender if order.sender != player => Err(ManagerError::NotSender {
            order_id: order.id,
            player: player.to_string(),
        }),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests;
