//! PostService - the operations the command layer calls
//!
//! Check order for each workflow (first failing check wins):
//!
//! | Operation | Checks |
//! |-----------|--------|
//! | post | quota → receiver registered → not self → hand holds an item |
//! | receive | order exists → player is receiver → hand empty |
//! | cancel | order exists → player is sender → hand empty |

use super::error::{ServiceError, ServiceResult};
use super::host::{GameHost, Notice};
use crate::orders::{NewOrderRequest, Order, OrderId, OrdersManager, Party};
use crate::utils::time::formatted_now;
use std::sync::Arc;

#[derive(Clone)]
pub struct PostService {
    manager: Arc<OrdersManager>,
    host: Arc<dyn GameHost>,
}

impl std::fmt::Debug for PostService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PostService")
            .field("manager", &self.manager)
            .field("host", &"<GameHost>")
            .finish()
    }
}

impl PostService {
    pub fn new(manager: Arc<OrdersManager>, host: Arc<dyn GameHost>) -> Self {
        Self { manager, host }
    }

    pub fn manager(&self) -> &Arc<OrdersManager> {
        &self.manager
    }

    /// Post the sender's held item to `receiver`
    pub fn post(
        &self,
        sender: &str,
        receiver: &str,
        comment: Option<String>,
    ) -> ServiceResult<OrderId> {
        if self.manager.is_storage_full(sender) {
            return Err(ServiceError::QuotaExceeded {
                limit: self.manager.quota().max_storage(),
            });
        }
        if !self.manager.is_player_registered(receiver) {
            return Err(ServiceError::UnknownReceiver(receiver.to_string()));
        }
        if sender == receiver {
            return Err(ServiceError::SamePerson);
        }
        let item = self
            .host
            .held_item(sender)
            .ok_or(ServiceError::EmptyHand)?;

        let request = NewOrderRequest::new(sender, receiver, item, comment, formatted_now());
        // quota is re-checked under the ledger lock
        let order_id = self.manager.try_add_order(request)?;

        self.host.clear_held_item(sender);
        tracing::info!(order_id, sender = %sender, receiver = %receiver, "Order posted");
        self.persist();

        self.host.notify(
            receiver,
            Notice::IncomingOrder {
                order_id,
                sender: sender.to_string(),
            },
        );
        Ok(order_id)
    }

    /// Take an order addressed to `player` into their hand
    pub fn receive(&self, player: &str, order_id: OrderId) -> ServiceResult<Order> {
        self.manager.check_party(order_id, player, Party::Receiver)?;
        if self.host.held_item(player).is_some() {
            return Err(ServiceError::HandOccupied);
        }

        let order = self.manager.pop_order_as(order_id, player, Party::Receiver)?;
        self.host.replace_held_item(player, &order.item);
        tracing::info!(order_id, player = %player, "Order received");
        Ok(order)
    }

    /// Withdraw an order `player` sent; the item goes back to their hand
    pub fn cancel(&self, player: &str, order_id: OrderId) -> ServiceResult<Order> {
        self.manager.check_party(order_id, player, Party::Sender)?;
        if self.host.held_item(player).is_some() {
            return Err(ServiceError::HandOccupied);
        }

        let order = self.manager.pop_order_as(order_id, player, Party::Sender)?;
        self.host.replace_held_item(player, &order.item);
        tracing::info!(order_id, player = %player, "Order cancelled");

        self.host.notify(
            &order.receiver,
            Notice::OrderCancelled {
                order_id,
                sender: order.sender.clone(),
            },
        );
        Ok(order)
    }

    pub fn list_by_sender(&self, player: &str) -> Vec<Order> {
        self.manager.get_orders_by_sender(player)
    }

    pub fn list_by_receiver(&self, player: &str) -> Vec<Order> {
        self.manager.get_orders_by_receiver(player)
    }

    pub fn list_all(&self) -> Vec<Order> {
        self.manager.get_orders()
    }

    pub fn has_unreceived_order(&self, player: &str) -> bool {
        self.manager.has_unreceived_order(player)
    }

    pub fn players(&self) -> Vec<String> {
        self.manager.get_players()
    }

    /// Returns false if already registered
    pub fn register_player(&self, player: &str) -> bool {
        let added = self.manager.add_player(player);
        if added {
            tracing::info!(player = %player, "Player registered");
            self.persist();
        }
        added
    }

    /// Returns false if not registered
    pub fn unregister_player(&self, player: &str) -> bool {
        let removed = self.manager.remove_player(player);
        if removed {
            tracing::info!(player = %player, "Player unregistered");
            self.persist();
        }
        removed
    }

    // The mutation is already applied; a failed save is reported in the
    // log and picked up by the next successful one.
    fn persist(&self) {
        if let Err(e) = self.manager.save() {
            tracing::error!(error = %e, "Ledger save failed, latest change is unsaved");
        }
    }
}
