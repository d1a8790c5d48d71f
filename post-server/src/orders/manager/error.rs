use super::super::integrity::IntegrityError;
use super::super::storage::StorageError;
use shared::order::OrderId;
use thiserror::Error;

/// Manager errors
#[derive(Debug, Error)]
pub enum ManagerError {
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Integrity(#[from] IntegrityError),

    #[error("Order not found: {0}")]
    OrderNotFound(OrderId),

    #[error("Storage quota reached ({limit} orders)")]
    QuotaExceeded { limit: i64 },

    #[error("Order {order_id} is not addressed to {player}")]
    NotReceiver { order_id: OrderId, player: String },

    #[error("Order {order_id} was not sent by {player}")]
    NotSender { order_id: OrderId, player: String },
}

pub type ManagerResult<T> = Result<T, ManagerError>;
