use crate::orders::{IntegrityError, ManagerError};
use shared::order::{CommandError, CommandErrorCode, OrderId};
use thiserror::Error;

/// Rejections and failures reported to the command layer
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("Storage quota reached ({limit} orders)")]
    QuotaExceeded { limit: i64 },

    #[error("Cannot post to yourself")]
    SamePerson,

    #[error("Receiver is not registered: {0}")]
    UnknownReceiver(String),

    #[error("Nothing in hand to post")]
    EmptyHand,

    #[error("Hand must be empty to take an item")]
    HandOccupied,

    #[error("Order not found: {0}")]
    OrderNotFound(OrderId),

    #[error("Order {0} is not addressed to you")]
    NotReceiver(OrderId),

    #[error("Order {0} was not sent by you")]
    NotSender(OrderId),

    #[error(transparent)]
    Ledger(ManagerError),
}

impl From<ManagerError> for ServiceError {
    fn from(err: ManagerError) -> Self {
        match err {
            ManagerError::OrderNotFound(id) => ServiceError::OrderNotFound(id),
            ManagerError::QuotaExceeded { limit } => ServiceError::QuotaExceeded { limit },
            ManagerError::NotReceiver { order_id, .. } => ServiceError::NotReceiver(order_id),
            ManagerError::NotSender { order_id, .. } => ServiceError::NotSender(order_id),
            other => ServiceError::Ledger(other),
        }
    }
}

impl ServiceError {
    pub fn code(&self) -> CommandErrorCode {
        match self {
            ServiceError::QuotaExceeded { .. } => CommandErrorCode::QuotaExceeded,
            ServiceError::SamePerson => CommandErrorCode::SamePerson,
            ServiceError::UnknownReceiver(_) => CommandErrorCode::UnknownReceiver,
            ServiceError::EmptyHand => CommandErrorCode::EmptyHand,
            ServiceError::HandOccupied => CommandErrorCode::HandOccupied,
            ServiceError::OrderNotFound(_) => CommandErrorCode::OrderNotFound,
            ServiceError::NotReceiver(_) => CommandErrorCode::NotReceiver,
            ServiceError::NotSender(_) => CommandErrorCode::NotSender,
            ServiceError::Ledger(ManagerError::Integrity(IntegrityError::InvalidOrder { .. })) => {
                CommandErrorCode::InvalidOrder
            }
            ServiceError::Ledger(ManagerError::Integrity(
                IntegrityError::InvalidRegisteredPlayerList { .. },
            )) => CommandErrorCode::InvalidRegisteredPlayerList,
            ServiceError::Ledger(_) => CommandErrorCode::StorageFailed,
        }
    }
}

impl From<ServiceError> for CommandError {
    fn from(err: ServiceError) -> Self {
        let code = err.code();
        if let ServiceError::Ledger(e) = &err {
            tracing::error!(error = %e, error_code = ?code, "Ledger error reached the command layer");
        }
        CommandError::new(code, err.to_string())
    }
}

pub type ServiceResult<T> = Result<T, ServiceError>;
