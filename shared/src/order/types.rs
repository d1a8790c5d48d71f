use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Command error
///
/// Every rejection carries a distinct code so the command layer can pick
/// a specific message.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct CommandError {
    pub code: CommandErrorCode,
    pub message: String,
}

impl CommandError {
    pub fn new(code: CommandErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

/// Command error codes
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CommandErrorCode {
    OrderNotFound,
    QuotaExceeded,
    SamePerson,
    UnknownReceiver,
    EmptyHand,
    HandOccupied,
    NotReceiver,
    NotSender,
    InvalidOrder,
    InvalidRegisteredPlayerList,
    StorageFailed,
}
