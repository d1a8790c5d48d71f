use crate::orders::ManagerError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ServerError {
    #[error("Ledger error: {0}")]
    Ledger(#[from] ManagerError),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

/// Result type for server lifecycle operations
pub type Result<T> = std::result::Result<T, ServerError>;
