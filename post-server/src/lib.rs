//! Post Server - player-to-player item mail ledger
//!
//! Players post the item they hold to another registered player; the item
//! waits in the ledger until the receiver takes it or the sender cancels.
//!
//! # Module Structure
//!
//! ```text
//! post-server/src/
//! ├── core/     # config, lifecycle (PostServer), errors
//! ├── orders/   # ledger, indices, consistency pass, quota, storage
//! ├── post/     # post / receive / cancel workflows, game host seam
//! └── utils/    # logging, time formatting
//! ```

pub mod core;
pub mod orders;
pub mod post;
pub mod utils;

// Re-export public types
pub use core::{Config, JoinOutcome, PostServer, ServerError};
pub use orders::{LoadReport, OrdersManager, RepairPolicy, StoragePolicy};
pub use post::{GameHost, Notice, PostService, ServiceError};

// Re-export logger functions
pub use utils::logger::{cleanup_old_logs, init_logger, init_logger_with_file};

/// Load `.env`, read the config and initialise logging
pub fn setup_environment() -> anyhow::Result<Config> {
    dotenv::dotenv().ok();
    let config = Config::from_env();
    init_logger_with_file(&config.log_level, config.log_json, config.log_dir.as_deref())?;
    Ok(config)
}
