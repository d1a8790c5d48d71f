//! post-ledger - offline check of the ledger file
//!
//! Opens the ledger named by the environment config, runs the consistency
//! pass under the configured policy, and reports. In auto-fix mode any
//! repair is written back.

use post_server::orders::{JsonFileStorage, OrdersManager};
use post_server::{cleanup_old_logs, setup_environment};
use std::path::Path;
use std::sync::Arc;

const LOG_RETENTION_DAYS: i64 = 14;

fn main() -> anyhow::Result<()> {
    let config = setup_environment()?;

    if let Some(dir) = &config.log_dir
        && let Err(e) = cleanup_old_logs(Path::new(dir), LOG_RETENTION_DAYS)
    {
        tracing::warn!(error = %e, "Failed to clean up old logs");
    }

    let path = config.orders_path();
    tracing::info!(path = %path.display(), auto_fix = config.auto_fix, "Checking ledger");

    let storage = Arc::new(JsonFileStorage::new(&path));
    let (manager, report) =
        match OrdersManager::open(storage, config.repair_policy(), config.storage_policy()) {
            Ok(opened) => opened,
            Err(e) => {
                tracing::error!(error = %e, "Ledger check failed");
                return Err(e.into());
            }
        };

    for (key, id) in &report.rekeyed {
        tracing::info!(key = %key, order_id = id, "Re-keyed");
    }
    for r in &report.reassigned {
        tracing::info!(key = %r.key, old_id = r.old_id, new_id = r.new_id, "Reassigned");
    }
    if !report.duplicate_players.is_empty() {
        tracing::info!(removed = ?report.duplicate_players, "Removed duplicate players");
    }

    let players = manager.get_players();
    let mut waiting = 0;
    for player in &players {
        waiting += usize::from(manager.has_unreceived_order(player));
    }
    tracing::info!(
        orders = manager.get_orders().len(),
        players = players.len(),
        players_with_mail = waiting,
        next_id = manager.get_next_id(),
        clean = report.is_clean(),
        "Ledger OK"
    );

    Ok(())
}
