//! Server lifecycle
//!
//! The host integration constructs one [`PostServer`], forwards game
//! events to it and calls [`PostServer::shutdown`] when the game stops:
//!
//! ```text
//! start ──> load + consistency pass + index rebuild
//!   │
//!   ├─ on_player_joined ──> register, or schedule a pending-orders reminder
//!   ├─ service()        ──> post / receive / cancel / listings
//!   ├─ reload / save
//!   │
//! shutdown ──> save
//! ```

use crate::core::{Config, Result};
use crate::orders::{JsonFileStorage, LedgerStorage, LoadReport, OrdersManager};
use crate::post::{GameHost, Notice, PostService};
use std::sync::Arc;
use std::time::Duration;

/// What happened when a player joined
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinOutcome {
    /// First time seen, now registered
    Registered,
    /// Orders are waiting; a reminder follows after the configured delay
    ReminderScheduled { pending: usize },
    Nothing,
}

pub struct PostServer {
    config: Config,
    manager: Arc<OrdersManager>,
    service: PostService,
    host: Arc<dyn GameHost>,
    load_report: LoadReport,
}

impl std::fmt::Debug for PostServer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PostServer")
            .field("config", &self.config)
            .field("manager", &self.manager)
            .finish()
    }
}

impl PostServer {
    /// Open the ledger file named by `config` and build the service
    pub fn start(config: Config, host: Arc<dyn GameHost>) -> Result<Self> {
        let storage = Arc::new(JsonFileStorage::new(config.orders_path()));
        Self::start_with_storage(config, storage, host)
    }

    pub fn start_with_storage(
        config: Config,
        storage: Arc<dyn LedgerStorage>,
        host: Arc<dyn GameHost>,
    ) -> Result<Self> {
        let (manager, load_report) =
            OrdersManager::open(storage, config.repair_policy(), config.storage_policy())?;
        let manager = Arc::new(manager);
        let service = PostService::new(manager.clone(), host.clone());

        tracing::info!(
            max_storage = config.max_storage,
            auto_fix = config.auto_fix,
            "Post server started"
        );

        Ok(Self {
            config,
            manager,
            service,
            host,
            load_report,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn service(&self) -> &PostService {
        &self.service
    }

    pub fn manager(&self) -> &Arc<OrdersManager> {
        &self.manager
    }

    /// Repairs made by the most recent load
    pub fn load_report(&self) -> &LoadReport {
        &self.load_report
    }

    /// Register new players; remind known ones of waiting orders
    pub fn on_player_joined(&self, player: &str) -> JoinOutcome {
        if self.manager.add_player(player) {
            tracing::info!(player = %player, "New player registered on join");
            if let Err(e) = self.manager.save() {
                tracing::error!(error = %e, "Ledger save failed after registering player");
            }
            return JoinOutcome::Registered;
        }

        let pending = self.manager.get_order_ids_by_receiver(player).len();
        if pending == 0 {
            return JoinOutcome::Nothing;
        }

        self.schedule_reminder(player.to_string(), self.config.receive_tip_delay);
        JoinOutcome::ReminderScheduled { pending }
    }

    fn schedule_reminder(&self, player: String, delay: Duration) {
        let manager = self.manager.clone();
        let host = self.host.clone();

        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                handle.spawn(async move {
                    tokio::time::sleep(delay).await;
                    send_reminder(&manager, host.as_ref(), &player);
                });
            }
            Err(_) => {
                tracing::debug!(player = %player, "No async runtime, sending reminder now");
                send_reminder(&manager, host.as_ref(), &player);
            }
        }
    }

    pub fn save(&self) -> Result<()> {
        self.manager.save()?;
        Ok(())
    }

    /// Reload the ledger from storage, replacing in-memory state
    pub fn reload(&mut self) -> Result<&LoadReport> {
        self.load_report = self.manager.load()?;
        Ok(&self.load_report)
    }

    /// Save on stop
    pub fn shutdown(self) -> Result<()> {
        self.manager.save()?;
        tracing::info!(orders = self.manager.get_orders().len(), "Post server stopped");
        Ok(())
    }
}

// Orders may have been taken while the reminder was waiting
fn send_reminder(manager: &OrdersManager, host: &dyn GameHost, player: &str) {
    let count = manager.get_order_ids_by_receiver(player).len();
    if count > 0 {
        host.notify(player, Notice::PendingOrders { count });
    }
}
