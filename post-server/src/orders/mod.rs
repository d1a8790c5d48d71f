//! Order ledger module
//!
//! - **ledger**: id → order store and the registered-player set
//! - **index**: sender/receiver → order id lists, derived from the ledger
//! - **integrity**: load-time consistency pass (strict or auto-fix)
//! - **quota**: per-sender outstanding-order limit
//! - **storage**: whole-ledger load/save (JSON file)
//! - **manager**: all of the above behind one lock
//!
//! # Data Flow
//!
//! ```text
//! storage.load() → check_ledger() → OrderIndex::rebuild() → serve
//!                                                             ↓
//!                         add / remove / pop (ledger + both indices)
//!                                                             ↓
//!                                                     storage.save()
//! ```

pub mod index;
pub mod integrity;
pub mod ledger;
pub mod manager;
pub mod quota;
pub mod storage;

// Re-exports
pub use index::OrderIndex;
pub use integrity::{IntegrityError, LoadReport, Reassignment, RepairPolicy};
pub use ledger::OrderLedger;
pub use manager::{ManagerError, ManagerResult, OrdersManager, Party};
pub use quota::StoragePolicy;
pub use storage::{JsonFileStorage, LedgerStorage, StorageError};

pub use shared::order::{LedgerData, NewOrderRequest, Order, OrderId};
