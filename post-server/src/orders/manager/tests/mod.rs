use super::*;
use crate::orders::integrity::IntegrityError;
use crate::orders::storage::MemoryStorage;
use shared::order::LedgerData;
use std::collections::HashMap;

mod test_invariants;
mod test_load;

fn create_test_manager(max_storage: i64) -> (OrdersManager, Arc<MemoryStorage>) {
    create_manager_with(LedgerData::default(), RepairPolicy::Strict, max_storage)
}

fn create_manager_with(
    data: LedgerData,
    repair: RepairPolicy,
    max_storage: i64,
) -> (OrdersManager, Arc<MemoryStorage>) {
    let storage = Arc::new(MemoryStorage::with_data(data));
    let (manager, _) =
        OrdersManager::open(storage.clone(), repair, StoragePolicy::new(max_storage)).unwrap();
    (manager, storage)
}

fn request(sender: &str, receiver: &str) -> NewOrderRequest {
    NewOrderRequest::new(
        sender,
        receiver,
        format!("minecraft:paper 1 from {}", sender),
        None,
        "2024-03-01 08:00:00",
    )
}

fn stored_order(id: OrderId, sender: &str, receiver: &str) -> Order {
    request(sender, receiver).into_order(id)
}

// ========================================================================
// Helper: index/ledger agreement
// ========================================================================

/// Every live id appears exactly once in its sender's and receiver's list,
/// and the indices hold nothing else.
fn assert_indices_agree(manager: &OrdersManager) {
    let state = manager.state.read();

    let mut sent: HashMap<&str, Vec<OrderId>> = HashMap::new();
    let mut received: HashMap<&str, Vec<OrderId>> = HashMap::new();
    for order in state.ledger.orders() {
        sent.entry(order.sender.as_str()).or_default().push(order.id);
        received.entry(order.receiver.as_str()).or_default().push(order.id);
    }

    for (player, ids) in &sent {
        let mut indexed = state.index.sent_by(player).to_vec();
        indexed.sort_unstable();
        assert_eq!(&indexed, ids, "sender index for {player}");
    }
    for (player, ids) in &received {
        let mut indexed = state.index.addressed_to(player).to_vec();
        indexed.sort_unstable();
        assert_eq!(&indexed, ids, "receiver index for {player}");
    }

    let live = state.ledger.len();
    assert_eq!(state.index.sizes(), (live, live), "stale index entries");
}
