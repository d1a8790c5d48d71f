use super::*;


fn corrupted_data() -> LedgerData {
    let mut data = LedgerData {
        players: vec!["alice".to_string(), "bob".to_string()],
        ..Default::default()
    };
    data.orders.insert("1".to_string(), stored_order(1, "alice", "bob"));
    data.orders.insert("5".to_string(), stored_order(6, "alice", "bob"));
    data
}


#[test]
fn test_strict_load_fails_on_mismatch() {
    let storage = Arc::new(MemoryStorage::with_data(corrupted_data()));
    let err = OrdersManager::open(storage.clone(), RepairPolicy::Strict, StoragePolicy::unlimited())
        .unwrap_err();

    match err {
        ManagerError::Integrity(IntegrityError::InvalidOrder { key, id }) => {
            assert_eq!(key, "5");
            assert_eq!(id, 6);
        }
        other => panic!("unexpected error: {other}"),
    }
    // nothing written back
    assert_eq!(storage.save_count(), 0);
}


#[test]
fn test_auto_fix_load_rekeys_and_saves() {
    let (manager, storage) = create_manager_with(corrupted_data(), RepairPolicy::AutoFix, -1);

    assert!(manager.get_order(6).is_some());
    assert!(manager.get_order(5).is_none());
    assert_eq!(manager.get_order_ids_by_sender("alice"), vec![1, 6]);
    assert_indices_agree(&manager);

    assert_eq!(storage.save_count(), 1);
    let saved = storage.data();
    assert!(saved.orders.contains_key("6"));
    assert!(!saved.orders.contains_key("5"));
    assert_eq!(manager.get_next_id(), 2);
}


#[test]
fn test_failed_reload_keeps_current_state() {
    let (manager, storage) = create_test_manager(-1);
    manager.add_order(request("alice", "bob"));

    // storage now holds a corrupted ledger
    storage.save(&corrupted_data()).unwrap();
    assert!(manager.load().is_err());
    assert_eq!(manager.get_orders().len(), 1);
    assert_eq!(manager.get_order(1).unwrap().receiver, "bob");
}


#[test]
fn test_repair_save_failure_keeps_current_state() {
    let (manager, storage) = create_manager_with(LedgerData::default(), RepairPolicy::AutoFix, -1);
    manager.add_order(request("alice", "carol"));

    storage.save(&corrupted_data()).unwrap();
    storage.set_fail_saves(true);

    let err = manager.load().unwrap_err();
    assert!(matches!(err, ManagerError::Storage(_)));
    assert_eq!(manager.get_orders().len(), 1);
    assert_eq!(manager.get_order(1).unwrap().receiver, "carol");
    assert!(manager.get_order(6).is_none());
    assert_indices_agree(&manager);

    storage.set_fail_saves(false);
    assert_eq!(manager.load().unwrap().rekeyed, vec![("5".to_string(), 6)]);
    assert!(manager.get_order(6).is_some());
}


#[test]
fn test_reload_rebuilds_indices() {
    let (manager, storage) = create_test_manager(-1);
    manager.add_order(request("alice", "bob"));
    manager.save().unwrap();

    let mut data = storage.data();
    data.orders.insert("2".to_string(), stored_order(2, "carol", "bob"));
    storage.save(&data).unwrap();

    let report = manager.load().unwrap();
    assert!(report.is_clean());
    assert_eq!(manager.get_order_ids_by_receiver("bob"), vec![1, 2]);
    assert_eq!(manager.get_order_ids_by_sender("carol"), vec![2]);
    assert_indices_agree(&manager);
}


#[test]
fn test_save_round_trip() {
    let (manager, storage) = create_test_manager(-1);
    manager.add_player("alice");
    manager.add_player("bob");
    manager.add_order(request("alice", "bob"));
    manager.add_order(request("bob", "alice"));
    manager.add_order(request("alice", "carol"));
    manager.remove_order(2);
    manager.save().unwrap();

    let (reloaded, report) = OrdersManager::open(
        Arc::new(MemoryStorage::with_data(storage.data())),
        RepairPolicy::Strict,
        StoragePolicy::unlimited(),
    )
    .unwrap();

    assert!(report.is_clean());
    assert_eq!(reloaded.get_orders(), manager.get_orders());
    assert_eq!(reloaded.get_players(), manager.get_players());
    assert_eq!(reloaded.state.read().index, manager.state.read().index);
}
