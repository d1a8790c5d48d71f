//! Randomised operation sequences
//!
//! A plain model (`BTreeMap<id, (sender, receiver)>`) is driven alongside
//! the manager; after every step both must agree and the indices must
//! match the ledger.

use super::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::BTreeMap;

const PLAYERS: &[&str] = &["alice", "bob", "carol", "dave"];
const STEPS: usize = 400;

fn smallest_free(model: &BTreeMap<OrderId, (String, String)>) -> OrderId {
    (1..).find(|id| !model.contains_key(id)).unwrap()
}

fn pick<'a>(rng: &mut StdRng, players: &[&'a str]) -> &'a str {
    players[rng.gen_range(0..players.len())]
}

fn run_sequence(seed: u64, max_storage: i64) {
    let mut rng = StdRng::seed_from_u64(seed);
    let (manager, _) = create_test_manager(max_storage);
    let mut model: BTreeMap<OrderId, (String, String)> = BTreeMap::new();

    for _ in 0..STEPS {
        match rng.gen_range(0..10) {
            // post
            0..=4 => {
                let sender = pick(&mut rng, PLAYERS);
                let receiver = pick(&mut rng, PLAYERS);
                let expected_id = smallest_free(&model);
                let outstanding = model.values().filter(|(s, _)| s == sender).count() as i64;

                match manager.try_add_order(request(sender, receiver)) {
                    Ok(id) => {
                        assert!(max_storage == -1 || outstanding < max_storage);
                        assert_eq!(id, expected_id, "seed {seed}: not the smallest free id");
                        assert!(!model.contains_key(&id), "seed {seed}: id {id} reused while live");
                        model.insert(id, (sender.to_string(), receiver.to_string()));
                    }
                    Err(ManagerError::QuotaExceeded { .. }) => {
                        assert!(outstanding >= max_storage);
                        assert_eq!(manager.get_next_id(), expected_id);
                    }
                    Err(e) => panic!("seed {seed}: unexpected error {e}"),
                }
            }
            // pop, live or not
            5..=6 => {
                let id = rng.gen_range(1..=model.len() as u64 + 2);
                match manager.pop_order(id) {
                    Ok(order) => {
                        let (sender, receiver) = model.remove(&id).unwrap();
                        assert_eq!(order.id, id);
                        assert_eq!(order.sender, sender);
                        assert_eq!(order.receiver, receiver);
                        assert!(matches!(
                            manager.pop_order(id),
                            Err(ManagerError::OrderNotFound(_))
                        ));
                    }
                    Err(ManagerError::OrderNotFound(_)) => assert!(!model.contains_key(&id)),
                    Err(e) => panic!("seed {seed}: unexpected error {e}"),
                }
            }
            // remove, live or not
            _ => {
                let id = rng.gen_range(1..=model.len() as u64 + 2);
                assert_eq!(manager.remove_order(id), model.remove(&id).is_some());
            }
        }

        assert_indices_agree(&manager);
        let live: Vec<OrderId> = manager.get_orders().iter().map(|o| o.id).collect();
        let expected: Vec<OrderId> = model.keys().copied().collect();
        assert_eq!(live, expected, "seed {seed}: ledger drifted from model");
    }
}


#[test]
fn test_random_sequences_unlimited() {
    for seed in 0..8 {
        run_sequence(seed, -1);
    }
}


#[test]
fn test_random_sequences_with_quota() {
    for seed in 100..108 {
        run_sequence(seed, 3);
    }
}


#[test]
fn test_random_sequences_survive_reload() {
    let mut rng = StdRng::seed_from_u64(7);
    let (manager, storage) = create_test_manager(-1);

    for _ in 0..60 {
        let sender = pick(&mut rng, PLAYERS);
        let receiver = pick(&mut rng, PLAYERS);
        manager.add_order(request(sender, receiver));
        if rng.gen_bool(0.3) {
            let id = rng.gen_range(1..=manager.get_orders().len() as u64);
            manager.remove_order(id);
        }
    }
    manager.save().unwrap();

    let (reloaded, _) = OrdersManager::open(
        Arc::new(MemoryStorage::with_data(storage.data())),
        RepairPolicy::Strict,
        StoragePolicy::unlimited(),
    )
    .unwrap();

    assert_eq!(reloaded.get_orders(), manager.get_orders());
    assert_indices_agree(&reloaded);
    for player in PLAYERS {
        let mut before = manager.get_order_ids_by_sender(player);
        let mut after = reloaded.get_order_ids_by_sender(player);
        before.sort_unstable();
        after.sort_unstable();
        assert_eq!(before, after);
    }
}
