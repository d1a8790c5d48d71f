//! Load-time consistency pass
//!
//! Runs on the raw ledger file contents, before any index is built:
//!
//! ```text
//! LedgerData ──check──> OrderLedger ──rebuild──> OrderIndex
//! ```
//!
//! Every stored `(key, order)` pair must satisfy `key == order.id` (decimal,
//! id > 0) and the registered-player list must hold no duplicates.
//!
//! - Strict mode: the first violation aborts the load.
//! - Auto-fix mode: violations are logged and repaired. A mismatched entry
//!   is re-keyed under its embedded id. If that id is taken (or is 0) the
//!   entry is re-added under the smallest free id instead, once all
//!   re-keying is done. Duplicate players keep their first occurrence.

use super::ledger::OrderLedger;
use shared::order::{LedgerData, Order, OrderId};
use std::collections::{BTreeMap, HashSet};
use thiserror::Error;

/// Structural corruption found in a ledger file
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IntegrityError {
    #[error("Invalid order: stored under key {key:?} but carries id {id}")]
    InvalidOrder { key: String, id: OrderId },

    #[error("Invalid registered player list: duplicated {duplicates:?}")]
    InvalidRegisteredPlayerList { duplicates: Vec<String> },
}

/// Repair policy for the consistency pass
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RepairPolicy {
    /// Fail the load on any corruption
    #[default]
    Strict,
    /// Log and repair
    AutoFix,
}

impl RepairPolicy {
    pub fn from_auto_fix(auto_fix: bool) -> Self {
        if auto_fix { Self::AutoFix } else { Self::Strict }
    }
}

/// An entry that could not keep its embedded id
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reassignment {
    pub key: String,
    pub old_id: OrderId,
    pub new_id: OrderId,
}

/// What the consistency pass repaired
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadReport {
    /// `(stored key, embedded id)` pairs moved under their embedded id
    pub rekeyed: Vec<(String, OrderId)>,
    pub reassigned: Vec<Reassignment>,
    /// Players removed as duplicates (one entry per removed copy)
    pub duplicate_players: Vec<String>,
}

impl LoadReport {
    pub fn is_clean(&self) -> bool {
        self.rekeyed.is_empty() && self.reassigned.is_empty() && self.duplicate_players.is_empty()
    }
}

/// Validate raw ledger contents and turn them into a ledger
pub fn check_ledger(
    data: LedgerData,
    policy: RepairPolicy,
) -> Result<(OrderLedger, LoadReport), IntegrityError> {
    let mut report = LoadReport::default();
    let players = check_players(data.players, policy, &mut report)?;

    let mut orders: BTreeMap<OrderId, Order> = BTreeMap::new();
    let mut broken: Vec<(String, Order)> = Vec::new();

    for (key, order) in data.orders {
        if order.id > 0 && key == order.id.to_string() {
            orders.insert(order.id, order);
            continue;
        }
        if policy == RepairPolicy::Strict {
            return Err(IntegrityError::InvalidOrder { key, id: order.id });
        }
        tracing::error!(key = %key, order_id = order.id, sender = %order.sender, receiver = %order.receiver, "Invalid order: key does not match id");
        broken.push((key, order));
    }

    // Valid entries are placed first, then every entry whose embedded id is
    // still unclaimed is re-keyed. Fresh ids go out only after that, so they
    // can never take an id a re-keyable entry carries.
    let mut unusable = Vec::new();
    for (key, order) in broken {
        if order.id > 0 && !orders.contains_key(&order.id) {
            tracing::warn!(key = %key, order_id = order.id, "Auto-fix: re-keyed order under its id");
            report.rekeyed.push((key, order.id));
            orders.insert(order.id, order);
        } else {
            unusable.push((key, order));
        }
    }

    for (key, mut order) in unusable {
        let new_id = smallest_free_id(&orders);
        tracing::warn!(key = %key, old_id = order.id, new_id, "Auto-fix: id unusable, order re-added under a new id");
        report.reassigned.push(Reassignment {
            key,
            old_id: order.id,
            new_id,
        });
        order.id = new_id;
        orders.insert(new_id, order);
    }

    Ok((OrderLedger::from_parts(players, orders), report))
}

fn check_players(
    players: Vec<String>,
    policy: RepairPolicy,
    report: &mut LoadReport,
) -> Result<Vec<String>, IntegrityError> {
    let mut seen = HashSet::new();
    let mut unique = Vec::with_capacity(players.len());
    let mut duplicates = Vec::new();

    for player in players {
        if seen.contains(&player) {
            duplicates.push(player);
        } else {
            seen.insert(player.clone());
            unique.push(player);
        }
    }

    if duplicates.is_empty() {
        return Ok(unique);
    }
    if policy == RepairPolicy::Strict {
        return Err(IntegrityError::InvalidRegisteredPlayerList { duplicates });
    }

    tracing::error!(duplicates = ?duplicates, "Registered player list has duplicates");
    tracing::warn!(removed = duplicates.len(), "Auto-fix: duplicate players removed");
    report.duplicate_players = duplicates;
    Ok(unique)
}

fn smallest_free_id(orders: &BTreeMap<OrderId, Order>) -> OrderId {
    let mut candidate = 1;
    while orders.contains_key(&candidate) {
        candidate += 1;
    }
    candidate
}

#[cfg(test)]
mod tests {
    use super::*;

    fn order(id: OrderId, sender: &str) -> Order {
        Order {
            id,
            sender: sender.to_string(),
            receiver: "bob".to_string(),
            item: "minecraft:torch 16".to_string(),
            comment: "no comment".to_string(),
            created_at: "2024-01-01 00:00:00".to_string(),
        }
    }

    fn data(entries: &[(&str, Order)]) -> LedgerData {
        LedgerData {
            players: vec!["alice".to_string(), "bob".to_string()],
            orders: entries
                .iter()
                .map(|(k, o)| (k.to_string(), o.clone()))
                .collect(),
        }
    }

    #[test]
    fn test_clean_ledger_passes() {
        let raw = data(&[("1", order(1, "alice")), ("3", order(3, "alice"))]);
        let (ledger, report) = check_ledger(raw, RepairPolicy::Strict).unwrap();
        assert!(report.is_clean());
        assert_eq!(ledger.len(), 2);
        assert!(ledger.contains(1) && ledger.contains(3));
    }

    #[test]
    fn test_strict_rejects_mismatch() {
        let raw = data(&[("5", order(6, "alice"))]);
        let err = check_ledger(raw, RepairPolicy::Strict).unwrap_err();
        assert_eq!(
            err,
            IntegrityError::InvalidOrder {
                key: "5".to_string(),
                id: 6
            }
        );
    }

    #[test]
    fn test_auto_fix_rekeys() {
        let raw = data(&[("5", order(6, "alice"))]);
        let (ledger, report) = check_ledger(raw, RepairPolicy::AutoFix).unwrap();

        assert!(ledger.contains(6));
        assert!(!ledger.contains(5));
        assert_eq!(report.rekeyed, vec![("5".to_string(), 6)]);
        assert!(ledger.to_data().orders.contains_key("6"));
    }

    #[test]
    fn test_non_canonical_key_is_a_mismatch() {
        let raw = data(&[("07", order(7, "alice"))]);
        assert!(check_ledger(raw.clone(), RepairPolicy::Strict).is_err());

        let (ledger, report) = check_ledger(raw, RepairPolicy::AutoFix).unwrap();
        assert!(ledger.contains(7));
        assert_eq!(report.rekeyed.len(), 1);
    }

    #[test]
    fn test_auto_fix_collision_reassigns() {
        // "2" is valid; "9" claims id 2 as well
        let raw = data(&[("2", order(2, "alice")), ("9", order(2, "carol"))]);
        let (ledger, report) = check_ledger(raw, RepairPolicy::AutoFix).unwrap();

        assert_eq!(ledger.get(2).unwrap().sender, "alice");
        assert_eq!(ledger.get(1).unwrap().sender, "carol");
        assert_eq!(ledger.get(1).unwrap().id, 1);
        assert_eq!(
            report.reassigned,
            vec![Reassignment {
                key: "9".to_string(),
                old_id: 2,
                new_id: 1
            }]
        );
    }

    #[test]
    fn test_fresh_ids_skip_rekeyable_entries() {
        // "a" needs a fresh id; "b" only has a bad key and keeps id 1
        let raw = data(&[("a", order(0, "alice")), ("b", order(1, "carol"))]);
        let (ledger, report) = check_ledger(raw, RepairPolicy::AutoFix).unwrap();

        assert_eq!(report.rekeyed, vec![("b".to_string(), 1)]);
        assert_eq!(
            report.reassigned,
            vec![Reassignment {
                key: "a".to_string(),
                old_id: 0,
                new_id: 2
            }]
        );
        assert_eq!(ledger.get(1).unwrap().sender, "carol");
        assert_eq!(ledger.get(2).unwrap().sender, "alice");
    }

    #[test]
    fn test_zero_id_is_corrupt() {
        let raw = data(&[("0", order(0, "alice"))]);
        assert!(check_ledger(raw.clone(), RepairPolicy::Strict).is_err());

        let (ledger, report) = check_ledger(raw, RepairPolicy::AutoFix).unwrap();
        assert!(ledger.contains(1));
        assert_eq!(report.reassigned[0].new_id, 1);
    }

    #[test]
    fn test_duplicate_players() {
        let raw = LedgerData {
            players: vec![
                "alice".to_string(),
                "bob".to_string(),
                "alice".to_string(),
            ],
            orders: BTreeMap::new(),
        };

        let err = check_ledger(raw.clone(), RepairPolicy::Strict).unwrap_err();
        assert!(matches!(err, IntegrityError::InvalidRegisteredPlayerList { .. }));

        let (ledger, report) = check_ledger(raw, RepairPolicy::AutoFix).unwrap();
        assert_eq!(ledger.players(), &["alice".to_string(), "bob".to_string()]);
        assert_eq!(report.duplicate_players, vec!["alice".to_string()]);
    }
}
