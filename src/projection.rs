//! Stock projection engine.
//!
//! Current stock is never stored. It is always the result of folding the
//! ledger for one holder scope, so replaying the same entries always yields
//! the same balances.

use crate::entities::ledger_entry::{Direction, EntryKind, Model as LedgerEntry};
use std::collections::HashMap;
use uuid::Uuid;

/// Whose shelf a balance is computed for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HolderScope {
    /// The central warehouse
    Central,
    /// One field volunteer's in-hand stock
    Volunteer(Uuid),
}

impl HolderScope {
    /// Entry kinds that can contribute to this scope. Used to narrow the
    /// ledger query; `signed_quantity` remains the authority on whether a
    /// fetched entry actually counts.
    pub fn kinds(&self) -> &'static [EntryKind] {
        match self {
            HolderScope::Central => &[
                EntryKind::StockIn,
                EntryKind::IssueToField,
                EntryKind::ReturnToCentral,
                EntryKind::Adjustment,
            ],
            HolderScope::Volunteer(_) => &[
                EntryKind::IssueToField,
                EntryKind::Distribute,
                EntryKind::Damage,
                EntryKind::ReturnToCentral,
            ],
        }
    }
}

/// Signed contribution of one entry to one scope, or `None` when the entry
/// does not belong to the scope at all.
///
/// Scoping is by `(kind, direction)`: an ISSUE_TO_FIELD pair writes an OUT
/// row against central and an IN row against the volunteer, and each row
/// counts in exactly one scope. A kind-only filter would let the pair cancel
/// inside the central fold.
pub fn signed_quantity(scope: HolderScope, entry: &LedgerEntry) -> Option<i64> {
    let q = i64::from(entry.quantity);
    match scope {
        HolderScope::Central => match (entry.kind, entry.direction) {
            (EntryKind::StockIn, Direction::In) => Some(q),
            (EntryKind::IssueToField, Direction::Out) => Some(-q),
            (EntryKind::ReturnToCentral, Direction::In) => Some(q),
            (EntryKind::Adjustment, Direction::In) => Some(q),
            (EntryKind::Adjustment, Direction::Out) => Some(-q),
            _ => None,
        },
        HolderScope::Volunteer(v) => {
            if entry.performed_by != v {
                return None;
            }
            match (entry.kind, entry.direction) {
                (EntryKind::IssueToField, Direction::In) => Some(q),
                (EntryKind::Distribute, Direction::Out) => Some(-q),
                (EntryKind::Damage, Direction::Out) => Some(-q),
                (EntryKind::ReturnToCentral, Direction::Out) => Some(-q),
                _ => None,
            }
        }
    }
}

/// Folds entries into a map of item id to signed balance for one scope.
/// Items with no contributing entries are absent from the result. Negative
/// balances are returned as-is; read handlers decide how to present them.
pub fn project<'a, I>(scope: HolderScope, entries: I) -> HashMap<Uuid, i64>
where
    I: IntoIterator<Item = &'a LedgerEntry>,
{
    let mut balances: HashMap<Uuid, i64> = HashMap::new();
    for entry in entries {
        if let Some(delta) = signed_quantity(scope, entry) {
            *balances.entry(entry.item_id).or_insert(0) += delta;
        }
    }
    balances
}

/// Balance of a single item under a scope
pub fn project_item<'a, I>(scope: HolderScope, item_id: Uuid, entries: I) -> i64
where
    I: IntoIterator<Item = &'a LedgerEntry>,
{
    entries
        .into_iter()
        .filter(|e| e.item_id == item_id)
        .filter_map(|e| signed_quantity(scope, e))
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use proptest::prelude::*;

    fn entry(
        item_id: Uuid,
        kind: EntryKind,
        direction: Direction,
        quantity: i32,
        performed_by: Uuid,
    ) -> LedgerEntry {
        LedgerEntry {
            id: Uuid::new_v4(),
            item_id,
            kind,
            direction,
            quantity,
            reference_type: None,
            reference_id: None,
            performed_by,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn stock_in_raises_central_only() {
        let item = Uuid::new_v4();
        let admin = Uuid::new_v4();
        let e = entry(item, EntryKind::StockIn, Direction::In, 50, admin);

        assert_eq!(signed_quantity(HolderScope::Central, &e), Some(50));
        assert_eq!(signed_quantity(HolderScope::Volunteer(admin), &e), None);
    }

    #[test]
    fn issue_pair_moves_stock_without_cancelling() {
        let item = Uuid::new_v4();
        let admin = Uuid::new_v4();
        let vol = Uuid::new_v4();
        let entries = vec![
            entry(item, EntryKind::StockIn, Direction::In, 50, admin),
            entry(item, EntryKind::IssueToField, Direction::Out, 20, admin),
            entry(item, EntryKind::IssueToField, Direction::In, 20, vol),
        ];

        let central = project(HolderScope::Central, &entries);
        let volunteer = project(HolderScope::Volunteer(vol), &entries);

        assert_eq!(central.get(&item), Some(&30));
        assert_eq!(volunteer.get(&item), Some(&20));
    }

    #[test]
    fn example_scenario_balances() {
        let rice = Uuid::new_v4();
        let admin = Uuid::new_v4();
        let vol = Uuid::new_v4();
        let entries = vec![
            entry(rice, EntryKind::StockIn, Direction::In, 50, admin),
            entry(rice, EntryKind::IssueToField, Direction::Out, 20, admin),
            entry(rice, EntryKind::IssueToField, Direction::In, 20, vol),
            entry(rice, EntryKind::Distribute, Direction::Out, 5, vol),
            entry(rice, EntryKind::Damage, Direction::Out, 3, vol),
        ];

        assert_eq!(project_item(HolderScope::Central, rice, &entries), 30);
        assert_eq!(project_item(HolderScope::Volunteer(vol), rice, &entries), 12);
    }

    #[test]
    fn return_to_central_reverses_the_issue_pair() {
        let item = Uuid::new_v4();
        let admin = Uuid::new_v4();
        let vol = Uuid::new_v4();
        let entries = vec![
            entry(item, EntryKind::StockIn, Direction::In, 10, admin),
            entry(item, EntryKind::IssueToField, Direction::Out, 10, admin),
            entry(item, EntryKind::IssueToField, Direction::In, 10, vol),
            entry(item, EntryKind::ReturnToCentral, Direction::Out, 4, vol),
            entry(item, EntryKind::ReturnToCentral, Direction::In, 4, admin),
        ];

        assert_eq!(project_item(HolderScope::Central, item, &entries), 4);
        assert_eq!(project_item(HolderScope::Volunteer(vol), item, &entries), 6);
    }

    #[test]
    fn other_volunteers_entries_do_not_leak() {
        let item = Uuid::new_v4();
        let vol_a = Uuid::new_v4();
        let vol_b = Uuid::new_v4();
        let entries = vec![
            entry(item, EntryKind::IssueToField, Direction::In, 7, vol_a),
            entry(item, EntryKind::IssueToField, Direction::In, 9, vol_b),
        ];

        assert_eq!(project_item(HolderScope::Volunteer(vol_a), item, &entries), 7);
        assert_eq!(project_item(HolderScope::Volunteer(vol_b), item, &entries), 9);
    }

    #[test]
    fn untouched_items_are_absent() {
        let entries: Vec<LedgerEntry> = vec![];
        assert!(project(HolderScope::Central, &entries).is_empty());
    }

    fn arb_kind() -> impl Strategy<Value = EntryKind> {
        prop_oneof![
            Just(EntryKind::StockIn),
            Just(EntryKind::IssueToField),
            Just(EntryKind::Distribute),
            Just(EntryKind::Damage),
            Just(EntryKind::Adjustment),
            Just(EntryKind::ReturnToCentral),
        ]
    }

    fn arb_direction() -> impl Strategy<Value = Direction> {
        prop_oneof![Just(Direction::In), Just(Direction::Out)]
    }

    proptest! {
        /// An entry contributes to at most one of central/its-actor scope,
        /// never both.
        #[test]
        fn scopes_are_disjoint(
            kind in arb_kind(),
            direction in arb_direction(),
            quantity in 1..10_000i32,
        ) {
            let item = Uuid::new_v4();
            let actor = Uuid::new_v4();
            let e = entry(item, kind, direction, quantity, actor);

            let central = signed_quantity(HolderScope::Central, &e);
            let volunteer = signed_quantity(HolderScope::Volunteer(actor), &e);
            prop_assert!(central.is_none() || volunteer.is_none());
        }

        /// An issue pair conserves total stock across central plus volunteer.
        #[test]
        fn assignment_conserves_total(
            initial in 1..10_000i32,
            moved in 1..10_000i32,
        ) {
            prop_assume!(moved <= initial);
            let item = Uuid::new_v4();
            let admin = Uuid::new_v4();
            let vol = Uuid::new_v4();
            let entries = vec![
                entry(item, EntryKind::StockIn, Direction::In, initial, admin),
                entry(item, EntryKind::IssueToField, Direction::Out, moved, admin),
                entry(item, EntryKind::IssueToField, Direction::In, moved, vol),
            ];

            let central = project_item(HolderScope::Central, item, &entries);
            let volunteer = project_item(HolderScope::Volunteer(vol), item, &entries);
            prop_assert_eq!(central + volunteer, i64::from(initial));
        }

        /// Folding is order-insensitive: balances are sums, not sequences.
        #[test]
        fn fold_is_order_insensitive(
            rows in proptest::collection::vec(
                (arb_kind(), arb_direction(), 1..1_000i32),
                0..32,
            ),
        ) {
            let item = Uuid::new_v4();
            let actor = Uuid::new_v4();
            let mut entries: Vec<LedgerEntry> = rows
                .into_iter()
                .map(|(kind, direction, q)| entry(item, kind, direction, q, actor))
                .collect();

            let forward = project_item(HolderScope::Central, item, &entries);
            entries.reverse();
            let reversed = project_item(HolderScope::Central, item, &entries);
            prop_assert_eq!(forward, reversed);
        }
    }
}
