//! Ledger store access.
//!
//! Entries are write-once. This module only ever inserts and selects;
//! nothing in the crate updates or deletes a ledger row.

use crate::entities::ledger_entry::{self, Direction, Entity as LedgerEntry, EntryKind};
use crate::projection::HolderScope;
use chrono::Utc;
use sea_orm::{ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter, QueryOrder, Set};
use uuid::Uuid;

/// Reference to the operation record an entry belongs to
#[derive(Debug, Clone)]
pub struct EntryRef {
    pub reference_type: &'static str,
    pub reference_id: String,
}

impl EntryRef {
    pub fn distribution(id: Uuid) -> Self {
        Self {
            reference_type: "Distribution",
            reference_id: id.to_string(),
        }
    }

    pub fn stock_assignment(id: Uuid) -> Self {
        Self {
            reference_type: "StockAssignment",
            reference_id: id.to_string(),
        }
    }

    pub fn damage_report(request_id: &str) -> Self {
        Self {
            reference_type: "DamageReport",
            reference_id: request_id.to_string(),
        }
    }
}

/// Builds one ledger row. `quantity` must already be validated positive.
///
/// `created_at` is set here rather than left to the save hook because batch
/// inserts bypass `ActiveModelBehavior`.
pub fn new_entry(
    item_id: Uuid,
    kind: EntryKind,
    direction: Direction,
    quantity: i32,
    performed_by: Uuid,
    reference: Option<&EntryRef>,
) -> ledger_entry::ActiveModel {
    ledger_entry::ActiveModel {
        id: Set(Uuid::new_v4()),
        item_id: Set(item_id),
        kind: Set(kind),
        direction: Set(direction),
        quantity: Set(quantity),
        reference_type: Set(reference.map(|r| r.reference_type.to_string())),
        reference_id: Set(reference.map(|r| r.reference_id.clone())),
        performed_by: Set(performed_by),
        created_at: Set(Utc::now()),
    }
}

/// Appends a batch of rows in one statement
pub async fn append_all<C>(
    conn: &C,
    entries: Vec<ledger_entry::ActiveModel>,
) -> Result<(), DbErr>
where
    C: ConnectionTrait,
{
    if entries.is_empty() {
        return Ok(());
    }
    LedgerEntry::insert_many(entries).exec(conn).await?;
    Ok(())
}

/// Fetches the entries that can contribute to `scope`, oldest first,
/// optionally narrowed to one item
pub async fn entries_for_scope<C>(
    conn: &C,
    scope: HolderScope,
    item_id: Option<Uuid>,
) -> Result<Vec<ledger_entry::Model>, DbErr>
where
    C: ConnectionTrait,
{
    let mut query =
        LedgerEntry::find().filter(ledger_entry::Column::Kind.is_in(scope.kinds().iter().copied()));

    if let HolderScope::Volunteer(volunteer_id) = scope {
        query = query.filter(ledger_entry::Column::PerformedBy.eq(volunteer_id));
    }
    if let Some(item_id) = item_id {
        query = query.filter(ledger_entry::Column::ItemId.eq(item_id));
    }

    query
        .order_by_asc(ledger_entry::Column::CreatedAt)
        .all(conn)
        .await
}

/// Fetches every entry touching one item regardless of scope. Used by the
/// deactivation guard, which must see all holders at once.
pub async fn entries_for_item<C>(
    conn: &C,
    item_id: Uuid,
) -> Result<Vec<ledger_entry::Model>, DbErr>
where
    C: ConnectionTrait,
{
    LedgerEntry::find()
        .filter(ledger_entry::Column::ItemId.eq(item_id))
        .order_by_asc(ledger_entry::Column::CreatedAt)
        .all(conn)
        .await
}

/// Looks up an entry by its reference key. Damage reports use this for
/// duplicate-request detection.
pub async fn find_by_reference<C>(
    conn: &C,
    kind: EntryKind,
    reference_id: &str,
) -> Result<Option<ledger_entry::Model>, DbErr>
where
    C: ConnectionTrait,
{
    LedgerEntry::find()
        .filter(ledger_entry::Column::Kind.eq(kind))
        .filter(ledger_entry::Column::ReferenceId.eq(reference_id))
        .one(conn)
        .await
}
