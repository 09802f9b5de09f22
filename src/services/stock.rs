use super::{
    active_volunteer, aggregate_lines, ensure_active_items, ensure_sufficient, volunteer, LineItem,
};
use crate::db;
use crate::entities::item;
use crate::entities::ledger_entry::{Direction, EntryKind};
use crate::entities::{stock_assignment, stock_assignment_item};
use crate::errors::ServiceError;
use crate::events::{Event, EventSender};
use crate::ledger::{self, EntryRef};
use crate::projection::{self, HolderScope};
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set};
use serde::Serialize;
use std::sync::Arc;
use tracing::{info, instrument, warn};
use utoipa::ToSchema;
use uuid::Uuid;

/// One item's projected balance, joined with its directory entry
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct StockLevel {
    pub item_id: Uuid,
    pub name: String,
    pub unit: String,
    pub quantity: i64,
}

/// Projections plus the admin-side transfer operations (add, assign, return)
#[derive(Clone)]
pub struct StockService {
    db: Arc<DatabaseConnection>,
    event_sender: EventSender,
}

impl StockService {
    pub fn new(db: Arc<DatabaseConnection>, event_sender: EventSender) -> Self {
        Self { db, event_sender }
    }

    /// Central warehouse balances, optionally narrowed to one item
    pub async fn central_stock(
        &self,
        item_id: Option<Uuid>,
    ) -> Result<Vec<StockLevel>, ServiceError> {
        self.stock_for_scope(HolderScope::Central, item_id).await
    }

    /// One volunteer's in-hand balances. Signed values; a negative balance
    /// means the ledger recorded more going out than was ever issued.
    /// Readable for inactive volunteers too, so their shelf stays auditable.
    pub async fn volunteer_stock(&self, volunteer_id: Uuid) -> Result<Vec<StockLevel>, ServiceError> {
        use crate::entities::user;

        let volunteer = user::Entity::find_by_id(volunteer_id)
            .one(self.db.as_ref())
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("User {} not found", volunteer_id)))?;
        if volunteer.role != user::UserRole::Volunteer {
            return Err(ServiceError::BadRequest(format!(
                "User {} is not a volunteer",
                volunteer_id
            )));
        }

        let levels = self
            .stock_for_scope(HolderScope::Volunteer(volunteer_id), None)
            .await?;
        for level in &levels {
            if level.quantity < 0 {
                warn!(
                    %volunteer_id,
                    item_id = %level.item_id,
                    quantity = level.quantity,
                    "negative volunteer balance in ledger"
                );
            }
        }

        Ok(levels)
    }

    async fn stock_for_scope(
        &self,
        scope: HolderScope,
        item_id: Option<Uuid>,
    ) -> Result<Vec<StockLevel>, ServiceError> {
        let entries = ledger::entries_for_scope(self.db.as_ref(), scope, item_id).await?;
        let balances = projection::project(scope, &entries);

        if balances.is_empty() {
            return Ok(Vec::new());
        }

        let items = item::Entity::find()
            .filter(item::Column::Id.is_in(balances.keys().copied()))
            .all(self.db.as_ref())
            .await?;

        let mut levels: Vec<StockLevel> = items
            .into_iter()
            .filter_map(|m| {
                balances.get(&m.id).map(|q| StockLevel {
                    item_id: m.id,
                    name: m.name,
                    unit: m.unit,
                    quantity: *q,
                })
            })
            .collect();
        levels.sort_by(|a, b| a.name.cmp(&b.name));

        Ok(levels)
    }

    /// Receives goods into the central warehouse
    #[instrument(skip(self))]
    pub async fn add_stock(
        &self,
        admin_id: Uuid,
        item_id: Uuid,
        quantity: i32,
    ) -> Result<(), ServiceError> {
        if quantity <= 0 {
            return Err(ServiceError::BadRequest(
                "Quantity must be positive".to_string(),
            ));
        }

        db::atomic(self.db.as_ref(), move |txn| {
            Box::pin(async move {
                ensure_active_items(txn, &[item_id]).await?;
                ledger::append_all(
                    txn,
                    vec![ledger::new_entry(
                        item_id,
                        EntryKind::StockIn,
                        Direction::In,
                        quantity,
                        admin_id,
                        None,
                    )],
                )
                .await?;
                Ok(())
            })
        })
        .await?;

        info!(%item_id, quantity, %admin_id, "stock added to central");
        self.event_sender
            .notify(Event::StockAdded {
                item_id,
                quantity,
                performed_by: admin_id,
            })
            .await;

        Ok(())
    }

    /// Hands central stock to a volunteer. Writes an assignment record plus
    /// one OUT/IN ledger pair per line, all in one transaction.
    #[instrument(skip(self, lines))]
    pub async fn assign_stock(
        &self,
        admin_id: Uuid,
        volunteer_id: Uuid,
        lines: &[LineItem],
    ) -> Result<Uuid, ServiceError> {
        let needs = aggregate_lines(lines)?;

        let assignment_id = db::atomic(self.db.as_ref(), move |txn| {
            Box::pin(async move {
                ensure_active_items(txn, &need_ids(&needs)).await?;
                active_volunteer(txn, volunteer_id).await?;
                ensure_sufficient(txn, HolderScope::Central, &needs).await?;

                let assignment_id = Uuid::new_v4();
                stock_assignment::ActiveModel {
                    id: Set(assignment_id),
                    volunteer_id: Set(volunteer_id),
                    assigned_by: Set(admin_id),
                    ..Default::default()
                }
                .insert(txn)
                .await?;

                let line_rows: Vec<stock_assignment_item::ActiveModel> = needs
                    .iter()
                    .map(|(item_id, quantity)| stock_assignment_item::ActiveModel {
                        id: Set(Uuid::new_v4()),
                        assignment_id: Set(assignment_id),
                        item_id: Set(*item_id),
                        quantity: Set(*quantity),
                    })
                    .collect();
                stock_assignment_item::Entity::insert_many(line_rows)
                    .exec(txn)
                    .await?;

                let reference = EntryRef::stock_assignment(assignment_id);
                let mut entries = Vec::with_capacity(needs.len() * 2);
                for (item_id, quantity) in &needs {
                    entries.push(ledger::new_entry(
                        *item_id,
                        EntryKind::IssueToField,
                        Direction::Out,
                        *quantity,
                        admin_id,
                        Some(&reference),
                    ));
                    entries.push(ledger::new_entry(
                        *item_id,
                        EntryKind::IssueToField,
                        Direction::In,
                        *quantity,
                        volunteer_id,
                        Some(&reference),
                    ));
                }
                ledger::append_all(txn, entries).await?;

                Ok(assignment_id)
            })
        })
        .await?;

        info!(%assignment_id, %volunteer_id, %admin_id, "stock assigned to volunteer");
        self.event_sender
            .notify(Event::StockAssigned {
                assignment_id,
                volunteer_id,
                line_count: lines.len(),
            })
            .await;

        Ok(assignment_id)
    }

    /// Takes unused goods back from a volunteer into central. Reverse of an
    /// assignment: one OUT/IN pair per line, the volunteer as the OUT actor.
    /// Unlike Assign, an inactive volunteer is fine here; their shelf must
    /// stay reclaimable after deactivation.
    #[instrument(skip(self, lines))]
    pub async fn return_stock(
        &self,
        admin_id: Uuid,
        volunteer_id: Uuid,
        lines: &[LineItem],
    ) -> Result<(), ServiceError> {
        let needs = aggregate_lines(lines)?;
        let line_count = lines.len();

        db::atomic(self.db.as_ref(), move |txn| {
            Box::pin(async move {
                ensure_active_items(txn, &need_ids(&needs)).await?;
                volunteer(txn, volunteer_id).await?;
                ensure_sufficient(txn, HolderScope::Volunteer(volunteer_id), &needs).await?;

                let mut entries = Vec::with_capacity(needs.len() * 2);
                for (item_id, quantity) in &needs {
                    entries.push(ledger::new_entry(
                        *item_id,
                        EntryKind::ReturnToCentral,
                        Direction::Out,
                        *quantity,
                        volunteer_id,
                        None,
                    ));
                    entries.push(ledger::new_entry(
                        *item_id,
                        EntryKind::ReturnToCentral,
                        Direction::In,
                        *quantity,
                        admin_id,
                        None,
                    ));
                }
                ledger::append_all(txn, entries).await?;

                Ok(())
            })
        })
        .await?;

        info!(%volunteer_id, %admin_id, "stock returned to central");
        self.event_sender
            .notify(Event::StockReturned {
                volunteer_id,
                line_count,
            })
            .await;

        Ok(())
    }
}

fn need_ids(needs: &[(Uuid, i32)]) -> Vec<Uuid> {
    needs.iter().map(|(id, _)| *id).collect()
}
