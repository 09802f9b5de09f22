use crate::db;
use crate::entities::item;
use crate::errors::ServiceError;
use crate::events::{Event, EventSender};
use crate::ledger;
use crate::projection::{self, HolderScope};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{info, instrument};
use uuid::Uuid;

/// Input for creating or updating a directory item
#[derive(Debug, Clone)]
pub struct ItemInput {
    pub name: String,
    pub category: String,
    pub unit: String,
}

/// Item directory CRUD plus the guarded deactivation
#[derive(Clone)]
pub struct ItemService {
    db: Arc<DatabaseConnection>,
    event_sender: EventSender,
}

impl ItemService {
    pub fn new(db: Arc<DatabaseConnection>, event_sender: EventSender) -> Self {
        Self { db, event_sender }
    }

    #[instrument(skip(self, input), fields(name = %input.name))]
    pub async fn create(&self, input: ItemInput) -> Result<item::Model, ServiceError> {
        let existing = item::Entity::find()
            .filter(item::Column::Name.eq(input.name.as_str()))
            .one(self.db.as_ref())
            .await?;
        if existing.is_some() {
            return Err(ServiceError::Conflict(format!(
                "Item named '{}' already exists",
                input.name
            )));
        }

        let model = item::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(input.name),
            category: Set(input.category),
            unit: Set(input.unit),
            is_active: Set(true),
            ..Default::default()
        }
        .insert(self.db.as_ref())
        .await?;

        info!(item_id = %model.id, "item created");
        self.event_sender.notify(Event::ItemCreated(model.id)).await;

        Ok(model)
    }

    pub async fn get(&self, item_id: Uuid) -> Result<item::Model, ServiceError> {
        item::Entity::find_by_id(item_id)
            .one(self.db.as_ref())
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Item {} not found", item_id)))
    }

    /// Directory listing; `include_inactive` widens it past the active set
    pub async fn list(&self, include_inactive: bool) -> Result<Vec<item::Model>, ServiceError> {
        let mut query = item::Entity::find();
        if !include_inactive {
            query = query.filter(item::Column::IsActive.eq(true));
        }
        Ok(query.order_by_asc(item::Column::Name).all(self.db.as_ref()).await?)
    }

    /// Renames or recategorizes an item. Activity state changes only go
    /// through `deactivate`, which checks the ledger first.
    #[instrument(skip(self, input))]
    pub async fn update(&self, item_id: Uuid, input: ItemInput) -> Result<item::Model, ServiceError> {
        let existing = self.get(item_id).await?;

        let name_clash = item::Entity::find()
            .filter(item::Column::Name.eq(input.name.as_str()))
            .filter(item::Column::Id.ne(item_id))
            .one(self.db.as_ref())
            .await?;
        if name_clash.is_some() {
            return Err(ServiceError::Conflict(format!(
                "Item named '{}' already exists",
                input.name
            )));
        }

        let mut active: item::ActiveModel = existing.into();
        active.name = Set(input.name);
        active.category = Set(input.category);
        active.unit = Set(input.unit);

        Ok(active.update(self.db.as_ref()).await?)
    }

    /// Retires an item. Refused while any holder still shows stock for it,
    /// so the directory can never hide live balances.
    #[instrument(skip(self))]
    pub async fn deactivate(&self, item_id: Uuid) -> Result<item::Model, ServiceError> {
        let updated = db::atomic(self.db.as_ref(), move |txn| {
            Box::pin(async move {
                let existing = item::Entity::find_by_id(item_id)
                    .one(txn)
                    .await?
                    .ok_or_else(|| ServiceError::NotFound(format!("Item {} not found", item_id)))?;
                if !existing.is_active {
                    return Err(ServiceError::BadRequest(format!(
                        "Item {} is already inactive",
                        item_id
                    )));
                }

                let entries = ledger::entries_for_item(txn, item_id).await?;

                let central = projection::project_item(HolderScope::Central, item_id, &entries);
                if central != 0 {
                    return Err(ServiceError::BadRequest(format!(
                        "Cannot deactivate item {}: central stock is {}",
                        item_id, central
                    )));
                }

                let holders: HashSet<Uuid> = entries.iter().map(|e| e.performed_by).collect();
                for holder in holders {
                    let balance =
                        projection::project_item(HolderScope::Volunteer(holder), item_id, &entries);
                    if balance != 0 {
                        return Err(ServiceError::BadRequest(format!(
                            "Cannot deactivate item {}: volunteer {} still holds {}",
                            item_id, holder, balance
                        )));
                    }
                }

                let mut active: item::ActiveModel = existing.into();
                active.is_active = Set(false);
                Ok(active.update(txn).await?)
            })
        })
        .await?;

        info!(%item_id, "item deactivated");
        self.event_sender
            .notify(Event::ItemDeactivated(item_id))
            .await;

        Ok(updated)
    }
}
