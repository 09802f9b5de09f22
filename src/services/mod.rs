pub mod campaigns;
pub mod distributions;
pub mod items;
pub mod stock;
pub mod users;

use crate::entities::{item, user};
use crate::errors::ServiceError;
use crate::projection::{self, HolderScope};
use sea_orm::{ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use utoipa::ToSchema;
use uuid::Uuid;

/// One item/quantity pair of a transfer operation
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LineItem {
    pub item_id: Uuid,
    pub quantity: i32,
}

/// All service handles the handlers need
#[derive(Clone)]
pub struct AppServices {
    pub stock: Arc<stock::StockService>,
    pub distributions: Arc<distributions::DistributionService>,
    pub items: Arc<items::ItemService>,
    pub campaigns: Arc<campaigns::CampaignService>,
    pub users: Arc<users::UserService>,
}

/// Rejects non-positive quantities and merges duplicate item lines into one
pub(crate) fn aggregate_lines(lines: &[LineItem]) -> Result<Vec<(Uuid, i32)>, ServiceError> {
    if lines.is_empty() {
        return Err(ServiceError::BadRequest(
            "At least one item line is required".to_string(),
        ));
    }

    let mut merged: HashMap<Uuid, i64> = HashMap::new();
    for line in lines {
        if line.quantity <= 0 {
            return Err(ServiceError::BadRequest(format!(
                "Quantity for item {} must be positive",
                line.item_id
            )));
        }
        *merged.entry(line.item_id).or_insert(0) += i64::from(line.quantity);
    }

    merged
        .into_iter()
        .map(|(item_id, total)| {
            i32::try_from(total).map(|q| (item_id, q)).map_err(|_| {
                ServiceError::BadRequest(format!("Quantity for item {} overflows", item_id))
            })
        })
        .collect()
}

/// Loads the named items and checks each one exists and is active
pub(crate) async fn ensure_active_items<C>(
    conn: &C,
    item_ids: &[Uuid],
) -> Result<HashMap<Uuid, item::Model>, ServiceError>
where
    C: ConnectionTrait,
{
    let found = item::Entity::find()
        .filter(item::Column::Id.is_in(item_ids.iter().copied()))
        .all(conn)
        .await?;

    let by_id: HashMap<Uuid, item::Model> = found.into_iter().map(|m| (m.id, m)).collect();

    for id in item_ids {
        match by_id.get(id) {
            None => return Err(ServiceError::NotFound(format!("Item {} not found", id))),
            Some(m) if !m.is_active => {
                return Err(ServiceError::BadRequest(format!(
                    "Item {} ({}) is inactive",
                    id, m.name
                )))
            }
            Some(_) => {}
        }
    }

    Ok(by_id)
}

/// Projects the scope inside the current transaction and checks every
/// requested quantity fits. Errors name the first failing item.
pub(crate) async fn ensure_sufficient<C>(
    conn: &C,
    scope: HolderScope,
    needs: &[(Uuid, i32)],
) -> Result<(), ServiceError>
where
    C: ConnectionTrait,
{
    let entries = crate::ledger::entries_for_scope(conn, scope, None).await?;
    let balances = projection::project(scope, &entries);

    for (item_id, needed) in needs {
        let have = balances.get(item_id).copied().unwrap_or(0);
        if have < i64::from(*needed) {
            let holder = match scope {
                HolderScope::Central => "central".to_string(),
                HolderScope::Volunteer(v) => format!("volunteer {}", v),
            };
            return Err(ServiceError::InsufficientStock(format!(
                "insufficient {} stock for item {}: have {}, need {}",
                holder, item_id, have, needed
            )));
        }
    }

    Ok(())
}

/// Loads a user and checks they hold the volunteer role. Status is not
/// checked here: reclaiming goods from a deactivated volunteer must stay
/// possible.
pub(crate) async fn volunteer<C>(conn: &C, volunteer_id: Uuid) -> Result<user::Model, ServiceError>
where
    C: ConnectionTrait,
{
    let volunteer = user::Entity::find_by_id(volunteer_id)
        .one(conn)
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("User {} not found", volunteer_id)))?;

    if volunteer.role != user::UserRole::Volunteer {
        return Err(ServiceError::BadRequest(format!(
            "User {} is not a volunteer",
            volunteer_id
        )));
    }

    Ok(volunteer)
}

/// Loads a user and checks they are an active volunteer
pub(crate) async fn active_volunteer<C>(
    conn: &C,
    volunteer_id: Uuid,
) -> Result<user::Model, ServiceError>
where
    C: ConnectionTrait,
{
    let found = volunteer(conn, volunteer_id).await?;
    if found.status != user::UserStatus::Active {
        return Err(ServiceError::BadRequest(format!(
            "Volunteer {} is inactive",
            volunteer_id
        )));
    }

    Ok(found)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aggregate_merges_duplicate_lines() {
        let item = Uuid::new_v4();
        let lines = vec![
            LineItem {
                item_id: item,
                quantity: 3,
            },
            LineItem {
                item_id: item,
                quantity: 4,
            },
        ];
        let merged = aggregate_lines(&lines).unwrap();
        assert_eq!(merged, vec![(item, 7)]);
    }

    #[test]
    fn aggregate_rejects_non_positive_quantity() {
        let lines = vec![LineItem {
            item_id: Uuid::new_v4(),
            quantity: 0,
        }];
        assert!(matches!(
            aggregate_lines(&lines),
            Err(ServiceError::BadRequest(_))
        ));
    }

    #[test]
    fn aggregate_rejects_empty_batch() {
        assert!(matches!(
            aggregate_lines(&[]),
            Err(ServiceError::BadRequest(_))
        ));
    }
}
