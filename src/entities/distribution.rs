use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use sea_orm::{ActiveValue, Set};
use serde::{Deserialize, Serialize};

/// Descriptive record of a field distribution. Never a source of quantity
/// truth; the paired DISTRIBUTE ledger entries carry that.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "distributions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    /// Caller-supplied idempotency key, globally unique
    pub request_id: String,

    pub volunteer_id: Uuid,

    pub campaign_id: Option<Uuid>,

    pub state: String,

    pub city: String,

    pub pin_code: String,

    pub area: Option<String>,

    pub created_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::distribution_item::Entity")]
    DistributionItems,
}

impl Related<super::distribution_item::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::DistributionItems.def()
    }
}

#[async_trait]
impl ActiveModelBehavior for ActiveModel {
    async fn before_save<C>(self, _db: &C, _insert: bool) -> Result<Self, DbErr>
    where
        C: ConnectionTrait,
    {
        let mut active_model = self;
        if let ActiveValue::NotSet = active_model.created_at {
            active_model.created_at = Set(Utc::now());
        }
        Ok(active_model)
    }
}
