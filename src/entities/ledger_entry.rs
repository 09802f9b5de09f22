use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use sea_orm::{ActiveValue, Set};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// What happened to the goods
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
    ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(32))")]
pub enum EntryKind {
    #[sea_orm(string_value = "STOCK_IN")]
    #[serde(rename = "STOCK_IN")]
    StockIn,
    #[sea_orm(string_value = "ISSUE_TO_FIELD")]
    #[serde(rename = "ISSUE_TO_FIELD")]
    IssueToField,
    #[sea_orm(string_value = "DISTRIBUTE")]
    #[serde(rename = "DISTRIBUTE")]
    Distribute,
    #[sea_orm(string_value = "DAMAGE")]
    #[serde(rename = "DAMAGE")]
    Damage,
    #[sea_orm(string_value = "ADJUSTMENT")]
    #[serde(rename = "ADJUSTMENT")]
    Adjustment,
    #[sea_orm(string_value = "RETURN_TO_CENTRAL")]
    #[serde(rename = "RETURN_TO_CENTRAL")]
    ReturnToCentral,
}

/// Signed relative to the holder the entry is scoped to
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
    ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(8))")]
pub enum Direction {
    #[sea_orm(string_value = "IN")]
    #[serde(rename = "IN")]
    In,
    #[sea_orm(string_value = "OUT")]
    #[serde(rename = "OUT")]
    Out,
}

/// One write-once ledger row. Quantity truth lives here and nowhere else;
/// the service exposes no update or delete path for this table.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "ledger_entries")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    pub item_id: Uuid,

    pub kind: EntryKind,

    pub direction: Direction,

    /// Always positive; the direction carries the sign
    pub quantity: i32,

    /// Reference to the operation record (e.g., "Distribution", "StockAssignment")
    pub reference_type: Option<String>,

    /// Operation record id, or the caller-supplied request key for damage reports
    pub reference_id: Option<String>,

    /// The volunteer for volunteer-scoped entries, the admin for central-scoped ones
    pub performed_by: Uuid,

    pub created_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

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
