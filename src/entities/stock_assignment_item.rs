use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// One item line of a stock assignment record
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "stock_assignment_items")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    pub assignment_id: Uuid,

    pub item_id: Uuid,

    pub quantity: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::stock_assignment::Entity",
        from = "Column::AssignmentId",
        to = "super::stock_assignment::Column::Id"
    )]
    StockAssignment,
}

impl Related<super::stock_assignment::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::StockAssignment.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
