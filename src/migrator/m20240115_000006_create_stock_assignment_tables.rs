use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(StockAssignments::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(StockAssignments::Id)
                            .uuid()
                            .primary_key()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(StockAssignments::VolunteerId)
                            .uuid()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(StockAssignments::AssignedBy)
                            .uuid()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(StockAssignments::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_stock_assignments_volunteer_id")
                    .table(StockAssignments::Table)
                    .col(StockAssignments::VolunteerId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(StockAssignmentItems::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(StockAssignmentItems::Id)
                            .uuid()
                            .primary_key()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(StockAssignmentItems::AssignmentId)
                            .uuid()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(StockAssignmentItems::ItemId)
                            .uuid()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(StockAssignmentItems::Quantity)
                            .integer()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_stock_assignment_items_assignment_id")
                    .table(StockAssignmentItems::Table)
                    .col(StockAssignmentItems::AssignmentId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(
                Table::drop()
                    .table(StockAssignmentItems::Table)
                    .to_owned(),
            )
            .await?;

        manager
            .drop_table(Table::drop().table(StockAssignments::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum StockAssignments {
    Table,
    Id,
    VolunteerId,
    AssignedBy,
    CreatedAt,
}

#[derive(DeriveIden)]
enum StockAssignmentItems {
    Table,
    Id,
    AssignmentId,
    ItemId,
    Quantity,
}
