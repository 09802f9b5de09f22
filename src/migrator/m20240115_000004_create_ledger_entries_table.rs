use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Append-only: no update or delete path exists anywhere in the service.
        manager
            .create_table(
                Table::create()
                    .table(LedgerEntries::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(LedgerEntries::Id)
                            .uuid()
                            .primary_key()
                            .not_null(),
                    )
                    .col(ColumnDef::new(LedgerEntries::ItemId).uuid().not_null())
                    .col(ColumnDef::new(LedgerEntries::Kind).string().not_null())
                    .col(ColumnDef::new(LedgerEntries::Direction).string().not_null())
                    .col(ColumnDef::new(LedgerEntries::Quantity).integer().not_null())
                    .col(ColumnDef::new(LedgerEntries::ReferenceType).string().null())
                    .col(ColumnDef::new(LedgerEntries::ReferenceId).string().null())
                    .col(ColumnDef::new(LedgerEntries::PerformedBy).uuid().not_null())
                    .col(
                        ColumnDef::new(LedgerEntries::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_ledger_entries_item_created")
                    .table(LedgerEntries::Table)
                    .col(LedgerEntries::ItemId)
                    .col(LedgerEntries::CreatedAt)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_ledger_entries_performed_by")
                    .table(LedgerEntries::Table)
                    .col(LedgerEntries::PerformedBy)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_ledger_entries_reference_id")
                    .table(LedgerEntries::Table)
                    .col(LedgerEntries::ReferenceId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(LedgerEntries::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum LedgerEntries {
    Table,
    Id,
    ItemId,
    Kind,
    Direction,
    Quantity,
    ReferenceType,
    ReferenceId,
    PerformedBy,
    CreatedAt,
}
