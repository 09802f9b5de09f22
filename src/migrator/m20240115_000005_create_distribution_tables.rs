use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Distributions::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Distributions::Id)
                            .uuid()
                            .primary_key()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Distributions::RequestId)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Distributions::VolunteerId)
                            .uuid()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Distributions::CampaignId).uuid().null())
                    .col(ColumnDef::new(Distributions::State).string().not_null())
                    .col(ColumnDef::new(Distributions::City).string().not_null())
                    .col(ColumnDef::new(Distributions::PinCode).string().not_null())
                    .col(ColumnDef::new(Distributions::Area).string().null())
                    .col(
                        ColumnDef::new(Distributions::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        // Backstop for the in-transaction duplicate request check
        manager
            .create_index(
                Index::create()
                    .name("idx_distributions_request_id")
                    .table(Distributions::Table)
                    .col(Distributions::RequestId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_distributions_volunteer_id")
                    .table(Distributions::Table)
                    .col(Distributions::VolunteerId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(DistributionItems::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(DistributionItems::Id)
                            .uuid()
                            .primary_key()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(DistributionItems::DistributionId)
                            .uuid()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(DistributionItems::ItemId)
                            .uuid()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(DistributionItems::Quantity)
                            .integer()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_distribution_items_distribution_id")
                    .table(DistributionItems::Table)
                    .col(DistributionItems::DistributionId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(DistributionItems::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Distributions::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Distributions {
    Table,
    Id,
    RequestId,
    VolunteerId,
    CampaignId,
    State,
    City,
    PinCode,
    Area,
    CreatedAt,
}

#[derive(DeriveIden)]
enum DistributionItems {
    Table,
    Id,
    DistributionId,
    ItemId,
    Quantity,
}
