pub use sea_orm_migration::prelude::*;

mod m20240115_000001_create_users_table;
mod m20240115_000002_create_items_table;
mod m20240115_000003_create_campaigns_table;
mod m20240115_000004_create_ledger_entries_table;
mod m20240115_000005_create_distribution_tables;
mod m20240115_000006_create_stock_assignment_tables;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240115_000001_create_users_table::Migration),
            Box::new(m20240115_000002_create_items_table::Migration),
            Box::new(m20240115_000003_create_campaigns_table::Migration),
            Box::new(m20240115_000004_create_ledger_entries_table::Migration),
            Box::new(m20240115_000005_create_distribution_tables::Migration),
            Box::new(m20240115_000006_create_stock_assignment_tables::Migration),
        ]
    }
}
