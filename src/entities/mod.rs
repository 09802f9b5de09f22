pub mod campaign;
pub mod distribution;
pub mod distribution_item;
pub mod item;
pub mod ledger_entry;
pub mod stock_assignment;
pub mod stock_assignment_item;
pub mod user;
