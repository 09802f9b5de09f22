pub mod campaigns;
pub mod distributions;
pub mod items;
pub mod stock;
pub mod users;

// Re-export AppState so handler modules can import it as crate::handlers::AppState
pub use crate::AppState;
