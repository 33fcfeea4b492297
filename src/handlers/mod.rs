pub mod catalog;
pub mod common;
pub mod health;
pub mod inventory;
pub mod orders;
pub mod productions;
pub mod recipes;
pub mod stocktakings;

// Re-export AppState so handler modules can import it as crate::handlers::AppState
pub use crate::AppState;
