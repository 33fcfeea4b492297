// Reference data
pub mod catalog;
pub mod recipes;

// Stock ledger
pub mod inventory;

// Reconciliation against business events
pub mod procurement;
pub mod production;
pub mod stocktaking;

// Service factory for dependency injection
pub mod factory;
