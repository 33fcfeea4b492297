// Reference data
pub mod category;
pub mod menu;
pub mod product;
pub mod store;
pub mod wip_item;

// Recipe graph
pub mod recipe_line;

// Stock ledger
pub mod inventory_record;
pub mod wip_inventory_record;

// Procurement
pub mod purchase_order;
pub mod purchase_order_line;

// Stocktaking
pub mod stocktaking;
pub mod stocktaking_detail;

// Production log
pub mod wip_production;
