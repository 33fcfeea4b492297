use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Semi-finished good produced in-house from raw products.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "wip_items")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub name: String,
    pub category_id: Option<String>,
    pub unit: String,
    pub shelf_life_days: Option<i32>,
    pub production_location: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::wip_inventory_record::Entity")]
    WipInventoryRecords,
    #[sea_orm(has_many = "super::wip_production::Entity")]
    WipProductions,
}

impl Related<super::wip_inventory_record::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::WipInventoryRecords.def()
    }
}

impl Related<super::wip_production::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::WipProductions.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
