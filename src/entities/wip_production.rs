use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Append-only production log entry.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "wip_productions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub store_id: String,
    pub wip_item_id: String,
    #[sea_orm(column_type = "Decimal(Some((16, 4)))")]
    pub quantity: Decimal,
    pub unit: String,
    pub production_date: DateTime<Utc>,
    pub expiry_date: Option<DateTime<Utc>>,
    pub employee_id: Option<String>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::wip_item::Entity",
        from = "Column::WipItemId",
        to = "super::wip_item::Column::Id"
    )]
    WipItem,
}

impl Related<super::wip_item::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::WipItem.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
