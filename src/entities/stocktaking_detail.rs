use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::errors::ServiceError;
use crate::models::ItemRef;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "stocktaking_details")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub stocktaking_id: Uuid,
    pub product_id: Option<String>,
    pub wip_item_id: Option<String>,
    #[sea_orm(column_type = "Decimal(Some((16, 4)))")]
    pub system_quantity: Decimal,
    #[sea_orm(column_type = "Decimal(Some((16, 4)))")]
    pub actual_quantity: Decimal,
    /// actual_quantity - system_quantity
    #[sea_orm(column_type = "Decimal(Some((16, 4)))")]
    pub difference: Decimal,
    pub unit: String,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Model {
    pub fn item(&self) -> Result<ItemRef, ServiceError> {
        ItemRef::from_columns(self.product_id.as_deref(), self.wip_item_id.as_deref())
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::stocktaking::Entity",
        from = "Column::StocktakingId",
        to = "super::stocktaking::Column::Id",
        on_delete = "Cascade"
    )]
    Stocktaking,
}

impl Related<super::stocktaking::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Stocktaking.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
