use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::errors::ServiceError;
use crate::models::{ItemRef, RecipeOwner};

/// One edge of the recipe graph.
///
/// Exactly one of `menu_id` / `wip_item_id` names the producible owner and
/// exactly one of `product_id` / `used_wip_item_id` names the input. Use
/// [`Model::owner`] and [`Model::input`] rather than the raw columns.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "recipe_lines")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub menu_id: Option<String>,
    pub wip_item_id: Option<String>,
    pub product_id: Option<String>,
    pub used_wip_item_id: Option<String>,
    #[sea_orm(column_type = "Decimal(Some((16, 4)))")]
    pub quantity: Decimal,
    pub unit: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Model {
    pub fn owner(&self) -> Result<RecipeOwner, ServiceError> {
        RecipeOwner::from_columns(self.menu_id.as_deref(), self.wip_item_id.as_deref())
    }

    pub fn input(&self) -> Result<ItemRef, ServiceError> {
        ItemRef::from_columns(self.product_id.as_deref(), self.used_wip_item_id.as_deref())
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::menu::Entity",
        from = "Column::MenuId",
        to = "super::menu::Column::Id",
        on_delete = "Cascade"
    )]
    Menu,
    #[sea_orm(
        belongs_to = "super::wip_item::Entity",
        from = "Column::WipItemId",
        to = "super::wip_item::Column::Id",
        on_delete = "Cascade"
    )]
    OwnerWipItem,
    #[sea_orm(
        belongs_to = "super::product::Entity",
        from = "Column::ProductId",
        to = "super::product::Column::Id"
    )]
    Product,
    #[sea_orm(
        belongs_to = "super::wip_item::Entity",
        from = "Column::UsedWipItemId",
        to = "super::wip_item::Column::Id"
    )]
    UsedWipItem,
}

impl Related<super::menu::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Menu.def()
    }
}

impl Related<super::product::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Product.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
