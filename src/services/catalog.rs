use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, ConnectionTrait, DatabaseConnection,
    EntityTrait, QueryFilter, QueryOrder,
};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{error, info, instrument};
use validator::Validate;

use crate::{
    entities::{
        category::{self, CategoryType, Entity as CategoryEntity},
        menu::{self, Entity as MenuEntity},
        product::{self, Entity as ProductEntity},
        store::{self, Entity as StoreEntity, StoreType},
        wip_item::{self, Entity as WipItemEntity},
    },
    errors::ServiceError,
};

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct NewStore {
    #[validate(length(min = 1, max = 32))]
    pub id: String,
    #[validate(length(min = 1))]
    pub name: String,
    pub store_type: StoreType,
    pub address: Option<String>,
    pub phone: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct NewCategory {
    #[validate(length(min = 1, max = 32))]
    pub id: String,
    #[validate(length(min = 1))]
    pub name: String,
    pub category_type: CategoryType,
    pub parent_id: Option<String>,
    #[serde(default)]
    pub display_order: i32,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct NewProduct {
    #[validate(length(min = 1, max = 32))]
    pub id: String,
    #[validate(length(min = 1))]
    pub name: String,
    #[validate(length(min = 1))]
    pub unit: String,
    pub category_id: Option<String>,
    pub jan_code: Option<String>,
    pub unit_price: Option<Decimal>,
    pub supplier_id: Option<String>,
    pub min_stock: Option<Decimal>,
    pub order_unit: Option<Decimal>,
    pub lot_size: Option<Decimal>,
    pub lot_unit: Option<String>,
    pub storage_location: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct NewWipItem {
    #[validate(length(min = 1, max = 32))]
    pub id: String,
    #[validate(length(min = 1))]
    pub name: String,
    #[validate(length(min = 1))]
    pub unit: String,
    pub category_id: Option<String>,
    #[validate(range(min = 0))]
    pub shelf_life_days: Option<i32>,
    pub production_location: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct NewMenu {
    #[validate(length(min = 1, max = 32))]
    pub id: String,
    #[validate(length(min = 1))]
    pub name: String,
    pub category_id: Option<String>,
    pub price: Decimal,
}

/// Reference data: locations, products, WIP items, menus and categories.
#[derive(Clone)]
pub struct CatalogService {
    db: Arc<DatabaseConnection>,
}

impl CatalogService {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    #[instrument(skip(self))]
    pub async fn get_store(&self, id: &str) -> Result<store::Model, ServiceError> {
        require_store(self.db.as_ref(), id).await
    }

    #[instrument(skip(self))]
    pub async fn get_product(&self, id: &str) -> Result<product::Model, ServiceError> {
        require_product(self.db.as_ref(), id).await
    }

    #[instrument(skip(self))]
    pub async fn get_wip_item(&self, id: &str) -> Result<wip_item::Model, ServiceError> {
        require_wip_item(self.db.as_ref(), id).await
    }

    #[instrument(skip(self))]
    pub async fn get_menu(&self, id: &str) -> Result<menu::Model, ServiceError> {
        require_menu(self.db.as_ref(), id).await
    }

    #[instrument(skip(self))]
    pub async fn get_category(&self, id: &str) -> Result<category::Model, ServiceError> {
        CategoryEntity::find_by_id(id.to_owned())
            .one(self.db.as_ref())
            .await
            .map_err(ServiceError::db_error)?
            .ok_or_else(|| ServiceError::NotFound(format!("Category {} not found", id)))
    }

    pub async fn list_stores(&self) -> Result<Vec<store::Model>, ServiceError> {
        StoreEntity::find()
            .filter(store::Column::IsActive.eq(true))
            .order_by_asc(store::Column::Id)
            .all(self.db.as_ref())
            .await
            .map_err(ServiceError::db_error)
    }

    pub async fn list_products(
        &self,
        category_id: Option<&str>,
    ) -> Result<Vec<product::Model>, ServiceError> {
        let mut query = ProductEntity::find().filter(product::Column::IsActive.eq(true));
        if let Some(category_id) = category_id {
            query = query.filter(product::Column::CategoryId.eq(category_id));
        }
        query
            .order_by_asc(product::Column::Id)
            .all(self.db.as_ref())
            .await
            .map_err(ServiceError::db_error)
    }

    pub async fn list_wip_items(&self) -> Result<Vec<wip_item::Model>, ServiceError> {
        WipItemEntity::find()
            .filter(wip_item::Column::IsActive.eq(true))
            .order_by_asc(wip_item::Column::Id)
            .all(self.db.as_ref())
            .await
            .map_err(ServiceError::db_error)
    }

    pub async fn list_menus(&self) -> Result<Vec<menu::Model>, ServiceError> {
        MenuEntity::find()
            .filter(menu::Column::IsActive.eq(true))
            .order_by_asc(menu::Column::Id)
            .all(self.db.as_ref())
            .await
            .map_err(ServiceError::db_error)
    }

    #[instrument(skip(self))]
    pub async fn create_store(&self, input: NewStore) -> Result<store::Model, ServiceError> {
        input.validate()?;
        let db = self.db.as_ref();
        if StoreEntity::find_by_id(input.id.clone())
            .one(db)
            .await
            .map_err(ServiceError::db_error)?
            .is_some()
        {
            return Err(ServiceError::Conflict(format!("Store {} already exists", input.id)));
        }

        let now = Utc::now();
        let model = store::ActiveModel {
            id: Set(input.id),
            name: Set(input.name),
            store_type: Set(input.store_type),
            address: Set(input.address),
            phone: Set(input.phone),
            is_active: Set(true),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(db)
        .await
        .map_err(|e| {
            error!("Failed to create store: {}", e);
            ServiceError::db_error(e)
        })?;

        info!(store_id = %model.id, "Store created");
        Ok(model)
    }

    #[instrument(skip(self))]
    pub async fn create_category(
        &self,
        input: NewCategory,
    ) -> Result<category::Model, ServiceError> {
        input.validate()?;
        let model = category::ActiveModel {
            id: Set(input.id),
            name: Set(input.name),
            category_type: Set(input.category_type),
            parent_id: Set(input.parent_id),
            display_order: Set(input.display_order),
            created_at: Set(Utc::now()),
        }
        .insert(self.db.as_ref())
        .await
        .map_err(ServiceError::db_error)?;

        Ok(model)
    }

    #[instrument(skip(self))]
    pub async fn create_product(&self, input: NewProduct) -> Result<product::Model, ServiceError> {
        input.validate()?;
        for (field, value) in [
            ("min_stock", input.min_stock),
            ("order_unit", input.order_unit),
            ("unit_price", input.unit_price),
        ] {
            if value.map_or(false, |v| v.is_sign_negative()) {
                return Err(ServiceError::ValidationError(format!(
                    "{} must not be negative",
                    field
                )));
            }
        }

        let db = self.db.as_ref();
        if ProductEntity::find_by_id(input.id.clone())
            .one(db)
            .await
            .map_err(ServiceError::db_error)?
            .is_some()
        {
            return Err(ServiceError::Conflict(format!("Product {} already exists", input.id)));
        }

        let now = Utc::now();
        let model = product::ActiveModel {
            id: Set(input.id),
            name: Set(input.name),
            jan_code: Set(input.jan_code),
            category_id: Set(input.category_id),
            unit: Set(input.unit),
            lot_size: Set(input.lot_size),
            lot_unit: Set(input.lot_unit),
            unit_price: Set(input.unit_price),
            supplier_id: Set(input.supplier_id),
            min_stock: Set(input.min_stock),
            order_unit: Set(input.order_unit),
            storage_location: Set(input.storage_location),
            is_active: Set(true),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(db)
        .await
        .map_err(|e| {
            error!("Failed to create product: {}", e);
            ServiceError::db_error(e)
        })?;

        info!(product_id = %model.id, "Product created");
        Ok(model)
    }

    #[instrument(skip(self))]
    pub async fn create_wip_item(&self, input: NewWipItem) -> Result<wip_item::Model, ServiceError> {
        input.validate()?;
        let db = self.db.as_ref();
        if WipItemEntity::find_by_id(input.id.clone())
            .one(db)
            .await
            .map_err(ServiceError::db_error)?
            .is_some()
        {
            return Err(ServiceError::Conflict(format!("WIP item {} already exists", input.id)));
        }

        let now = Utc::now();
        let model = wip_item::ActiveModel {
            id: Set(input.id),
            name: Set(input.name),
            category_id: Set(input.category_id),
            unit: Set(input.unit),
            shelf_life_days: Set(input.shelf_life_days),
            production_location: Set(input.production_location),
            is_active: Set(true),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(db)
        .await
        .map_err(ServiceError::db_error)?;

        info!(wip_item_id = %model.id, "WIP item created");
        Ok(model)
    }

    #[instrument(skip(self))]
    pub async fn create_menu(&self, input: NewMenu) -> Result<menu::Model, ServiceError> {
        input.validate()?;
        let now = Utc::now();
        let model = menu::ActiveModel {
            id: Set(input.id),
            name: Set(input.name),
            category_id: Set(input.category_id),
            price: Set(input.price),
            is_active: Set(true),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(self.db.as_ref())
        .await
        .map_err(ServiceError::db_error)?;

        Ok(model)
    }
}

// Lookups usable inside a caller's transaction.

pub(crate) async fn require_store<C: ConnectionTrait>(
    conn: &C,
    id: &str,
) -> Result<store::Model, ServiceError> {
    StoreEntity::find_by_id(id.to_owned())
        .one(conn)
        .await
        .map_err(ServiceError::db_error)?
        .ok_or_else(|| ServiceError::NotFound(format!("Store {} not found", id)))
}

pub(crate) async fn require_product<C: ConnectionTrait>(
    conn: &C,
    id: &str,
) -> Result<product::Model, ServiceError> {
    ProductEntity::find_by_id(id.to_owned())
        .one(conn)
        .await
        .map_err(ServiceError::db_error)?
        .ok_or_else(|| ServiceError::NotFound(format!("Product {} not found", id)))
}

pub(crate) async fn require_wip_item<C: ConnectionTrait>(
    conn: &C,
    id: &str,
) -> Result<wip_item::Model, ServiceError> {
    WipItemEntity::find_by_id(id.to_owned())
        .one(conn)
        .await
        .map_err(ServiceError::db_error)?
        .ok_or_else(|| ServiceError::NotFound(format!("WIP item {} not found", id)))
}

pub(crate) async fn require_menu<C: ConnectionTrait>(
    conn: &C,
    id: &str,
) -> Result<menu::Model, ServiceError> {
    MenuEntity::find_by_id(id.to_owned())
        .one(conn)
        .await
        .map_err(ServiceError::db_error)?
        .ok_or_else(|| ServiceError::NotFound(format!("Menu {} not found", id)))
}
