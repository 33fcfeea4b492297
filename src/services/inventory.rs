use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    sea_query::{Expr, OnConflict},
    ActiveValue::Set,
    ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
    TransactionTrait,
};
use serde::Serialize;
use std::sync::Arc;
use tracing::{error, info, instrument, warn};

use crate::{
    entities::{
        inventory_record::{self, Entity as InventoryRecordEntity},
        product::Entity as ProductEntity,
        wip_inventory_record::{self, Entity as WipInventoryRecordEntity},
        wip_item::Entity as WipItemEntity,
    },
    errors::ServiceError,
    events::{Event, EventSender},
    models::ItemRef,
    services::catalog::{require_product, require_store, require_wip_item},
};

/// Whether an adjustment may leave a ledger row below zero.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NegativeStockPolicy {
    /// Quantities pass through unchecked; negative on-hand is a valid state.
    Allow,
    /// An adjustment that would end below zero fails with `InsufficientStock`.
    Reject,
}

impl NegativeStockPolicy {
    pub fn from_allow_flag(allow_negative_stock: bool) -> Self {
        if allow_negative_stock {
            NegativeStockPolicy::Allow
        } else {
            NegativeStockPolicy::Reject
        }
    }
}

/// Ledger row for a raw product, joined with its catalog data.
#[derive(Debug, Clone, Serialize)]
pub struct InventoryLine {
    pub store_id: String,
    pub product_id: String,
    pub product_name: Option<String>,
    pub unit: Option<String>,
    pub quantity: Decimal,
    pub min_stock: Option<Decimal>,
    pub is_low_stock: bool,
    pub last_updated_by: Option<String>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct WipInventoryLine {
    pub store_id: String,
    pub wip_item_id: String,
    pub wip_item_name: Option<String>,
    pub unit: Option<String>,
    pub quantity: Decimal,
    pub production_date: Option<DateTime<Utc>>,
    pub expiry_date: Option<DateTime<Utc>>,
    pub updated_at: DateTime<Utc>,
}

/// A product whose on-hand quantity is strictly below its minimum stock.
#[derive(Debug, Clone, Serialize)]
pub struct StockAlert {
    pub store_id: String,
    pub product_id: String,
    pub product_name: String,
    pub current_stock: Decimal,
    pub min_stock: Decimal,
    pub shortage: Decimal,
    pub unit: String,
}

/// The stock ledger: on-hand quantity per (location, product) and per
/// (location, WIP item).
///
/// Every mutation goes through an upsert keyed on the composite primary key,
/// and increments are pushed to the database as `quantity = quantity + delta`
/// so concurrent adjustments of the same row never lose an update. The
/// `*_in` variants run on a caller-supplied connection or transaction and
/// leave event publication to the caller.
#[derive(Clone)]
pub struct InventoryService {
    db: Arc<DatabaseConnection>,
    event_sender: Arc<EventSender>,
    policy: NegativeStockPolicy,
}

impl InventoryService {
    pub fn new(
        db: Arc<DatabaseConnection>,
        event_sender: Arc<EventSender>,
        policy: NegativeStockPolicy,
    ) -> Self {
        Self {
            db,
            event_sender,
            policy,
        }
    }

    pub fn policy(&self) -> NegativeStockPolicy {
        self.policy
    }

    /// Current on-hand quantity; zero when no row exists.
    #[instrument(skip(self))]
    pub async fn get_quantity(&self, store_id: &str, item: &ItemRef) -> Result<Decimal, ServiceError> {
        self.quantity_in(self.db.as_ref(), store_id, item).await
    }

    /// Overwrites the on-hand quantity with an absolute value.
    #[instrument(skip(self))]
    pub async fn set_quantity(
        &self,
        store_id: &str,
        item: &ItemRef,
        quantity: Decimal,
        actor: &str,
    ) -> Result<(), ServiceError> {
        let db = self.db.as_ref();
        require_store(db, store_id).await?;
        require_item(db, item).await?;

        self.set_quantity_in(db, store_id, item, quantity, actor).await?;
        info!(store_id, %item, %quantity, actor, "Inventory quantity set");

        self.event_sender
            .publish(Event::InventoryCounted {
                store_id: store_id.to_string(),
                item: item.clone(),
                quantity,
                actor: actor.to_string(),
            })
            .await;
        Ok(())
    }

    /// Applies a signed delta and returns the resulting quantity.
    #[instrument(skip(self))]
    pub async fn adjust_quantity(
        &self,
        store_id: &str,
        item: &ItemRef,
        delta: Decimal,
        actor: &str,
    ) -> Result<Decimal, ServiceError> {
        let txn = self.db.begin().await.map_err(|e| {
            error!("Failed to begin transaction: {}", e);
            ServiceError::db_error(e)
        })?;

        require_store(&txn, store_id).await?;
        require_item(&txn, item).await?;
        let new_quantity = self
            .adjust_quantity_in(&txn, store_id, item, delta, actor)
            .await?;

        txn.commit().await.map_err(|e| {
            error!("Failed to commit inventory adjustment: {}", e);
            ServiceError::db_error(e)
        })?;

        self.event_sender
            .publish(Event::InventoryAdjusted {
                store_id: store_id.to_string(),
                item: item.clone(),
                delta,
                new_quantity,
                actor: actor.to_string(),
            })
            .await;
        Ok(new_quantity)
    }

    pub(crate) async fn quantity_in<C: ConnectionTrait>(
        &self,
        conn: &C,
        store_id: &str,
        item: &ItemRef,
    ) -> Result<Decimal, ServiceError> {
        let quantity = match item {
            ItemRef::Product(product_id) => {
                InventoryRecordEntity::find_by_id((store_id.to_owned(), product_id.clone()))
                    .one(conn)
                    .await
                    .map_err(ServiceError::db_error)?
                    .map(|r| r.quantity)
            }
            ItemRef::Wip(wip_item_id) => {
                WipInventoryRecordEntity::find_by_id((store_id.to_owned(), wip_item_id.clone()))
                    .one(conn)
                    .await
                    .map_err(ServiceError::db_error)?
                    .map(|r| r.quantity)
            }
        };
        Ok(quantity.unwrap_or(Decimal::ZERO))
    }

    pub(crate) async fn set_quantity_in<C: ConnectionTrait>(
        &self,
        conn: &C,
        store_id: &str,
        item: &ItemRef,
        quantity: Decimal,
        actor: &str,
    ) -> Result<(), ServiceError> {
        let now = Utc::now();
        match item {
            ItemRef::Product(product_id) => {
                let record = inventory_record::ActiveModel {
                    store_id: Set(store_id.to_owned()),
                    product_id: Set(product_id.clone()),
                    quantity: Set(quantity),
                    last_updated_by: Set(Some(actor.to_owned())),
                    updated_at: Set(now),
                };
                InventoryRecordEntity::insert(record)
                    .on_conflict(
                        OnConflict::columns([
                            inventory_record::Column::StoreId,
                            inventory_record::Column::ProductId,
                        ])
                        .update_columns([
                            inventory_record::Column::Quantity,
                            inventory_record::Column::LastUpdatedBy,
                            inventory_record::Column::UpdatedAt,
                        ])
                        .to_owned(),
                    )
                    .exec_without_returning(conn)
                    .await
                    .map_err(ServiceError::db_error)?;
            }
            ItemRef::Wip(wip_item_id) => {
                let record = wip_inventory_record::ActiveModel {
                    store_id: Set(store_id.to_owned()),
                    wip_item_id: Set(wip_item_id.clone()),
                    quantity: Set(quantity),
                    production_date: Set(None),
                    expiry_date: Set(None),
                    last_updated_by: Set(Some(actor.to_owned())),
                    updated_at: Set(now),
                };
                // Batch dates survive a recount
                WipInventoryRecordEntity::insert(record)
                    .on_conflict(
                        OnConflict::columns([
                            wip_inventory_record::Column::StoreId,
                            wip_inventory_record::Column::WipItemId,
                        ])
                        .update_columns([
                            wip_inventory_record::Column::Quantity,
                            wip_inventory_record::Column::LastUpdatedBy,
                            wip_inventory_record::Column::UpdatedAt,
                        ])
                        .to_owned(),
                    )
                    .exec_without_returning(conn)
                    .await
                    .map_err(ServiceError::db_error)?;
            }
        }
        Ok(())
    }

    pub(crate) async fn adjust_quantity_in<C: ConnectionTrait>(
        &self,
        conn: &C,
        store_id: &str,
        item: &ItemRef,
        delta: Decimal,
        actor: &str,
    ) -> Result<Decimal, ServiceError> {
        let now = Utc::now();
        match item {
            ItemRef::Product(product_id) => {
                let record = inventory_record::ActiveModel {
                    store_id: Set(store_id.to_owned()),
                    product_id: Set(product_id.clone()),
                    quantity: Set(delta),
                    last_updated_by: Set(Some(actor.to_owned())),
                    updated_at: Set(now),
                };
                InventoryRecordEntity::insert(record)
                    .on_conflict(
                        OnConflict::columns([
                            inventory_record::Column::StoreId,
                            inventory_record::Column::ProductId,
                        ])
                        .values([
                            (
                                inventory_record::Column::Quantity,
                                Expr::col((
                                    InventoryRecordEntity,
                                    inventory_record::Column::Quantity,
                                ))
                                .add(delta),
                            ),
                            (
                                inventory_record::Column::LastUpdatedBy,
                                Expr::val(actor.to_owned()).into(),
                            ),
                            (inventory_record::Column::UpdatedAt, Expr::val(now).into()),
                        ])
                        .to_owned(),
                    )
                    .exec_without_returning(conn)
                    .await
                    .map_err(|e| {
                        error!("Failed to adjust inventory: {}", e);
                        ServiceError::db_error(e)
                    })?;
            }
            ItemRef::Wip(wip_item_id) => {
                let record = wip_inventory_record::ActiveModel {
                    store_id: Set(store_id.to_owned()),
                    wip_item_id: Set(wip_item_id.clone()),
                    quantity: Set(delta),
                    production_date: Set(None),
                    expiry_date: Set(None),
                    last_updated_by: Set(Some(actor.to_owned())),
                    updated_at: Set(now),
                };
                WipInventoryRecordEntity::insert(record)
                    .on_conflict(
                        OnConflict::columns([
                            wip_inventory_record::Column::StoreId,
                            wip_inventory_record::Column::WipItemId,
                        ])
                        .values([
                            (
                                wip_inventory_record::Column::Quantity,
                                Expr::col((
                                    WipInventoryRecordEntity,
                                    wip_inventory_record::Column::Quantity,
                                ))
                                .add(delta),
                            ),
                            (
                                wip_inventory_record::Column::LastUpdatedBy,
                                Expr::val(actor.to_owned()).into(),
                            ),
                            (
                                wip_inventory_record::Column::UpdatedAt,
                                Expr::val(now).into(),
                            ),
                        ])
                        .to_owned(),
                    )
                    .exec_without_returning(conn)
                    .await
                    .map_err(|e| {
                        error!("Failed to adjust WIP inventory: {}", e);
                        ServiceError::db_error(e)
                    })?;
            }
        }

        let new_quantity = self.quantity_in(conn, store_id, item).await?;
        if new_quantity.is_sign_negative() && !new_quantity.is_zero() {
            match self.policy {
                NegativeStockPolicy::Allow => {
                    warn!(store_id, %item, %new_quantity, "Inventory went negative");
                }
                NegativeStockPolicy::Reject => {
                    return Err(ServiceError::InsufficientStock(format!(
                        "{} at {} would drop to {}",
                        item, store_id, new_quantity
                    )));
                }
            }
        }
        Ok(new_quantity)
    }

    /// Adds a freshly produced batch to the WIP ledger.
    ///
    /// Quantity is additive; production and expiry dates are overwritten by
    /// the latest batch.
    pub(crate) async fn receive_wip_batch_in<C: ConnectionTrait>(
        &self,
        conn: &C,
        store_id: &str,
        wip_item_id: &str,
        quantity: Decimal,
        production_date: DateTime<Utc>,
        expiry_date: Option<DateTime<Utc>>,
        actor: &str,
    ) -> Result<Decimal, ServiceError> {
        let now = Utc::now();
        let record = wip_inventory_record::ActiveModel {
            store_id: Set(store_id.to_owned()),
            wip_item_id: Set(wip_item_id.to_owned()),
            quantity: Set(quantity),
            production_date: Set(Some(production_date)),
            expiry_date: Set(expiry_date),
            last_updated_by: Set(Some(actor.to_owned())),
            updated_at: Set(now),
        };
        WipInventoryRecordEntity::insert(record)
            .on_conflict(
                OnConflict::columns([
                    wip_inventory_record::Column::StoreId,
                    wip_inventory_record::Column::WipItemId,
                ])
                .values([
                    (
                        wip_inventory_record::Column::Quantity,
                        Expr::col((
                            WipInventoryRecordEntity,
                            wip_inventory_record::Column::Quantity,
                        ))
                        .add(quantity),
                    ),
                    (
                        wip_inventory_record::Column::ProductionDate,
                        Expr::val(Some(production_date)).into(),
                    ),
                    (
                        wip_inventory_record::Column::ExpiryDate,
                        Expr::val(expiry_date).into(),
                    ),
                    (
                        wip_inventory_record::Column::LastUpdatedBy,
                        Expr::val(actor.to_owned()).into(),
                    ),
                    (wip_inventory_record::Column::UpdatedAt, Expr::val(now).into()),
                ])
                .to_owned(),
            )
            .exec_without_returning(conn)
            .await
            .map_err(|e| {
                error!("Failed to record WIP batch: {}", e);
                ServiceError::db_error(e)
            })?;

        self.quantity_in(conn, store_id, &ItemRef::Wip(wip_item_id.to_owned()))
            .await
    }

    /// Product ledger for a location with low-stock flags (`quantity < min_stock`).
    #[instrument(skip(self))]
    pub async fn list_inventory(&self, store_id: &str) -> Result<Vec<InventoryLine>, ServiceError> {
        let rows = InventoryRecordEntity::find()
            .filter(inventory_record::Column::StoreId.eq(store_id))
            .order_by_asc(inventory_record::Column::ProductId)
            .find_also_related(ProductEntity)
            .all(self.db.as_ref())
            .await
            .map_err(ServiceError::db_error)?;

        Ok(rows
            .into_iter()
            .map(|(record, product)| {
                let min_stock = product.as_ref().and_then(|p| p.min_stock);
                InventoryLine {
                    is_low_stock: min_stock.map_or(false, |min| record.quantity < min),
                    product_name: product.as_ref().map(|p| p.name.clone()),
                    unit: product.map(|p| p.unit),
                    min_stock,
                    store_id: record.store_id,
                    product_id: record.product_id,
                    quantity: record.quantity,
                    last_updated_by: record.last_updated_by,
                    updated_at: record.updated_at,
                }
            })
            .collect())
    }

    #[instrument(skip(self))]
    pub async fn list_wip_inventory(
        &self,
        store_id: &str,
    ) -> Result<Vec<WipInventoryLine>, ServiceError> {
        let rows = WipInventoryRecordEntity::find()
            .filter(wip_inventory_record::Column::StoreId.eq(store_id))
            .order_by_asc(wip_inventory_record::Column::WipItemId)
            .find_also_related(WipItemEntity)
            .all(self.db.as_ref())
            .await
            .map_err(ServiceError::db_error)?;

        Ok(rows
            .into_iter()
            .map(|(record, wip)| WipInventoryLine {
                wip_item_name: wip.as_ref().map(|w| w.name.clone()),
                unit: wip.map(|w| w.unit),
                store_id: record.store_id,
                wip_item_id: record.wip_item_id,
                quantity: record.quantity,
                production_date: record.production_date,
                expiry_date: record.expiry_date,
                updated_at: record.updated_at,
            })
            .collect())
    }

    /// Products strictly below their minimum stock, largest shortage first.
    #[instrument(skip(self))]
    pub async fn low_stock_alerts(
        &self,
        store_id: Option<&str>,
    ) -> Result<Vec<StockAlert>, ServiceError> {
        let mut query = InventoryRecordEntity::find();
        if let Some(store_id) = store_id {
            query = query.filter(inventory_record::Column::StoreId.eq(store_id));
        }
        let rows = query
            .order_by_asc(inventory_record::Column::StoreId)
            .order_by_asc(inventory_record::Column::ProductId)
            .find_also_related(ProductEntity)
            .all(self.db.as_ref())
            .await
            .map_err(ServiceError::db_error)?;

        let mut alerts: Vec<StockAlert> = rows
            .into_iter()
            .filter_map(|(record, product)| {
                let product = product?;
                let min_stock = product.min_stock?;
                (record.quantity < min_stock).then(|| StockAlert {
                    shortage: min_stock - record.quantity,
                    store_id: record.store_id,
                    product_id: record.product_id,
                    product_name: product.name,
                    current_stock: record.quantity,
                    min_stock,
                    unit: product.unit,
                })
            })
            .collect();
        alerts.sort_by(|a, b| b.shortage.cmp(&a.shortage));
        Ok(alerts)
    }
}

pub(crate) async fn require_item<C: ConnectionTrait>(
    conn: &C,
    item: &ItemRef,
) -> Result<(), ServiceError> {
    match item {
        ItemRef::Product(id) => require_product(conn, id).await.map(|_| ()),
        ItemRef::Wip(id) => require_wip_item(conn, id).await.map(|_| ()),
    }
}
