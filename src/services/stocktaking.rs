use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    sea_query::Expr, ActiveModelTrait, ActiveValue::Set, ColumnTrait, ConnectionTrait,
    DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{error, info, instrument};
use uuid::Uuid;
use validator::Validate;

use crate::{
    entities::{
        inventory_record::{self, Entity as InventoryRecordEntity},
        product::Entity as ProductEntity,
        stocktaking::{self, Entity as StocktakingEntity, StocktakingStatus},
        stocktaking_detail::{self, Entity as StocktakingDetailEntity},
        wip_inventory_record::{self, Entity as WipInventoryRecordEntity},
        wip_item::Entity as WipItemEntity,
    },
    errors::ServiceError,
    events::{Event, EventSender},
    models::ItemRef,
    services::{
        catalog::require_store,
        inventory::{require_item, InventoryService},
    },
};

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateStocktakingInput {
    #[validate(length(min = 1))]
    pub store_id: String,
    #[validate(length(min = 1))]
    pub employee_id: String,
    pub stocktaking_date: Option<DateTime<Utc>>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct AddDetailInput {
    pub product_id: Option<String>,
    pub wip_item_id: Option<String>,
    pub system_quantity: Decimal,
    pub actual_quantity: Decimal,
    #[validate(length(min = 1))]
    pub unit: String,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct StocktakingWithDetails {
    #[serde(flatten)]
    pub stocktaking: stocktaking::Model,
    pub details: Vec<stocktaking_detail::Model>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DifferenceEntry {
    pub detail_id: Uuid,
    pub item: ItemRef,
    pub system_quantity: Decimal,
    pub actual_quantity: Decimal,
    pub difference: Decimal,
    pub unit: String,
    /// `None` when the system quantity is zero or negative.
    pub difference_percentage: Option<Decimal>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StocktakingAnalysis {
    pub total_items: usize,
    pub matched_items: usize,
    pub difference_items: usize,
    /// Share of items with a non-zero difference, in percent.
    pub difference_rate: Decimal,
    pub top_differences: Vec<DifferenceEntry>,
}

impl StocktakingAnalysis {
    /// Summarizes a count sheet; `limit` caps the number of reported variances.
    pub fn from_details(details: &[stocktaking_detail::Model], limit: usize) -> Result<Self, ServiceError> {
        let total_items = details.len();
        let matched_items = details.iter().filter(|d| d.difference.is_zero()).count();
        let difference_items = total_items - matched_items;
        let difference_rate = if total_items == 0 {
            Decimal::ZERO
        } else {
            (Decimal::from(difference_items as u64) * Decimal::ONE_HUNDRED
                / Decimal::from(total_items as u64))
            .round_dp(2)
        };

        let mut differing: Vec<&stocktaking_detail::Model> =
            details.iter().filter(|d| !d.difference.is_zero()).collect();
        // Stable, so equal magnitudes keep sheet order
        differing.sort_by(|a, b| b.difference.abs().cmp(&a.difference.abs()));

        let top_differences = differing
            .into_iter()
            .take(limit)
            .map(|d| {
                Ok(DifferenceEntry {
                    detail_id: d.id,
                    item: d.item()?,
                    system_quantity: d.system_quantity,
                    actual_quantity: d.actual_quantity,
                    difference: d.difference,
                    unit: d.unit.clone(),
                    difference_percentage: difference_percentage(d.difference, d.system_quantity),
                })
            })
            .collect::<Result<Vec<_>, ServiceError>>()?;

        Ok(Self {
            total_items,
            matched_items,
            difference_items,
            difference_rate,
            top_differences,
        })
    }
}

fn difference_percentage(difference: Decimal, system_quantity: Decimal) -> Option<Decimal> {
    (system_quantity > Decimal::ZERO)
        .then(|| (difference * Decimal::ONE_HUNDRED / system_quantity).round_dp(2))
}

/// Physical counts: count sheets that snapshot the ledger, collect counted
/// quantities and, on confirmation, overwrite the ledger with them.
#[derive(Clone)]
pub struct StocktakingService {
    db: Arc<DatabaseConnection>,
    event_sender: Arc<EventSender>,
    inventory: InventoryService,
    top_differences_limit: usize,
}

impl StocktakingService {
    pub fn new(
        db: Arc<DatabaseConnection>,
        event_sender: Arc<EventSender>,
        inventory: InventoryService,
        top_differences_limit: usize,
    ) -> Self {
        Self {
            db,
            event_sender,
            inventory,
            top_differences_limit,
        }
    }

    #[instrument(skip(self))]
    pub async fn create_stocktaking(
        &self,
        input: CreateStocktakingInput,
    ) -> Result<stocktaking::Model, ServiceError> {
        input.validate()?;
        let sheet = self.create_stocktaking_in(self.db.as_ref(), input).await?;
        info!(stocktaking_id = %sheet.id, store_id = %sheet.store_id, "Stocktaking created");
        Ok(sheet)
    }

    /// Creates a sheet and snapshots the location's ledgers onto it in one
    /// transaction; a failed snapshot leaves no sheet behind.
    #[instrument(skip(self))]
    pub async fn create_with_snapshot(
        &self,
        input: CreateStocktakingInput,
    ) -> Result<StocktakingWithDetails, ServiceError> {
        input.validate()?;
        let txn = self.db.begin().await.map_err(ServiceError::db_error)?;

        let sheet = self.create_stocktaking_in(&txn, input).await?;
        let details = self
            .generate_details_in(&txn, sheet.id, &sheet.store_id)
            .await?;

        txn.commit().await.map_err(|e| {
            error!("Failed to commit stocktaking with snapshot: {}", e);
            ServiceError::db_error(e)
        })?;

        info!(
            stocktaking_id = %sheet.id,
            store_id = %sheet.store_id,
            details = details.len(),
            "Stocktaking created from ledger snapshot"
        );
        Ok(StocktakingWithDetails {
            stocktaking: sheet,
            details,
        })
    }

    async fn create_stocktaking_in<C: ConnectionTrait>(
        &self,
        conn: &C,
        input: CreateStocktakingInput,
    ) -> Result<stocktaking::Model, ServiceError> {
        require_store(conn, &input.store_id).await?;

        let now = Utc::now();
        stocktaking::ActiveModel {
            id: Set(Uuid::new_v4()),
            store_id: Set(input.store_id),
            stocktaking_date: Set(input.stocktaking_date.unwrap_or(now)),
            status: Set(StocktakingStatus::Draft),
            employee_id: Set(input.employee_id),
            confirmed_at: Set(None),
            notes: Set(input.notes),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(conn)
        .await
        .map_err(|e| {
            error!("Failed to create stocktaking: {}", e);
            ServiceError::db_error(e)
        })
    }

    /// Snapshots every product and WIP ledger row at `store_id` onto the sheet.
    ///
    /// Each detail starts with actual = system, so difference 0. Items already
    /// on the sheet are left alone, which makes the call repeatable.
    #[instrument(skip(self))]
    pub async fn generate_details(
        &self,
        stocktaking_id: Uuid,
        store_id: &str,
    ) -> Result<Vec<stocktaking_detail::Model>, ServiceError> {
        let txn = self.db.begin().await.map_err(ServiceError::db_error)?;
        let created = self
            .generate_details_in(&txn, stocktaking_id, store_id)
            .await?;
        txn.commit().await.map_err(|e| {
            error!("Failed to commit stocktaking snapshot: {}", e);
            ServiceError::db_error(e)
        })?;

        info!(%stocktaking_id, details = created.len(), "Stocktaking details generated");
        Ok(created)
    }

    async fn generate_details_in<C: ConnectionTrait>(
        &self,
        conn: &C,
        stocktaking_id: Uuid,
        store_id: &str,
    ) -> Result<Vec<stocktaking_detail::Model>, ServiceError> {
        let sheet = find_editable_sheet(conn, stocktaking_id).await?;
        if sheet.store_id != store_id {
            return Err(ServiceError::ValidationError(format!(
                "Stocktaking {} belongs to {}, not {}",
                stocktaking_id, sheet.store_id, store_id
            )));
        }

        let existing: HashSet<ItemRef> = details_in(conn, stocktaking_id)
            .await?
            .iter()
            .map(stocktaking_detail::Model::item)
            .collect::<Result<_, _>>()?;

        let products = InventoryRecordEntity::find()
            .filter(inventory_record::Column::StoreId.eq(store_id))
            .order_by_asc(inventory_record::Column::ProductId)
            .find_also_related(ProductEntity)
            .all(conn)
            .await
            .map_err(ServiceError::db_error)?;
        let wip_items = WipInventoryRecordEntity::find()
            .filter(wip_inventory_record::Column::StoreId.eq(store_id))
            .order_by_asc(wip_inventory_record::Column::WipItemId)
            .find_also_related(WipItemEntity)
            .all(conn)
            .await
            .map_err(ServiceError::db_error)?;

        let snapshot = products
            .into_iter()
            .map(|(record, product)| {
                (
                    ItemRef::Product(record.product_id),
                    record.quantity,
                    product.map(|p| p.unit),
                )
            })
            .chain(wip_items.into_iter().map(|(record, wip)| {
                (
                    ItemRef::Wip(record.wip_item_id),
                    record.quantity,
                    wip.map(|w| w.unit),
                )
            }));

        let now = Utc::now();
        let mut created = Vec::new();
        for (item, quantity, unit) in snapshot {
            if existing.contains(&item) {
                continue;
            }
            let (product_id, wip_item_id) = item.into_columns();
            let detail = stocktaking_detail::ActiveModel {
                id: Set(Uuid::new_v4()),
                stocktaking_id: Set(stocktaking_id),
                product_id: Set(product_id),
                wip_item_id: Set(wip_item_id),
                system_quantity: Set(quantity),
                actual_quantity: Set(quantity),
                difference: Set(Decimal::ZERO),
                unit: Set(unit.unwrap_or_default()),
                notes: Set(None),
                created_at: Set(now),
            }
            .insert(conn)
            .await
            .map_err(ServiceError::db_error)?;
            created.push(detail);
        }
        Ok(created)
    }

    /// Adds a counted line; the difference is stored as actual - system.
    #[instrument(skip(self))]
    pub async fn add_detail(
        &self,
        stocktaking_id: Uuid,
        input: AddDetailInput,
    ) -> Result<stocktaking_detail::Model, ServiceError> {
        input.validate()?;
        let item = ItemRef::from_columns(input.product_id.as_deref(), input.wip_item_id.as_deref())?;
        validate_count(input.actual_quantity)?;

        let db = self.db.as_ref();
        find_editable_sheet(db, stocktaking_id).await?;
        require_item(db, &item).await?;

        let (product_id, wip_item_id) = item.into_columns();
        let detail = stocktaking_detail::ActiveModel {
            id: Set(Uuid::new_v4()),
            stocktaking_id: Set(stocktaking_id),
            product_id: Set(product_id),
            wip_item_id: Set(wip_item_id),
            system_quantity: Set(input.system_quantity),
            actual_quantity: Set(input.actual_quantity),
            difference: Set(input.actual_quantity - input.system_quantity),
            unit: Set(input.unit),
            notes: Set(input.notes),
            created_at: Set(Utc::now()),
        }
        .insert(db)
        .await
        .map_err(|e| {
            error!("Failed to add stocktaking detail: {}", e);
            ServiceError::db_error(e)
        })?;

        Ok(detail)
    }

    /// Records the counted quantity for an existing detail.
    #[instrument(skip(self))]
    pub async fn record_count(
        &self,
        detail_id: Uuid,
        actual_quantity: Decimal,
        notes: Option<String>,
    ) -> Result<stocktaking_detail::Model, ServiceError> {
        validate_count(actual_quantity)?;
        let db = self.db.as_ref();

        let detail = StocktakingDetailEntity::find_by_id(detail_id)
            .one(db)
            .await
            .map_err(ServiceError::db_error)?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Stocktaking detail {} not found", detail_id))
            })?;
        find_editable_sheet(db, detail.stocktaking_id).await?;

        let system_quantity = detail.system_quantity;
        let mut active: stocktaking_detail::ActiveModel = detail.into();
        active.actual_quantity = Set(actual_quantity);
        active.difference = Set(actual_quantity - system_quantity);
        if notes.is_some() {
            active.notes = Set(notes);
        }
        active.update(db).await.map_err(ServiceError::db_error)
    }

    /// Writes every counted quantity to the ledger and closes the sheet.
    ///
    /// The ledger is overwritten, not adjusted. All details are applied in one
    /// transaction; a sheet can be confirmed once.
    #[instrument(skip(self))]
    pub async fn confirm(
        &self,
        stocktaking_id: Uuid,
        actor: &str,
    ) -> Result<stocktaking::Model, ServiceError> {
        let txn = self.db.begin().await.map_err(ServiceError::db_error)?;

        let sheet = find_sheet(&txn, stocktaking_id).await?;
        let now = Utc::now();
        // Conditional flip guards against two confirmations racing
        let flipped = StocktakingEntity::update_many()
            .col_expr(stocktaking::Column::Status, Expr::value(StocktakingStatus::Confirmed))
            .col_expr(stocktaking::Column::ConfirmedAt, Expr::value(Some(now)))
            .col_expr(stocktaking::Column::UpdatedAt, Expr::value(now))
            .filter(stocktaking::Column::Id.eq(stocktaking_id))
            .filter(stocktaking::Column::Status.eq(StocktakingStatus::Draft))
            .exec(&txn)
            .await
            .map_err(ServiceError::db_error)?;
        if flipped.rows_affected == 0 {
            return Err(ServiceError::InvalidState(format!(
                "Stocktaking {} is already confirmed",
                stocktaking_id
            )));
        }

        let details = details_in(&txn, stocktaking_id).await?;
        let mut counted = Vec::with_capacity(details.len());
        for detail in &details {
            let item = detail.item()?;
            self.inventory
                .set_quantity_in(&txn, &sheet.store_id, &item, detail.actual_quantity, actor)
                .await?;
            counted.push((item, detail.actual_quantity));
        }

        let confirmed = find_sheet(&txn, stocktaking_id).await?;
        txn.commit().await.map_err(|e| {
            error!("Failed to commit stocktaking {}: {}", stocktaking_id, e);
            ServiceError::db_error(e)
        })?;

        info!(%stocktaking_id, items = counted.len(), "Stocktaking confirmed");
        let items_applied = counted.len();
        for (item, quantity) in counted {
            self.event_sender
                .publish(Event::InventoryCounted {
                    store_id: confirmed.store_id.clone(),
                    item,
                    quantity,
                    actor: actor.to_string(),
                })
                .await;
        }
        self.event_sender
            .publish(Event::StocktakingConfirmed {
                stocktaking_id,
                store_id: confirmed.store_id.clone(),
                items_applied,
            })
            .await;
        Ok(confirmed)
    }

    #[instrument(skip(self))]
    pub async fn analysis(&self, stocktaking_id: Uuid) -> Result<StocktakingAnalysis, ServiceError> {
        let db = self.db.as_ref();
        find_sheet(db, stocktaking_id).await?;
        let details = details_in(db, stocktaking_id).await?;
        StocktakingAnalysis::from_details(&details, self.top_differences_limit)
    }

    pub async fn list_stocktakings(
        &self,
        store_id: Option<&str>,
    ) -> Result<Vec<stocktaking::Model>, ServiceError> {
        let mut query = StocktakingEntity::find();
        if let Some(store_id) = store_id {
            query = query.filter(stocktaking::Column::StoreId.eq(store_id));
        }
        query
            .order_by_desc(stocktaking::Column::StocktakingDate)
            .order_by_desc(stocktaking::Column::CreatedAt)
            .all(self.db.as_ref())
            .await
            .map_err(ServiceError::db_error)
    }

    #[instrument(skip(self))]
    pub async fn get_stocktaking(
        &self,
        stocktaking_id: Uuid,
    ) -> Result<StocktakingWithDetails, ServiceError> {
        let db = self.db.as_ref();
        let stocktaking = find_sheet(db, stocktaking_id).await?;
        let details = details_in(db, stocktaking_id).await?;
        Ok(StocktakingWithDetails {
            stocktaking,
            details,
        })
    }
}

fn validate_count(actual_quantity: Decimal) -> Result<(), ServiceError> {
    if actual_quantity.is_sign_negative() && !actual_quantity.is_zero() {
        return Err(ServiceError::ValidationError(
            "Counted quantity must not be negative".to_string(),
        ));
    }
    Ok(())
}

async fn find_sheet<C: ConnectionTrait>(
    conn: &C,
    stocktaking_id: Uuid,
) -> Result<stocktaking::Model, ServiceError> {
    StocktakingEntity::find_by_id(stocktaking_id)
        .one(conn)
        .await
        .map_err(ServiceError::db_error)?
        .ok_or_else(|| ServiceError::NotFound(format!("Stocktaking {} not found", stocktaking_id)))
}

async fn find_editable_sheet<C: ConnectionTrait>(
    conn: &C,
    stocktaking_id: Uuid,
) -> Result<stocktaking::Model, ServiceError> {
    let sheet = find_sheet(conn, stocktaking_id).await?;
    if !sheet.status.is_editable() {
        return Err(ServiceError::InvalidState(format!(
            "Stocktaking {} is {} and can no longer be edited",
            stocktaking_id, sheet.status
        )));
    }
    Ok(sheet)
}

async fn details_in<C: ConnectionTrait>(
    conn: &C,
    stocktaking_id: Uuid,
) -> Result<Vec<stocktaking_detail::Model>, ServiceError> {
    StocktakingDetailEntity::find()
        .filter(stocktaking_detail::Column::StocktakingId.eq(stocktaking_id))
        .order_by_asc(stocktaking_detail::Column::CreatedAt)
        .order_by_asc(stocktaking_detail::Column::ProductId)
        .order_by_asc(stocktaking_detail::Column::WipItemId)
        .all(conn)
        .await
        .map_err(ServiceError::db_error)
}
