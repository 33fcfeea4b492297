use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use rust_decimal::Decimal;
use sea_orm::{
    sea_query::Expr, ActiveModelTrait, ActiveValue::Set, ColumnTrait, ConnectionTrait,
    DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{error, info, instrument, warn};
use uuid::Uuid;
use validator::Validate;

use crate::{
    config::InventoryConfig,
    entities::{
        inventory_record::{self, Entity as InventoryRecordEntity},
        product::{self, Entity as ProductEntity},
        purchase_order::{self, Entity as PurchaseOrderEntity, OrderStatus},
        purchase_order_line::{self, Entity as PurchaseOrderLineEntity},
    },
    errors::ServiceError,
    events::{Event, EventSender},
    models::ItemRef,
    services::{
        catalog::{require_product, require_store},
        inventory::InventoryService,
    },
};

/// Supplier key for products without a supplier reference.
pub const UNKNOWN_SUPPLIER: &str = "UNKNOWN";

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct CreateOrderInput {
    #[validate(length(min = 1))]
    pub store_id: String,
    pub supplier_id: Option<String>,
    pub employee_id: Option<String>,
    pub order_date: Option<DateTime<Utc>>,
    pub expected_delivery_date: Option<DateTime<Utc>>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct AddOrderLineInput {
    #[validate(length(min = 1))]
    pub product_id: String,
    pub quantity: Decimal,
    #[validate(length(min = 1))]
    pub unit: String,
    pub unit_price: Decimal,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Copy, Deserialize, Serialize)]
pub struct ReceivedLine {
    pub line_id: Uuid,
    pub quantity: Decimal,
}

/// A line of an auto-generated order, as proposed by [`SupplierRecommendation`].
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RecommendedLine {
    pub product_id: String,
    pub quantity: Decimal,
    pub unit: String,
    #[serde(default)]
    pub unit_price: Decimal,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct FromRecommendationInput {
    #[validate(length(min = 1))]
    pub store_id: String,
    pub supplier_id: Option<String>,
    #[validate(length(min = 1))]
    pub lines: Vec<RecommendedLine>,
    pub employee_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecommendationItem {
    pub product_id: String,
    pub product_name: String,
    pub current_stock: Decimal,
    pub min_stock: Decimal,
    pub shortage: Decimal,
    pub order_quantity: Decimal,
    pub unit: String,
    pub unit_price: Decimal,
    pub estimated_amount: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SupplierRecommendation {
    pub supplier_id: String,
    pub items: Vec<RecommendationItem>,
    pub total_amount: Decimal,
    pub item_count: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct OrderWithLines {
    #[serde(flatten)]
    pub order: purchase_order::Model,
    pub lines: Vec<purchase_order_line::Model>,
}

/// Order total: the sum of every line amount.
pub fn order_total(lines: &[purchase_order_line::Model]) -> Decimal {
    lines.iter().map(|line| line.amount).sum()
}

/// Groups low-stock products by supplier and proposes reorder quantities.
///
/// `stock` pairs each product with its on-hand quantity. Products without a
/// minimum, or with more on hand than the minimum, are skipped. The proposed
/// quantity is the product's order unit, or `fallback_multiplier` times its
/// minimum when no order unit is set. Groups appear in the order their first
/// product does.
pub fn group_recommendations(
    stock: impl IntoIterator<Item = (product::Model, Decimal)>,
    fallback_multiplier: u32,
) -> Vec<SupplierRecommendation> {
    let mut groups: Vec<SupplierRecommendation> = Vec::new();

    for (product, on_hand) in stock {
        let Some(min_stock) = product.min_stock else {
            continue;
        };
        if on_hand > min_stock {
            continue;
        }

        let order_quantity = product
            .order_unit
            .filter(|unit| *unit > Decimal::ZERO)
            .unwrap_or_else(|| min_stock * Decimal::from(fallback_multiplier));
        let unit_price = product.unit_price.unwrap_or(Decimal::ZERO);
        let item = RecommendationItem {
            product_id: product.id,
            product_name: product.name,
            current_stock: on_hand,
            min_stock,
            shortage: min_stock - on_hand,
            order_quantity,
            unit: product.unit,
            unit_price,
            estimated_amount: order_quantity * unit_price,
        };

        let supplier_id = product
            .supplier_id
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| UNKNOWN_SUPPLIER.to_string());
        let group = match groups.iter().position(|g| g.supplier_id == supplier_id) {
            Some(index) => &mut groups[index],
            None => {
                groups.push(SupplierRecommendation {
                    supplier_id,
                    items: Vec::new(),
                    total_amount: Decimal::ZERO,
                    item_count: 0,
                });
                let last = groups.len() - 1;
                &mut groups[last]
            }
        };
        group.total_amount += item.estimated_amount;
        group.item_count += 1;
        group.items.push(item);
    }

    groups
}

fn generate_order_number(now: DateTime<Utc>) -> String {
    let suffix = Uuid::new_v4().simple().to_string()[..8].to_uppercase();
    format!("ORD-{}-{}", now.format("%Y"), suffix)
}

/// Purchase order lifecycle: creation, lines, status changes, reorder
/// recommendations and delivery receipt into the stock ledger.
#[derive(Clone)]
pub struct ProcurementService {
    db: Arc<DatabaseConnection>,
    event_sender: Arc<EventSender>,
    inventory: InventoryService,
    settings: InventoryConfig,
    order_locks: Arc<DashMap<Uuid, Arc<Mutex<()>>>>,
}

impl ProcurementService {
    pub fn new(
        db: Arc<DatabaseConnection>,
        event_sender: Arc<EventSender>,
        inventory: InventoryService,
        settings: InventoryConfig,
    ) -> Self {
        Self {
            db,
            event_sender,
            inventory,
            settings,
            order_locks: Arc::new(DashMap::new()),
        }
    }

    /// Creates a DRAFT order with a zero total.
    #[instrument(skip(self))]
    pub async fn create_order(
        &self,
        input: CreateOrderInput,
    ) -> Result<purchase_order::Model, ServiceError> {
        input.validate()?;
        let order = self.create_order_in(self.db.as_ref(), input, false).await?;
        info!(order_id = %order.id, order_number = %order.order_number, "Purchase order created");

        self.event_sender
            .publish(Event::OrderCreated {
                order_id: order.id,
                order_number: order.order_number.clone(),
                store_id: order.store_id.clone(),
                is_auto_order: false,
            })
            .await;
        Ok(order)
    }

    async fn create_order_in<C: ConnectionTrait>(
        &self,
        conn: &C,
        input: CreateOrderInput,
        is_auto_order: bool,
    ) -> Result<purchase_order::Model, ServiceError> {
        require_store(conn, &input.store_id).await?;

        let now = Utc::now();
        purchase_order::ActiveModel {
            id: Set(Uuid::new_v4()),
            order_number: Set(generate_order_number(now)),
            store_id: Set(input.store_id),
            supplier_id: Set(input.supplier_id),
            order_date: Set(input.order_date.unwrap_or(now)),
            expected_delivery_date: Set(input.expected_delivery_date),
            actual_delivery_date: Set(None),
            status: Set(OrderStatus::Draft),
            is_auto_order: Set(is_auto_order),
            employee_id: Set(input.employee_id),
            total_amount: Set(Decimal::ZERO),
            notes: Set(input.notes),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(conn)
        .await
        .map_err(|e| {
            error!("Failed to create purchase order: {}", e);
            ServiceError::db_error(e)
        })
    }

    /// Attaches a line and recomputes the order total from all of its lines.
    ///
    /// Calls for the same order are serialized so concurrent additions cannot
    /// interleave their total recomputes.
    #[instrument(skip(self))]
    pub async fn add_order_line(
        &self,
        order_id: Uuid,
        input: AddOrderLineInput,
    ) -> Result<purchase_order_line::Model, ServiceError> {
        input.validate()?;
        if input.quantity <= Decimal::ZERO {
            return Err(ServiceError::ValidationError(
                "Quantity must be positive".to_string(),
            ));
        }
        if input.unit_price <= Decimal::ZERO {
            return Err(ServiceError::ValidationError(
                "Unit price must be positive".to_string(),
            ));
        }

        let lock = self.acquire_order_lock(order_id);
        let guard = lock.lock().await;
        let result = self.add_order_line_locked(order_id, input).await;
        drop(guard);
        self.release_order_lock(order_id, lock);
        result
    }

    async fn add_order_line_locked(
        &self,
        order_id: Uuid,
        input: AddOrderLineInput,
    ) -> Result<purchase_order_line::Model, ServiceError> {
        let txn = self.db.begin().await.map_err(ServiceError::db_error)?;

        let order = find_order(&txn, order_id).await?;
        if !order.status.accepts_lines() {
            return Err(ServiceError::InvalidState(format!(
                "Order {} is {} and no longer accepts lines",
                order.order_number, order.status
            )));
        }

        let line = self.insert_line_in(&txn, order_id, input).await?;
        let total = recompute_total_in(&txn, order_id).await?;

        txn.commit().await.map_err(|e| {
            error!("Failed to commit order line: {}", e);
            ServiceError::db_error(e)
        })?;

        info!(%order_id, line_id = %line.id, %total, "Order line added");
        Ok(line)
    }

    async fn insert_line_in<C: ConnectionTrait>(
        &self,
        conn: &C,
        order_id: Uuid,
        input: AddOrderLineInput,
    ) -> Result<purchase_order_line::Model, ServiceError> {
        require_product(conn, &input.product_id).await?;

        let now = Utc::now();
        purchase_order_line::ActiveModel {
            id: Set(Uuid::new_v4()),
            order_id: Set(order_id),
            product_id: Set(input.product_id),
            amount: Set(input.quantity * input.unit_price),
            quantity: Set(input.quantity),
            unit: Set(input.unit),
            unit_price: Set(input.unit_price),
            received_quantity: Set(Decimal::ZERO),
            notes: Set(input.notes),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(conn)
        .await
        .map_err(|e| {
            error!("Failed to insert order line: {}", e);
            ServiceError::db_error(e)
        })
    }

    /// Moves the order along its status table.
    ///
    /// DELIVERED is refused here; [`Self::confirm_delivery`] is the only way
    /// into it because it also books the received stock.
    #[instrument(skip(self))]
    pub async fn update_status(
        &self,
        order_id: Uuid,
        new_status: OrderStatus,
    ) -> Result<purchase_order::Model, ServiceError> {
        let db = self.db.as_ref();
        let order = find_order(db, order_id).await?;
        let old_status = order.status;
        if new_status.requires_receipt() {
            warn!(%order_id, %old_status, "Status update to DELIVERED refused");
            return Err(ServiceError::InvalidState(format!(
                "Order {} is marked {} by confirming its delivery, which also receives the stock",
                order.order_number, new_status
            )));
        }
        if !old_status.can_transition_to(new_status) {
            return Err(ServiceError::InvalidState(format!(
                "Order {} cannot move from {} to {}",
                order.order_number, old_status, new_status
            )));
        }

        let now = Utc::now();
        let mut active: purchase_order::ActiveModel = order.into();
        active.status = Set(new_status);
        active.updated_at = Set(now);
        let updated = active.update(db).await.map_err(|e| {
            error!("Failed to update order status: {}", e);
            ServiceError::db_error(e)
        })?;

        info!(%order_id, %old_status, %new_status, "Order status updated");
        self.event_sender
            .publish(Event::OrderStatusChanged {
                order_id,
                old_status: old_status.to_string(),
                new_status: new_status.to_string(),
            })
            .await;
        Ok(updated)
    }

    /// Low-stock products at a location, grouped by supplier.
    #[instrument(skip(self))]
    pub async fn generate_recommendations(
        &self,
        store_id: &str,
    ) -> Result<Vec<SupplierRecommendation>, ServiceError> {
        let db = self.db.as_ref();
        require_store(db, store_id).await?;

        let rows = InventoryRecordEntity::find()
            .filter(inventory_record::Column::StoreId.eq(store_id))
            .order_by_asc(inventory_record::Column::ProductId)
            .find_also_related(ProductEntity)
            .filter(product::Column::MinStock.is_not_null())
            .all(db)
            .await
            .map_err(ServiceError::db_error)?;

        let stock = rows
            .into_iter()
            .filter_map(|(record, product)| product.map(|p| (p, record.quantity)));
        Ok(group_recommendations(
            stock,
            self.settings.reorder_fallback_multiplier,
        ))
    }

    /// Creates an auto order from recommended lines in one transaction.
    ///
    /// Recommended lines may carry a zero unit price for products without
    /// one; quantities must still be positive.
    #[instrument(skip(self))]
    pub async fn create_from_recommendation(
        &self,
        input: FromRecommendationInput,
    ) -> Result<OrderWithLines, ServiceError> {
        input.validate()?;
        for line in &input.lines {
            if line.quantity <= Decimal::ZERO {
                return Err(ServiceError::ValidationError(format!(
                    "Quantity for {} must be positive",
                    line.product_id
                )));
            }
            if line.unit_price.is_sign_negative() {
                return Err(ServiceError::ValidationError(format!(
                    "Unit price for {} must not be negative",
                    line.product_id
                )));
            }
        }

        let supplier_id = input
            .supplier_id
            .filter(|s| !s.trim().is_empty() && s != UNKNOWN_SUPPLIER);
        let now = Utc::now();
        let header = CreateOrderInput {
            store_id: input.store_id,
            supplier_id,
            employee_id: input.employee_id,
            order_date: Some(now),
            expected_delivery_date: Some(
                now + Duration::days(self.settings.default_delivery_lead_days),
            ),
            notes: None,
        };

        let txn = self.db.begin().await.map_err(ServiceError::db_error)?;
        let order = self.create_order_in(&txn, header, true).await?;
        let mut lines = Vec::with_capacity(input.lines.len());
        for line in input.lines {
            let created = self
                .insert_line_in(
                    &txn,
                    order.id,
                    AddOrderLineInput {
                        product_id: line.product_id,
                        quantity: line.quantity,
                        unit: line.unit,
                        unit_price: line.unit_price,
                        notes: None,
                    },
                )
                .await?;
            lines.push(created);
        }
        recompute_total_in(&txn, order.id).await?;
        let order = find_order(&txn, order.id).await?;

        txn.commit().await.map_err(|e| {
            error!("Failed to commit recommended order: {}", e);
            ServiceError::db_error(e)
        })?;

        info!(order_id = %order.id, lines = lines.len(), "Order created from recommendation");
        self.event_sender
            .publish(Event::OrderCreated {
                order_id: order.id,
                order_number: order.order_number.clone(),
                store_id: order.store_id.clone(),
                is_auto_order: true,
            })
            .await;
        Ok(OrderWithLines { order, lines })
    }

    /// Receives an ORDERED order into the ledger and marks it DELIVERED.
    ///
    /// Each received line stores its quantity and increments the product's
    /// on-hand quantity at the order's location. Runs in one transaction.
    #[instrument(skip(self))]
    pub async fn confirm_delivery(
        &self,
        order_id: Uuid,
        received: Vec<ReceivedLine>,
        actor: &str,
    ) -> Result<OrderWithLines, ServiceError> {
        let mut seen = HashSet::new();
        for line in &received {
            if line.quantity.is_sign_negative() && !line.quantity.is_zero() {
                return Err(ServiceError::ValidationError(format!(
                    "Received quantity for line {} must not be negative",
                    line.line_id
                )));
            }
            if !seen.insert(line.line_id) {
                return Err(ServiceError::ValidationError(format!(
                    "Line {} is listed more than once",
                    line.line_id
                )));
            }
        }

        let txn = self.db.begin().await.map_err(ServiceError::db_error)?;

        let order = find_order(&txn, order_id).await?;
        if order.status != OrderStatus::Ordered {
            return Err(ServiceError::InvalidState(format!(
                "Order {} is {}; only ORDERED orders can be received",
                order.order_number, order.status
            )));
        }

        let lines: HashMap<Uuid, purchase_order_line::Model> = order_lines_in(&txn, order_id)
            .await?
            .into_iter()
            .map(|line| (line.id, line))
            .collect();

        let now = Utc::now();
        let mut adjustments = Vec::with_capacity(received.len());
        for receipt in &received {
            let line = lines.get(&receipt.line_id).ok_or_else(|| {
                ServiceError::NotFound(format!(
                    "Line {} not found on order {}",
                    receipt.line_id, order.order_number
                ))
            })?;

            let mut active: purchase_order_line::ActiveModel = line.clone().into();
            active.received_quantity = Set(receipt.quantity);
            active.updated_at = Set(now);
            active.update(&txn).await.map_err(ServiceError::db_error)?;

            if receipt.quantity.is_zero() {
                continue;
            }
            let item = ItemRef::Product(line.product_id.clone());
            let new_quantity = self
                .inventory
                .adjust_quantity_in(&txn, &order.store_id, &item, receipt.quantity, actor)
                .await?;
            adjustments.push((item, receipt.quantity, new_quantity));
        }

        let mut active: purchase_order::ActiveModel = order.into();
        active.status = Set(OrderStatus::Delivered);
        active.actual_delivery_date = Set(Some(now));
        active.updated_at = Set(now);
        let order = active.update(&txn).await.map_err(ServiceError::db_error)?;
        let lines = order_lines_in(&txn, order_id).await?;

        txn.commit().await.map_err(|e| {
            error!("Failed to commit delivery for order {}: {}", order_id, e);
            ServiceError::db_error(e)
        })?;

        info!(%order_id, lines_received = received.len(), "Delivery confirmed");
        for (item, delta, new_quantity) in adjustments {
            self.event_sender
                .publish(Event::InventoryAdjusted {
                    store_id: order.store_id.clone(),
                    item,
                    delta,
                    new_quantity,
                    actor: actor.to_string(),
                })
                .await;
        }
        self.event_sender
            .publish(Event::OrderStatusChanged {
                order_id,
                old_status: OrderStatus::Ordered.to_string(),
                new_status: OrderStatus::Delivered.to_string(),
            })
            .await;
        self.event_sender
            .publish(Event::OrderDelivered {
                order_id,
                store_id: order.store_id.clone(),
                lines_received: received.len(),
            })
            .await;

        Ok(OrderWithLines { order, lines })
    }

    #[instrument(skip(self))]
    pub async fn list_orders(
        &self,
        store_id: Option<&str>,
        status: Option<OrderStatus>,
    ) -> Result<Vec<purchase_order::Model>, ServiceError> {
        let mut query = PurchaseOrderEntity::find();
        if let Some(store_id) = store_id {
            query = query.filter(purchase_order::Column::StoreId.eq(store_id));
        }
        if let Some(status) = status {
            query = query.filter(purchase_order::Column::Status.eq(status));
        }
        query
            .order_by_desc(purchase_order::Column::OrderDate)
            .order_by_desc(purchase_order::Column::CreatedAt)
            .all(self.db.as_ref())
            .await
            .map_err(ServiceError::db_error)
    }

    #[instrument(skip(self))]
    pub async fn get_order(&self, order_id: Uuid) -> Result<OrderWithLines, ServiceError> {
        let db = self.db.as_ref();
        let order = find_order(db, order_id).await?;
        let lines = order_lines_in(db, order_id).await?;
        Ok(OrderWithLines { order, lines })
    }

    fn acquire_order_lock(&self, order_id: Uuid) -> Arc<Mutex<()>> {
        self.order_locks
            .entry(order_id)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .value()
            .clone()
    }

    fn release_order_lock(&self, order_id: Uuid, lock: Arc<Mutex<()>>) {
        // One reference held here, one by the map: nobody else is waiting
        self.order_locks.remove_if(&order_id, |_, existing| {
            Arc::ptr_eq(existing, &lock) && Arc::strong_count(existing) == 2
        });
    }
}

async fn find_order<C: ConnectionTrait>(
    conn: &C,
    order_id: Uuid,
) -> Result<purchase_order::Model, ServiceError> {
    PurchaseOrderEntity::find_by_id(order_id)
        .one(conn)
        .await
        .map_err(ServiceError::db_error)?
        .ok_or_else(|| ServiceError::NotFound(format!("Order {} not found", order_id)))
}

async fn order_lines_in<C: ConnectionTrait>(
    conn: &C,
    order_id: Uuid,
) -> Result<Vec<purchase_order_line::Model>, ServiceError> {
    PurchaseOrderLineEntity::find()
        .filter(purchase_order_line::Column::OrderId.eq(order_id))
        .order_by_asc(purchase_order_line::Column::CreatedAt)
        .all(conn)
        .await
        .map_err(ServiceError::db_error)
}

/// Sums every line of the order and writes the result to its header.
async fn recompute_total_in<C: ConnectionTrait>(
    conn: &C,
    order_id: Uuid,
) -> Result<Decimal, ServiceError> {
    let total = order_total(&order_lines_in(conn, order_id).await?);

    let result = PurchaseOrderEntity::update_many()
        .col_expr(purchase_order::Column::TotalAmount, Expr::value(total))
        .col_expr(purchase_order::Column::UpdatedAt, Expr::value(Utc::now()))
        .filter(purchase_order::Column::Id.eq(order_id))
        .exec(conn)
        .await
        .map_err(ServiceError::db_error)?;
    if result.rows_affected == 0 {
        warn!(%order_id, "Order vanished while recomputing its total");
        return Err(ServiceError::NotFound(format!("Order {} not found", order_id)));
    }
    Ok(total)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn product(id: &str, supplier: Option<&str>, min: Option<Decimal>, order_unit: Option<Decimal>) -> product::Model {
        let now = Utc::now();
        product::Model {
            id: id.to_string(),
            name: format!("Product {}", id),
            jan_code: None,
            category_id: None,
            unit: "g".to_string(),
            lot_size: None,
            lot_unit: None,
            unit_price: Some(dec!(0.5)),
            supplier_id: supplier.map(str::to_string),
            min_stock: min,
            order_unit,
            storage_location: None,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn low_stock_product_is_recommended_with_shortage() {
        let groups = group_recommendations(
            vec![(product("I010", Some("SUP1"), Some(dec!(2000)), None), dec!(1800))],
            2,
        );
        assert_eq!(groups.len(), 1);
        let item = &groups[0].items[0];
        assert_eq!(item.shortage, dec!(200));
        assert_eq!(item.order_quantity, dec!(4000));
        assert_eq!(item.estimated_amount, dec!(2000));
        assert_eq!(groups[0].total_amount, dec!(2000));
    }

    #[test]
    fn at_minimum_is_included_above_is_not() {
        let groups = group_recommendations(
            vec![
                (product("A", None, Some(dec!(10)), Some(dec!(25))), dec!(10)),
                (product("B", None, Some(dec!(10)), None), dec!(10.5)),
                (product("C", None, None, None), dec!(-5)),
            ],
            2,
        );
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].supplier_id, UNKNOWN_SUPPLIER);
        assert_eq!(groups[0].item_count, 1);
        assert_eq!(groups[0].items[0].order_quantity, dec!(25));
    }

    #[test]
    fn groups_keep_first_seen_order() {
        let groups = group_recommendations(
            vec![
                (product("A", Some("S2"), Some(dec!(5)), None), dec!(0)),
                (product("B", Some("S1"), Some(dec!(5)), None), dec!(0)),
                (product("C", Some("S2"), Some(dec!(5)), None), dec!(0)),
            ],
            2,
        );
        let suppliers: Vec<_> = groups.iter().map(|g| g.supplier_id.as_str()).collect();
        assert_eq!(suppliers, vec!["S2", "S1"]);
        assert_eq!(groups[0].item_count, 2);
    }

    #[test]
    fn order_number_format() {
        let number = generate_order_number(Utc::now());
        let parts: Vec<_> = number.split('-').collect();
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0], "ORD");
        assert_eq!(parts[1].len(), 4);
        assert_eq!(parts[2].len(), 8);
        assert!(parts[2].chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_lowercase()));
    }
}
