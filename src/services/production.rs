use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, error, info, instrument};
use uuid::Uuid;
use validator::Validate;

use crate::{
    entities::wip_production::{self, Entity as WipProductionEntity},
    errors::ServiceError,
    events::{Event, EventSender},
    models::{ItemRef, RecipeOwner},
    services::{
        catalog::{require_product, require_store, require_wip_item},
        inventory::InventoryService,
        recipes::RecipeService,
    },
};

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct RecordProductionInput {
    #[validate(length(min = 1))]
    pub store_id: String,
    #[validate(length(min = 1))]
    pub wip_item_id: String,
    pub quantity: Decimal,
    #[validate(length(min = 1))]
    pub unit: String,
    pub production_date: Option<DateTime<Utc>>,
    pub expiry_date: Option<DateTime<Utc>>,
    pub employee_id: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IngredientRequirement {
    pub product_id: String,
    pub product_name: String,
    pub required_quantity: Decimal,
    pub available_quantity: Decimal,
    /// max(0, required - available)
    pub shortage: Decimal,
    pub unit: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IngredientCheck {
    pub can_produce: bool,
    pub requirements: Vec<IngredientRequirement>,
}

/// In-house production of WIP items: consumes raw products per recipe and
/// books the output into the WIP ledger.
#[derive(Clone)]
pub struct ProductionService {
    db: Arc<DatabaseConnection>,
    event_sender: Arc<EventSender>,
    inventory: InventoryService,
    recipes: RecipeService,
}

impl ProductionService {
    pub fn new(
        db: Arc<DatabaseConnection>,
        event_sender: Arc<EventSender>,
        inventory: InventoryService,
        recipes: RecipeService,
    ) -> Self {
        Self {
            db,
            event_sender,
            inventory,
            recipes,
        }
    }

    /// Compares the scaled recipe against on-hand product quantities.
    ///
    /// Advisory only: [`Self::record_production`] does not call it.
    #[instrument(skip(self))]
    pub async fn check_required_ingredients(
        &self,
        store_id: &str,
        wip_item_id: &str,
        batch_quantity: Decimal,
    ) -> Result<IngredientCheck, ServiceError> {
        if batch_quantity <= Decimal::ZERO {
            return Err(ServiceError::ValidationError(
                "Batch quantity must be positive".to_string(),
            ));
        }
        let db = self.db.as_ref();
        require_store(db, store_id).await?;
        require_wip_item(db, wip_item_id).await?;

        let expanded = self
            .recipes
            .expand_in(db, &RecipeOwner::Wip(wip_item_id.to_string()), batch_quantity)
            .await?;

        let mut requirements = Vec::with_capacity(expanded.len());
        for requirement in expanded {
            let ItemRef::Product(product_id) = &requirement.input else {
                continue;
            };
            let product = require_product(db, product_id).await?;
            let available_quantity = self
                .inventory
                .quantity_in(db, store_id, &requirement.input)
                .await?;
            let shortage = (requirement.required_quantity - available_quantity).max(Decimal::ZERO);
            requirements.push(IngredientRequirement {
                product_id: product.id,
                product_name: product.name,
                required_quantity: requirement.required_quantity,
                available_quantity,
                shortage,
                unit: requirement.unit,
            });
        }

        Ok(IngredientCheck {
            can_produce: requirements.iter().all(|r| r.shortage.is_zero()),
            requirements,
        })
    }

    /// Logs a production batch, consumes its raw products and books the output.
    ///
    /// Runs in one transaction. Stock is not pre-checked; whether consumption
    /// may go negative is up to the ledger's policy. WIP inputs of the recipe
    /// are not consumed.
    #[instrument(skip(self))]
    pub async fn record_production(
        &self,
        input: RecordProductionInput,
        actor: &str,
    ) -> Result<wip_production::Model, ServiceError> {
        input.validate()?;
        if input.quantity <= Decimal::ZERO {
            return Err(ServiceError::ValidationError(
                "Production quantity must be positive".to_string(),
            ));
        }

        let txn = self.db.begin().await.map_err(ServiceError::db_error)?;

        require_store(&txn, &input.store_id).await?;
        let wip = require_wip_item(&txn, &input.wip_item_id).await?;

        let production_date = input.production_date.unwrap_or_else(Utc::now);
        let expiry_date = input.expiry_date.or_else(|| {
            wip.shelf_life_days
                .map(|days| production_date + Duration::days(i64::from(days)))
        });

        let production = wip_production::ActiveModel {
            id: Set(Uuid::new_v4()),
            store_id: Set(input.store_id.clone()),
            wip_item_id: Set(input.wip_item_id.clone()),
            quantity: Set(input.quantity),
            unit: Set(input.unit),
            production_date: Set(production_date),
            expiry_date: Set(expiry_date),
            employee_id: Set(input.employee_id),
            notes: Set(input.notes),
            created_at: Set(Utc::now()),
        }
        .insert(&txn)
        .await
        .map_err(|e| {
            error!("Failed to log production: {}", e);
            ServiceError::db_error(e)
        })?;

        let requirements = self
            .recipes
            .expand_in(&txn, &RecipeOwner::Wip(wip.id.clone()), input.quantity)
            .await?;
        let mut consumed = Vec::with_capacity(requirements.len());
        for requirement in requirements {
            if let ItemRef::Wip(ref used) = requirement.input {
                debug!(wip_item_id = %used, "WIP input not consumed");
                continue;
            }
            let delta = -requirement.required_quantity;
            let new_quantity = self
                .inventory
                .adjust_quantity_in(&txn, &input.store_id, &requirement.input, delta, actor)
                .await?;
            consumed.push((requirement.input, delta, new_quantity));
        }

        let wip_quantity = self
            .inventory
            .receive_wip_batch_in(
                &txn,
                &input.store_id,
                &wip.id,
                input.quantity,
                production_date,
                expiry_date,
                actor,
            )
            .await?;

        txn.commit().await.map_err(|e| {
            error!("Failed to commit production: {}", e);
            ServiceError::db_error(e)
        })?;

        info!(
            production_id = %production.id,
            wip_item_id = %wip.id,
            quantity = %production.quantity,
            %wip_quantity,
            "Production recorded"
        );

        for (item, delta, new_quantity) in consumed {
            self.event_sender
                .publish(Event::InventoryAdjusted {
                    store_id: production.store_id.clone(),
                    item,
                    delta,
                    new_quantity,
                    actor: actor.to_string(),
                })
                .await;
        }
        self.event_sender
            .publish(Event::WipProduced {
                production_id: production.id,
                store_id: production.store_id.clone(),
                wip_item_id: production.wip_item_id.clone(),
                quantity: production.quantity,
                produced_at: production.production_date,
            })
            .await;

        Ok(production)
    }

    /// Production log, oldest first.
    #[instrument(skip(self))]
    pub async fn get_production_history(
        &self,
        store_id: Option<&str>,
        wip_item_id: Option<&str>,
    ) -> Result<Vec<wip_production::Model>, ServiceError> {
        let mut query = WipProductionEntity::find();
        if let Some(store_id) = store_id {
            query = query.filter(wip_production::Column::StoreId.eq(store_id));
        }
        if let Some(wip_item_id) = wip_item_id {
            query = query.filter(wip_production::Column::WipItemId.eq(wip_item_id));
        }
        query
            .order_by_asc(wip_production::Column::ProductionDate)
            .order_by_asc(wip_production::Column::CreatedAt)
            .all(self.db.as_ref())
            .await
            .map_err(ServiceError::db_error)
    }
}
