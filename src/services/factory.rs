use sea_orm::DatabaseConnection;
use std::sync::Arc;

use crate::{
    config::InventoryConfig,
    events::EventSender,
    services::{
        catalog::CatalogService,
        inventory::{InventoryService, NegativeStockPolicy},
        procurement::ProcurementService,
        production::ProductionService,
        recipes::RecipeService,
        stocktaking::StocktakingService,
    },
};

/// Factory for creating service instances with shared dependencies
pub struct ServiceFactory {
    db: Arc<DatabaseConnection>,
    event_sender: Arc<EventSender>,
    settings: InventoryConfig,
}

impl ServiceFactory {
    pub fn new(
        db: Arc<DatabaseConnection>,
        event_sender: Arc<EventSender>,
        settings: InventoryConfig,
    ) -> Self {
        Self {
            db,
            event_sender,
            settings,
        }
    }

    pub fn catalog_service(&self) -> CatalogService {
        CatalogService::new(self.db.clone())
    }

    pub fn recipe_service(&self) -> RecipeService {
        RecipeService::new(self.db.clone())
    }

    /// The ledger, with the negative-stock policy taken from settings
    pub fn inventory_service(&self) -> InventoryService {
        InventoryService::new(
            self.db.clone(),
            self.event_sender.clone(),
            NegativeStockPolicy::from_allow_flag(self.settings.allow_negative_stock),
        )
    }

    pub fn procurement_service(&self) -> ProcurementService {
        ProcurementService::new(
            self.db.clone(),
            self.event_sender.clone(),
            self.inventory_service(),
            self.settings.clone(),
        )
    }

    pub fn stocktaking_service(&self) -> StocktakingService {
        StocktakingService::new(
            self.db.clone(),
            self.event_sender.clone(),
            self.inventory_service(),
            self.settings.top_differences_limit,
        )
    }

    pub fn production_service(&self) -> ProductionService {
        ProductionService::new(
            self.db.clone(),
            self.event_sender.clone(),
            self.inventory_service(),
            self.recipe_service(),
        )
    }

    pub fn db(&self) -> &Arc<DatabaseConnection> {
        &self.db
    }

    pub fn event_sender(&self) -> &Arc<EventSender> {
        &self.event_sender
    }
}

/// Service container holding all service instances
#[derive(Clone)]
pub struct ServiceContainer {
    pub catalog: Arc<CatalogService>,
    pub recipes: Arc<RecipeService>,
    pub inventory: Arc<InventoryService>,
    pub procurement: Arc<ProcurementService>,
    pub stocktaking: Arc<StocktakingService>,
    pub production: Arc<ProductionService>,
}

impl ServiceContainer {
    /// Creates a new service container with all services initialized
    pub fn new(factory: &ServiceFactory) -> Self {
        Self {
            catalog: Arc::new(factory.catalog_service()),
            recipes: Arc::new(factory.recipe_service()),
            inventory: Arc::new(factory.inventory_service()),
            procurement: Arc::new(factory.procurement_service()),
            stocktaking: Arc::new(factory.stocktaking_service()),
            production: Arc::new(factory.production_service()),
        }
    }
}
