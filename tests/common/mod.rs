#![allow(dead_code)]

use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{Method, Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use kitchen_ledger::{
    config::AppConfig,
    db::{self, DbConfig},
    entities::{category::CategoryType, store::StoreType},
    events::{process_events, Event, EventHandler, EventSender, LoggingEventHandler},
    models::{ItemRef, RecipeOwner},
    services::catalog::{NewCategory, NewMenu, NewProduct, NewStore, NewWipItem},
    AppState,
};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde_json::Value;
use tokio::sync::{mpsc, Mutex};
use tower::ServiceExt;

pub const KITCHEN: &str = "S001";
pub const SHOP: &str = "S003";
pub const ONION: &str = "I010";
pub const SOY_SAUCE: &str = "I030";
pub const MIRIN: &str = "I032";
pub const SUGAR: &str = "I034";
pub const BRAISED_ONION: &str = "W002";
pub const ONION_BOWL: &str = "M001";
pub const SUPPLIER: &str = "SUP01";

/// Keeps every event that reaches the channel so tests can assert on them.
#[derive(Default)]
pub struct EventRecorder(Mutex<Vec<Event>>);

#[async_trait]
impl EventHandler for EventRecorder {
    async fn handle_event(&self, event: &Event) -> Result<(), String> {
        self.0.lock().await.push(event.clone());
        Ok(())
    }
}

impl EventRecorder {
    pub async fn snapshot(&self) -> Vec<Event> {
        self.0.lock().await.clone()
    }
}

/// Application state over a private in-memory SQLite database.
pub struct TestApp {
    router: Router,
    pub state: AppState,
    pub events: Arc<EventRecorder>,
    _event_task: tokio::task::JoinHandle<()>,
}

impl TestApp {
    pub async fn new() -> Self {
        Self::with_config(|_| {}).await
    }

    /// Builds the app after letting the caller tweak the configuration.
    pub async fn with_config(tweak: impl FnOnce(&mut AppConfig)) -> Self {
        let mut cfg = AppConfig::new(
            "sqlite::memory:".to_string(),
            "127.0.0.1".to_string(),
            18_080,
            "test".to_string(),
        );
        tweak(&mut cfg);

        let pool = db::establish_connection_with_config(&DbConfig::in_memory_sqlite())
            .await
            .expect("failed to open in-memory database");
        db::run_migrations(&pool)
            .await
            .expect("failed to run migrations in tests");

        let (event_tx, event_rx) = mpsc::channel(cfg.event_channel_capacity);
        let events = Arc::new(EventRecorder::default());
        let handlers: Vec<Arc<dyn EventHandler>> =
            vec![events.clone(), Arc::new(LoggingEventHandler)];
        let event_task = tokio::spawn(process_events(event_rx, handlers));

        let state = AppState::new(Arc::new(pool), cfg, Arc::new(EventSender::new(event_tx)));
        let router = kitchen_ledger::app(state.clone());

        let app = Self {
            router,
            state,
            events,
            _event_task: event_task,
        };
        app.seed_catalog().await;
        app
    }

    /// Two locations, four seasonings/vegetables, one WIP item and its recipe.
    async fn seed_catalog(&self) {
        let catalog = &self.state.services.catalog;

        for (id, name, store_type) in [
            (KITCHEN, "Central kitchen", StoreType::Kitchen),
            (SHOP, "Ekimae shop", StoreType::Store),
        ] {
            catalog
                .create_store(NewStore {
                    id: id.to_string(),
                    name: name.to_string(),
                    store_type,
                    address: None,
                    phone: None,
                })
                .await
                .expect("seed store");
        }

        catalog
            .create_category(NewCategory {
                id: "C-ING".to_string(),
                name: "Ingredients".to_string(),
                category_type: CategoryType::Ingredient,
                parent_id: None,
                display_order: 1,
            })
            .await
            .expect("seed category");

        for (id, name, unit, min_stock, unit_price) in [
            (ONION, "Onion", "g", Some(dec!(2000)), Some(dec!(0.5))),
            (SOY_SAUCE, "Soy sauce", "ml", Some(dec!(500)), Some(dec!(0.25))),
            (MIRIN, "Mirin", "ml", None, Some(dec!(0.75))),
            (SUGAR, "Sugar", "g", None, None),
        ] {
            catalog
                .create_product(NewProduct {
                    id: id.to_string(),
                    name: name.to_string(),
                    unit: unit.to_string(),
                    category_id: Some("C-ING".to_string()),
                    unit_price,
                    supplier_id: Some(SUPPLIER.to_string()),
                    min_stock,
                    ..Default::default()
                })
                .await
                .expect("seed product");
        }

        catalog
            .create_wip_item(NewWipItem {
                id: BRAISED_ONION.to_string(),
                name: "Braised onion".to_string(),
                unit: "kg".to_string(),
                shelf_life_days: Some(3),
                ..Default::default()
            })
            .await
            .expect("seed wip item");

        catalog
            .create_menu(NewMenu {
                id: ONION_BOWL.to_string(),
                name: "Onion bowl".to_string(),
                category_id: None,
                price: dec!(680),
            })
            .await
            .expect("seed menu");

        let recipes = &self.state.services.recipes;
        let wip = RecipeOwner::Wip(BRAISED_ONION.to_string());
        for (product, quantity, unit) in [
            (ONION, dec!(1000), "g"),
            (SOY_SAUCE, dec!(50), "ml"),
            (MIRIN, dec!(30), "ml"),
            (SUGAR, dec!(10), "g"),
        ] {
            recipes
                .add_line(wip.clone(), ItemRef::product(product), quantity, unit)
                .await
                .expect("seed recipe line");
        }
    }

    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Sets the on-hand quantity of a product through the ledger.
    pub async fn stock(&self, store_id: &str, product_id: &str, quantity: Decimal) {
        self.state
            .services
            .inventory
            .set_quantity(store_id, &ItemRef::product(product_id), quantity, "seed")
            .await
            .expect("seed stock");
    }

    pub async fn on_hand(&self, store_id: &str, item: &ItemRef) -> Decimal {
        self.state
            .services
            .inventory
            .get_quantity(store_id, item)
            .await
            .expect("read stock")
    }

    /// Waits until the event processor has drained what was published so far.
    pub async fn recorded_events(&self) -> Vec<Event> {
        for _ in 0..20 {
            tokio::task::yield_now().await;
        }
        self.events.snapshot().await
    }

    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder()
            .method(method)
            .uri(uri)
            .header("x-user-id", "tester");
        let body = match body {
            Some(json) => {
                builder = builder.header("content-type", "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };

        let response = self
            .router()
            .oneshot(builder.body(body).expect("request"))
            .await
            .expect("router response");
        let status = response.status();
        let bytes = response
            .into_body()
            .collect()
            .await
            .expect("response body")
            .to_bytes();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, value)
    }

    pub async fn get(&self, uri: &str) -> (StatusCode, Value) {
        self.request(Method::GET, uri, None).await
    }

    pub async fn post(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        self.request(Method::POST, uri, Some(body)).await
    }
}
