use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures::future::join_all;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::models::ItemRef;

#[derive(Debug, Clone)]
pub struct EventSender {
    sender: mpsc::Sender<Event>,
}

impl EventSender {
    /// Creates a new EventSender
    pub fn new(sender: mpsc::Sender<Event>) -> Self {
        Self { sender }
    }

    /// Sends an event asynchronously
    pub async fn send(&self, event: Event) -> Result<(), String> {
        self.sender
            .send(event)
            .await
            .map_err(|e| format!("Failed to send event: {}", e))
    }

    /// Sends an event after the change it describes has been committed.
    ///
    /// A dropped receiver only costs the notification, so failures are logged
    /// and swallowed.
    pub async fn publish(&self, event: Event) {
        if let Err(e) = self.send(event).await {
            warn!("{}", e);
        }
    }
}

/// Facts published by the reconciliation services once their transaction commits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Event {
    InventoryAdjusted {
        store_id: String,
        item: ItemRef,
        delta: Decimal,
        new_quantity: Decimal,
        actor: String,
    },
    InventoryCounted {
        store_id: String,
        item: ItemRef,
        quantity: Decimal,
        actor: String,
    },
    OrderCreated {
        order_id: Uuid,
        order_number: String,
        store_id: String,
        is_auto_order: bool,
    },
    OrderStatusChanged {
        order_id: Uuid,
        old_status: String,
        new_status: String,
    },
    OrderDelivered {
        order_id: Uuid,
        store_id: String,
        lines_received: usize,
    },
    StocktakingConfirmed {
        stocktaking_id: Uuid,
        store_id: String,
        items_applied: usize,
    },
    WipProduced {
        production_id: Uuid,
        store_id: String,
        wip_item_id: String,
        quantity: Decimal,
        produced_at: DateTime<Utc>,
    },
}

// Handlers implementing this trait receive every event drained from the channel.
#[async_trait]
pub trait EventHandler: Send + Sync {
    async fn handle_event(&self, event: &Event) -> Result<(), String>;
}

/// Writes each event to the log; installed by default.
pub struct LoggingEventHandler;

#[async_trait]
impl EventHandler for LoggingEventHandler {
    async fn handle_event(&self, event: &Event) -> Result<(), String> {
        match event {
            Event::InventoryAdjusted {
                store_id,
                item,
                new_quantity,
                ..
            } if new_quantity.is_sign_negative() => {
                warn!(
                    "Inventory for {} at {} is negative: {}",
                    item, store_id, new_quantity
                );
            }
            other => info!("Event: {:?}", other),
        }
        Ok(())
    }
}

/// Drains the channel and fans each event out to all handlers until every sender is dropped.
pub async fn process_events(mut rx: mpsc::Receiver<Event>, handlers: Vec<Arc<dyn EventHandler>>) {
    info!("Starting event processing loop");

    while let Some(event) = rx.recv().await {
        let results = join_all(handlers.iter().map(|h| h.handle_event(&event))).await;
        for result in results {
            if let Err(e) = result {
                error!("Event handler failed for {:?}: {}", event, e);
            }
        }
    }

    info!("Event processing loop stopped");
}
