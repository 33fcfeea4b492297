mod common;

use assert_matches::assert_matches;
use chrono::{Duration, TimeZone, Utc};
use common::*;
use kitchen_ledger::{
    errors::ServiceError,
    events::Event,
    models::ItemRef,
    services::production::RecordProductionInput,
};
use rust_decimal_macros::dec;

async fn stocked_kitchen() -> TestApp {
    let app = TestApp::new().await;
    app.stock(KITCHEN, ONION, dec!(5000)).await;
    app.stock(KITCHEN, SOY_SAUCE, dec!(500)).await;
    app.stock(KITCHEN, MIRIN, dec!(200)).await;
    app.stock(KITCHEN, SUGAR, dec!(100)).await;
    app
}

fn batch(quantity: rust_decimal::Decimal) -> RecordProductionInput {
    RecordProductionInput {
        store_id: KITCHEN.to_string(),
        wip_item_id: BRAISED_ONION.to_string(),
        quantity,
        unit: "kg".to_string(),
        production_date: None,
        expiry_date: None,
        employee_id: Some("E100".to_string()),
        notes: None,
    }
}

#[tokio::test]
async fn recording_a_batch_consumes_scaled_ingredients_and_books_output() {
    let app = stocked_kitchen().await;
    let production = app.state.services.production.clone();

    let log = production
        .record_production(batch(dec!(2)), "E100")
        .await
        .expect("record production");
    assert_eq!(log.quantity, dec!(2));

    assert_eq!(app.on_hand(KITCHEN, &ItemRef::product(ONION)).await, dec!(3000));
    assert_eq!(app.on_hand(KITCHEN, &ItemRef::product(SOY_SAUCE)).await, dec!(400));
    assert_eq!(app.on_hand(KITCHEN, &ItemRef::product(MIRIN)).await, dec!(140));
    assert_eq!(app.on_hand(KITCHEN, &ItemRef::product(SUGAR)).await, dec!(80));
    assert_eq!(app.on_hand(KITCHEN, &ItemRef::wip(BRAISED_ONION)).await, dec!(2));

    let events = app.recorded_events().await;
    let consumed = events
        .iter()
        .filter(|e| matches!(e, Event::InventoryAdjusted { delta, .. } if delta.is_sign_negative()))
        .count();
    assert_eq!(consumed, 4);
    assert!(events
        .iter()
        .any(|e| matches!(e, Event::WipProduced { production_id, .. } if *production_id == log.id)));
}

#[tokio::test]
async fn second_batch_adds_to_wip_stock() {
    let app = stocked_kitchen().await;
    let production = app.state.services.production.clone();

    production.record_production(batch(dec!(1)), "E100").await.unwrap();
    production.record_production(batch(dec!(1.5)), "E100").await.unwrap();

    assert_eq!(app.on_hand(KITCHEN, &ItemRef::wip(BRAISED_ONION)).await, dec!(2.5));
    assert_eq!(app.on_hand(KITCHEN, &ItemRef::product(ONION)).await, dec!(2500));

    let wip = app.state.services.inventory.list_wip_inventory(KITCHEN).await.unwrap();
    assert_eq!(wip.len(), 1);
    assert_eq!(wip[0].wip_item_name.as_deref(), Some("Braised onion"));
}

#[tokio::test]
async fn check_then_record_agree_on_requirements() {
    let app = stocked_kitchen().await;
    let production = app.state.services.production.clone();

    let check = production
        .check_required_ingredients(KITCHEN, BRAISED_ONION, dec!(2))
        .await
        .unwrap();
    assert!(check.can_produce);
    assert_eq!(check.requirements.len(), 4);
    let onion = check
        .requirements
        .iter()
        .find(|r| r.product_id == ONION)
        .expect("onion requirement");
    assert_eq!(onion.required_quantity, dec!(2000));
    assert_eq!(onion.available_quantity, dec!(5000));
    assert_eq!(onion.shortage, dec!(0));

    production.record_production(batch(dec!(2)), "E100").await.unwrap();
    for requirement in &check.requirements {
        let left = app
            .on_hand(KITCHEN, &ItemRef::product(requirement.product_id.as_str()))
            .await;
        assert_eq!(left, requirement.available_quantity - requirement.required_quantity);
    }
}

#[tokio::test]
async fn check_reports_shortage_without_touching_stock() {
    let app = TestApp::new().await;
    app.stock(KITCHEN, ONION, dec!(1500)).await;

    let check = app
        .state
        .services
        .production
        .check_required_ingredients(KITCHEN, BRAISED_ONION, dec!(2))
        .await
        .unwrap();

    assert!(!check.can_produce);
    let onion = check.requirements.iter().find(|r| r.product_id == ONION).unwrap();
    assert_eq!(onion.shortage, dec!(500));
    let sugar = check.requirements.iter().find(|r| r.product_id == SUGAR).unwrap();
    assert_eq!(sugar.available_quantity, dec!(0));
    assert_eq!(sugar.shortage, dec!(20));
    assert_eq!(app.on_hand(KITCHEN, &ItemRef::product(ONION)).await, dec!(1500));
}

#[tokio::test]
async fn check_rejects_non_positive_batch() {
    let app = TestApp::new().await;
    let result = app
        .state
        .services
        .production
        .check_required_ingredients(KITCHEN, BRAISED_ONION, dec!(0))
        .await;
    assert_matches!(result, Err(ServiceError::ValidationError(_)));
}

#[tokio::test]
async fn expiry_defaults_to_shelf_life() {
    let app = stocked_kitchen().await;
    let produced_at = Utc.with_ymd_and_hms(2025, 3, 10, 9, 0, 0).unwrap();

    let log = app
        .state
        .services
        .production
        .record_production(
            RecordProductionInput {
                production_date: Some(produced_at),
                ..batch(dec!(1))
            },
            "E100",
        )
        .await
        .unwrap();

    assert_eq!(log.production_date, produced_at);
    assert_eq!(log.expiry_date, Some(produced_at + Duration::days(3)));

    let wip = app.state.services.inventory.list_wip_inventory(KITCHEN).await.unwrap();
    assert_eq!(wip[0].expiry_date, Some(produced_at + Duration::days(3)));
}

#[tokio::test]
async fn explicit_expiry_wins_over_shelf_life() {
    let app = stocked_kitchen().await;
    let produced_at = Utc.with_ymd_and_hms(2025, 3, 10, 9, 0, 0).unwrap();
    let expiry = produced_at + Duration::days(1);

    let log = app
        .state
        .services
        .production
        .record_production(
            RecordProductionInput {
                production_date: Some(produced_at),
                expiry_date: Some(expiry),
                ..batch(dec!(1))
            },
            "E100",
        )
        .await
        .unwrap();
    assert_eq!(log.expiry_date, Some(expiry));
}

#[tokio::test]
async fn production_may_drive_stock_negative_when_allowed() {
    let app = TestApp::new().await;
    app.stock(KITCHEN, ONION, dec!(500)).await;

    app.state
        .services
        .production
        .record_production(batch(dec!(1)), "E100")
        .await
        .expect("negative stock is allowed by default");

    assert_eq!(app.on_hand(KITCHEN, &ItemRef::product(ONION)).await, dec!(-500));
}

#[tokio::test]
async fn production_rolls_back_when_stock_would_go_negative_under_reject_policy() {
    let app = TestApp::with_config(|cfg| cfg.inventory.allow_negative_stock = false).await;
    app.stock(KITCHEN, ONION, dec!(5000)).await;
    app.stock(KITCHEN, SOY_SAUCE, dec!(10)).await;

    let result = app
        .state
        .services
        .production
        .record_production(batch(dec!(1)), "E100")
        .await;
    assert_matches!(result, Err(ServiceError::InsufficientStock(_)));

    assert_eq!(app.on_hand(KITCHEN, &ItemRef::product(ONION)).await, dec!(5000));
    assert_eq!(app.on_hand(KITCHEN, &ItemRef::wip(BRAISED_ONION)).await, dec!(0));
    let history = app
        .state
        .services
        .production
        .get_production_history(Some(KITCHEN), None)
        .await
        .unwrap();
    assert!(history.is_empty());
}

#[tokio::test]
async fn unknown_wip_item_is_not_found() {
    let app = TestApp::new().await;
    let result = app
        .state
        .services
        .production
        .record_production(
            RecordProductionInput {
                wip_item_id: "W999".to_string(),
                ..batch(dec!(1))
            },
            "E100",
        )
        .await;
    assert_matches!(result, Err(ServiceError::NotFound(_)));
}

#[tokio::test]
async fn history_is_filtered_and_oldest_first() {
    let app = stocked_kitchen().await;
    let production = app.state.services.production.clone();
    let first = Utc.with_ymd_and_hms(2025, 3, 1, 8, 0, 0).unwrap();
    let second = Utc.with_ymd_and_hms(2025, 3, 2, 8, 0, 0).unwrap();

    for date in [second, first] {
        production
            .record_production(
                RecordProductionInput {
                    production_date: Some(date),
                    ..batch(dec!(1))
                },
                "E100",
            )
            .await
            .unwrap();
    }

    let history = production
        .get_production_history(Some(KITCHEN), Some(BRAISED_ONION))
        .await
        .unwrap();
    assert_eq!(history.len(), 2);
    assert_eq!(history[0].production_date, first);
    assert_eq!(history[1].production_date, second);

    let elsewhere = production.get_production_history(Some(SHOP), None).await.unwrap();
    assert!(elsewhere.is_empty());
}
