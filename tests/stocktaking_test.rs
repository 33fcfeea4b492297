mod common;

use assert_matches::assert_matches;
use common::*;
use kitchen_ledger::{
    entities::stocktaking::StocktakingStatus,
    errors::ServiceError,
    events::Event,
    models::ItemRef,
    services::stocktaking::{AddDetailInput, CreateStocktakingInput},
};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use uuid::Uuid;

async fn open_sheet(app: &TestApp, store_id: &str) -> Uuid {
    app.state
        .services
        .stocktaking
        .create_stocktaking(CreateStocktakingInput {
            store_id: store_id.to_string(),
            employee_id: "E200".to_string(),
            stocktaking_date: None,
            notes: None,
        })
        .await
        .expect("create stocktaking")
        .id
}

fn product_count(product_id: &str, system: Decimal, actual: Decimal, unit: &str) -> AddDetailInput {
    AddDetailInput {
        product_id: Some(product_id.to_string()),
        wip_item_id: None,
        system_quantity: system,
        actual_quantity: actual,
        unit: unit.to_string(),
        notes: None,
    }
}

#[tokio::test]
async fn confirming_overwrites_the_ledger_with_counted_quantities() {
    let app = TestApp::new().await;
    app.stock(SHOP, ONION, dec!(500)).await;
    let stocktaking = app.state.services.stocktaking.clone();
    let sheet = open_sheet(&app, SHOP).await;

    let detail = stocktaking
        .add_detail(sheet, product_count(ONION, dec!(500), dec!(450), "g"))
        .await
        .unwrap();
    assert_eq!(detail.difference, dec!(-50));

    let confirmed = stocktaking.confirm(sheet, "E200").await.unwrap();
    assert_eq!(confirmed.status, StocktakingStatus::Confirmed);
    assert!(confirmed.confirmed_at.is_some());
    assert_eq!(app.on_hand(SHOP, &ItemRef::product(ONION)).await, dec!(450));

    let events = app.recorded_events().await;
    assert!(events.iter().any(|e| matches!(
        e,
        Event::StocktakingConfirmed { stocktaking_id, items_applied: 1, .. } if *stocktaking_id == sheet
    )));
}

#[tokio::test]
async fn counted_quantity_replaces_rather_than_adjusts() {
    let app = TestApp::new().await;
    app.stock(SHOP, ONION, dec!(500)).await;
    let stocktaking = app.state.services.stocktaking.clone();
    let sheet = open_sheet(&app, SHOP).await;
    stocktaking
        .add_detail(sheet, product_count(ONION, dec!(500), dec!(450), "g"))
        .await
        .unwrap();

    // Stock moves between counting and confirming; the count still wins
    app.state
        .services
        .inventory
        .adjust_quantity(SHOP, &ItemRef::product(ONION), dec!(100), "E300")
        .await
        .unwrap();

    stocktaking.confirm(sheet, "E200").await.unwrap();
    assert_eq!(app.on_hand(SHOP, &ItemRef::product(ONION)).await, dec!(450));
}

#[tokio::test]
async fn second_confirmation_is_rejected_without_side_effects() {
    let app = TestApp::new().await;
    app.stock(SHOP, ONION, dec!(500)).await;
    let stocktaking = app.state.services.stocktaking.clone();
    let sheet = open_sheet(&app, SHOP).await;
    stocktaking
        .add_detail(sheet, product_count(ONION, dec!(500), dec!(450), "g"))
        .await
        .unwrap();
    let first = stocktaking.confirm(sheet, "E200").await.unwrap();

    app.stock(SHOP, ONION, dec!(600)).await;
    let again = stocktaking.confirm(sheet, "E200").await;
    assert_matches!(again, Err(ServiceError::InvalidState(_)));

    assert_eq!(app.on_hand(SHOP, &ItemRef::product(ONION)).await, dec!(600));
    let reloaded = stocktaking.get_stocktaking(sheet).await.unwrap();
    assert_eq!(reloaded.stocktaking.confirmed_at, first.confirmed_at);
}

#[tokio::test]
async fn confirmed_sheet_rejects_further_edits() {
    let app = TestApp::new().await;
    let stocktaking = app.state.services.stocktaking.clone();
    let sheet = open_sheet(&app, SHOP).await;
    let detail = stocktaking
        .add_detail(sheet, product_count(ONION, dec!(0), dec!(10), "g"))
        .await
        .unwrap();
    stocktaking.confirm(sheet, "E200").await.unwrap();

    assert_matches!(
        stocktaking
            .add_detail(sheet, product_count(SUGAR, dec!(0), dec!(1), "g"))
            .await,
        Err(ServiceError::InvalidState(_))
    );
    assert_matches!(
        stocktaking.record_count(detail.id, dec!(5), None).await,
        Err(ServiceError::InvalidState(_))
    );
    assert_matches!(
        stocktaking.generate_details(sheet, SHOP).await,
        Err(ServiceError::InvalidState(_))
    );
}

#[tokio::test]
async fn generate_details_snapshots_the_ledger_once() {
    let app = TestApp::new().await;
    app.stock(KITCHEN, ONION, dec!(1200)).await;
    app.stock(KITCHEN, SOY_SAUCE, dec!(300)).await;
    app.stock(SHOP, SUGAR, dec!(40)).await;
    app.state
        .services
        .inventory
        .adjust_quantity(KITCHEN, &ItemRef::wip(BRAISED_ONION), dec!(4), "E100")
        .await
        .unwrap();

    let stocktaking = app.state.services.stocktaking.clone();
    let sheet = open_sheet(&app, KITCHEN).await;

    let details = stocktaking.generate_details(sheet, KITCHEN).await.unwrap();
    assert_eq!(details.len(), 3);
    for detail in &details {
        assert_eq!(detail.actual_quantity, detail.system_quantity);
        assert!(detail.difference.is_zero());
    }
    let onion = details
        .iter()
        .find(|d| d.product_id.as_deref() == Some(ONION))
        .unwrap();
    assert_eq!(onion.system_quantity, dec!(1200));
    assert_eq!(onion.unit, "g");
    let wip = details
        .iter()
        .find(|d| d.wip_item_id.as_deref() == Some(BRAISED_ONION))
        .unwrap();
    assert_eq!(wip.unit, "kg");

    let repeated = stocktaking.generate_details(sheet, KITCHEN).await.unwrap();
    assert!(repeated.is_empty());
    let sheet_with_details = stocktaking.get_stocktaking(sheet).await.unwrap();
    assert_eq!(sheet_with_details.details.len(), 3);
}

#[tokio::test]
async fn generate_details_rejects_another_store() {
    let app = TestApp::new().await;
    let sheet = open_sheet(&app, KITCHEN).await;
    let result = app
        .state
        .services
        .stocktaking
        .generate_details(sheet, SHOP)
        .await;
    assert_matches!(result, Err(ServiceError::ValidationError(_)));
}

#[tokio::test]
async fn snapshot_sheet_is_created_together_with_its_details() {
    let app = TestApp::new().await;
    app.stock(SHOP, ONION, dec!(500)).await;
    app.state
        .services
        .inventory
        .set_quantity(SHOP, &ItemRef::wip(BRAISED_ONION), dec!(1.5), "seed")
        .await
        .unwrap();
    let stocktaking = app.state.services.stocktaking.clone();

    let sheet = stocktaking
        .create_with_snapshot(CreateStocktakingInput {
            store_id: SHOP.to_string(),
            employee_id: "E200".to_string(),
            stocktaking_date: None,
            notes: None,
        })
        .await
        .unwrap();
    assert_eq!(sheet.stocktaking.status, StocktakingStatus::Draft);
    assert_eq!(sheet.details.len(), 2);
    assert!(sheet.details.iter().all(|d| d.difference.is_zero()));

    let stored = stocktaking.get_stocktaking(sheet.stocktaking.id).await.unwrap();
    assert_eq!(stored.details.len(), 2);

    assert_matches!(
        stocktaking
            .create_with_snapshot(CreateStocktakingInput {
                store_id: "S999".to_string(),
                employee_id: "E200".to_string(),
                stocktaking_date: None,
                notes: None,
            })
            .await,
        Err(ServiceError::NotFound(_))
    );
    assert_eq!(stocktaking.list_stocktakings(None).await.unwrap().len(), 1);
}

#[tokio::test]
async fn record_count_updates_difference() {
    let app = TestApp::new().await;
    app.stock(SHOP, SOY_SAUCE, dec!(800)).await;
    let stocktaking = app.state.services.stocktaking.clone();
    let sheet = open_sheet(&app, SHOP).await;
    let details = stocktaking.generate_details(sheet, SHOP).await.unwrap();

    let updated = stocktaking
        .record_count(details[0].id, dec!(750), Some("leaky bottle".to_string()))
        .await
        .unwrap();
    assert_eq!(updated.system_quantity, dec!(800));
    assert_eq!(updated.difference, dec!(-50));
    assert_eq!(updated.notes.as_deref(), Some("leaky bottle"));

    assert_matches!(
        stocktaking.record_count(details[0].id, dec!(-1), None).await,
        Err(ServiceError::ValidationError(_))
    );
    assert_matches!(
        stocktaking.record_count(Uuid::new_v4(), dec!(1), None).await,
        Err(ServiceError::NotFound(_))
    );
}

#[tokio::test]
async fn detail_must_name_exactly_one_item() {
    let app = TestApp::new().await;
    let stocktaking = app.state.services.stocktaking.clone();
    let sheet = open_sheet(&app, SHOP).await;

    let both = AddDetailInput {
        wip_item_id: Some(BRAISED_ONION.to_string()),
        ..product_count(ONION, dec!(1), dec!(1), "g")
    };
    assert_matches!(
        stocktaking.add_detail(sheet, both).await,
        Err(ServiceError::ValidationError(_))
    );

    let neither = AddDetailInput {
        product_id: None,
        ..product_count(ONION, dec!(1), dec!(1), "g")
    };
    assert_matches!(
        stocktaking.add_detail(sheet, neither).await,
        Err(ServiceError::ValidationError(_))
    );

    assert_matches!(
        stocktaking
            .add_detail(sheet, product_count("I999", dec!(1), dec!(1), "g"))
            .await,
        Err(ServiceError::NotFound(_))
    );
}

#[tokio::test]
async fn analysis_ranks_largest_variances() {
    let app = TestApp::new().await;
    let stocktaking = app.state.services.stocktaking.clone();
    let sheet = open_sheet(&app, SHOP).await;

    for input in [
        product_count(ONION, dec!(500), dec!(450), "g"),
        product_count(SOY_SAUCE, dec!(200), dec!(200), "ml"),
        product_count(MIRIN, dec!(100), dec!(180), "ml"),
        product_count(SUGAR, dec!(0), dec!(5), "g"),
    ] {
        stocktaking.add_detail(sheet, input).await.unwrap();
    }

    let analysis = stocktaking.analysis(sheet).await.unwrap();
    assert_eq!(analysis.total_items, 4);
    assert_eq!(analysis.matched_items, 1);
    assert_eq!(analysis.difference_items, 3);
    assert_eq!(analysis.difference_rate, dec!(75));

    let ranked: Vec<&str> = analysis
        .top_differences
        .iter()
        .map(|d| d.item.id())
        .collect();
    assert_eq!(ranked, vec![MIRIN, ONION, SUGAR]);
    assert_eq!(analysis.top_differences[0].difference_percentage, Some(dec!(80)));
    assert_eq!(analysis.top_differences[1].difference_percentage, Some(dec!(-10)));
    assert_eq!(analysis.top_differences[2].difference_percentage, None);
}

#[tokio::test]
async fn lists_sheets_per_store() {
    let app = TestApp::new().await;
    open_sheet(&app, SHOP).await;
    open_sheet(&app, SHOP).await;
    open_sheet(&app, KITCHEN).await;

    let stocktaking = app.state.services.stocktaking.clone();
    assert_eq!(stocktaking.list_stocktakings(Some(SHOP)).await.unwrap().len(), 2);
    assert_eq!(stocktaking.list_stocktakings(None).await.unwrap().len(), 3);
    assert_matches!(
        stocktaking.get_stocktaking(Uuid::new_v4()).await,
        Err(ServiceError::NotFound(_))
    );
}
