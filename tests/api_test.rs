mod common;

use std::str::FromStr;

use axum::http::{Method, StatusCode};
use common::*;
use kitchen_ledger::models::ItemRef;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde_json::{json, Value};

/// Decimals serialize as strings; accept numbers too.
fn decimal(value: &Value) -> Decimal {
    match value {
        Value::String(s) => Decimal::from_str(s).expect("decimal string"),
        Value::Number(n) => Decimal::from_str(&n.to_string()).expect("decimal number"),
        other => panic!("not a decimal: {other}"),
    }
}

#[tokio::test]
async fn health_and_status_respond() {
    let app = TestApp::new().await;

    let (status, body) = app.get("/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "up");

    let (status, body) = app.get("/api/v1/status").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["service"], "kitchen-ledger");

    let (status, _) = app.get("/api/v1/health/live").await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn catalog_listing() {
    let app = TestApp::new().await;

    let (status, stores) = app.get("/api/v1/stores").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(stores.as_array().unwrap().len(), 2);

    let (_, products) = app.get("/api/v1/products?category_id=C-ING").await;
    assert_eq!(products.as_array().unwrap().len(), 4);

    let (status, recipe) = app.get("/api/v1/recipes/wip/W002").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(recipe.as_array().unwrap().len(), 4);

    let (status, _) = app.get("/api/v1/recipes/menu/M999").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn adjustments_record_the_acting_user() {
    let app = TestApp::new().await;

    let (status, body) = app
        .post(
            "/api/v1/inventory/S001/adjustments",
            json!({ "item": { "kind": "product", "id": ONION }, "delta": "250" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(decimal(&body["quantity"]), dec!(250));

    let (status, lines) = app.get("/api/v1/inventory/S001").await;
    assert_eq!(status, StatusCode::OK);
    let line = &lines.as_array().unwrap()[0];
    assert_eq!(line["product_id"], ONION);
    assert_eq!(line["last_updated_by"], "tester");
    assert_eq!(line["is_low_stock"], true);

    let (status, _) = app.get("/api/v1/inventory/S999").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn counting_a_product_rejects_negative_quantities() {
    let app = TestApp::new().await;

    let (status, _) = app
        .request(
            Method::PUT,
            "/api/v1/inventory/S003/products/I030",
            Some(json!({ "quantity": "-5" })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = app
        .request(
            Method::PUT,
            "/api/v1/inventory/S003/products/I030",
            Some(json!({ "quantity": "640" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(decimal(&body["quantity"]), dec!(640));
    assert_eq!(app.on_hand(SHOP, &ItemRef::product(SOY_SAUCE)).await, dec!(640));
}

#[tokio::test]
async fn low_stock_alerts_endpoint() {
    let app = TestApp::new().await;
    app.stock(KITCHEN, ONION, dec!(1800)).await;

    let (status, alerts) = app.get("/api/v1/inventory/alerts?store_id=S001").await;
    assert_eq!(status, StatusCode::OK);
    let alerts = alerts.as_array().unwrap();
    assert_eq!(alerts.len(), 1);
    assert_eq!(decimal(&alerts[0]["shortage"]), dec!(200));
}

#[tokio::test]
async fn purchase_order_round_trip() {
    let app = TestApp::new().await;
    app.stock(KITCHEN, ONION, dec!(1800)).await;

    let (status, recommendations) = app.get("/api/v1/orders/recommendations/S001").await;
    assert_eq!(status, StatusCode::OK);
    let group = &recommendations[0];
    let lines: Vec<Value> = group["items"]
        .as_array()
        .unwrap()
        .iter()
        .map(|item| {
            json!({
                "product_id": item["product_id"],
                "quantity": item["order_quantity"],
                "unit": item["unit"],
                "unit_price": item["unit_price"],
            })
        })
        .collect();

    let (status, order) = app
        .post(
            "/api/v1/orders/from-recommendation",
            json!({ "store_id": KITCHEN, "supplier_id": group["supplier_id"], "lines": lines }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(order["is_auto_order"], true);
    assert_eq!(order["status"], "DRAFT");
    let order_id = order["id"].as_str().unwrap().to_string();
    let line_id = order["lines"][0]["id"].as_str().unwrap().to_string();

    let (status, _) = app
        .post(
            &format!("/api/v1/orders/{order_id}/delivery"),
            json!({ "lines": [{ "line_id": line_id, "quantity": "4000" }] }),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, ordered) = app
        .request(
            Method::PATCH,
            &format!("/api/v1/orders/{order_id}/status"),
            Some(json!({ "status": "ORDERED" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(ordered["status"], "ORDERED");

    let (status, _) = app
        .request(
            Method::PATCH,
            &format!("/api/v1/orders/{order_id}/status"),
            Some(json!({ "status": "DELIVERED" })),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, delivered) = app
        .post(
            &format!("/api/v1/orders/{order_id}/delivery"),
            json!({ "lines": [{ "line_id": line_id, "quantity": "4000" }] }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(delivered["status"], "DELIVERED");
    assert_eq!(app.on_hand(KITCHEN, &ItemRef::product(ONION)).await, dec!(5800));

    let (_, listed) = app.get("/api/v1/orders?store_id=S001&status=DELIVERED").await;
    assert_eq!(listed.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn manual_order_defaults_employee_to_actor() {
    let app = TestApp::new().await;

    let (status, order) = app
        .post("/api/v1/orders", json!({ "store_id": SHOP, "supplier_id": SUPPLIER }))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(order["employee_id"], "tester");
    let order_id = order["id"].as_str().unwrap();

    let (status, line) = app
        .post(
            &format!("/api/v1/orders/{order_id}/lines"),
            json!({ "product_id": MIRIN, "quantity": "10", "unit": "ml", "unit_price": "0.75" }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(decimal(&line["amount"]), dec!(7.5));

    let (_, fetched) = app.get(&format!("/api/v1/orders/{order_id}")).await;
    assert_eq!(decimal(&fetched["total_amount"]), dec!(7.5));
}

#[tokio::test]
async fn stocktaking_flow_over_http() {
    let app = TestApp::new().await;
    app.stock(SHOP, ONION, dec!(500)).await;

    let (status, sheet) = app
        .post("/api/v1/stocktakings", json!({ "store_id": SHOP, "auto_generate": true }))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(sheet["employee_id"], "tester");
    let details = sheet["details"].as_array().unwrap();
    assert_eq!(details.len(), 1);
    let sheet_id = sheet["id"].as_str().unwrap().to_string();
    let detail_id = details[0]["id"].as_str().unwrap().to_string();

    let (status, detail) = app
        .request(
            Method::PATCH,
            &format!("/api/v1/stocktakings/details/{detail_id}"),
            Some(json!({ "actual_quantity": "450" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(decimal(&detail["difference"]), dec!(-50));

    let (status, analysis) = app
        .get(&format!("/api/v1/stocktakings/{sheet_id}/analysis"))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(analysis["difference_items"], 1);

    let (status, confirmed) = app
        .post(&format!("/api/v1/stocktakings/{sheet_id}/confirm"), json!({}))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(confirmed["status"], "CONFIRMED");
    assert_eq!(app.on_hand(SHOP, &ItemRef::product(ONION)).await, dec!(450));

    let (status, _) = app
        .post(&format!("/api/v1/stocktakings/{sheet_id}/confirm"), json!({}))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn production_over_http() {
    let app = TestApp::new().await;
    app.stock(KITCHEN, ONION, dec!(5000)).await;

    let (status, check) = app
        .post(
            "/api/v1/productions/check-ingredients",
            json!({ "store_id": KITCHEN, "wip_item_id": BRAISED_ONION, "quantity": "2" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(check["can_produce"], false);

    let (status, production) = app
        .post(
            "/api/v1/productions",
            json!({
                "store_id": KITCHEN,
                "wip_item_id": BRAISED_ONION,
                "quantity": "2",
                "unit": "kg",
            }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(production["employee_id"], "tester");
    assert!(production["expiry_date"].is_string());
    assert_eq!(app.on_hand(KITCHEN, &ItemRef::product(ONION)).await, dec!(3000));

    let (status, history) = app.get("/api/v1/productions?store_id=S001").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(history.as_array().unwrap().len(), 1);

    let (status, wip) = app.get("/api/v1/inventory/S001/wip").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(decimal(&wip[0]["quantity"]), dec!(2));
}

#[tokio::test]
async fn malformed_ids_are_client_errors() {
    let app = TestApp::new().await;
    let (status, _) = app.get("/api/v1/orders/not-a-uuid").await;
    assert!(status.is_client_error());

    let (status, _) = app.get("/api/v1/orders?status=SHIPPED").await;
    assert!(status.is_client_error());
}
