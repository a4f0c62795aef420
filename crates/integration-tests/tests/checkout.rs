//! Order summary, placement and tracking.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use axum::http::StatusCode;
use rust_decimal::Decimal;
use serde_json::{Value, json};

use satchel_integration_tests::{FakeIdentity, TEST_PASSWORD, TestApp};

fn decimal(value: &Value) -> Decimal {
    value.as_str().unwrap().parse().unwrap()
}

fn shipping_details() -> Value {
    json!({
        "email": "ada@example.com",
        "name": "Ada Lovelace",
        "address": "12 Analytical Row",
        "city": "London",
        "postalCode": "NW1 6XE",
        "country": "United Kingdom",
    })
}

fn card_form() -> Value {
    let mut form = shipping_details();
    form["paymentMethod"] = json!("card");
    form["cardName"] = json!("Ada Lovelace");
    form["cardNumber"] = json!("4242424242424242");
    form["expiryDate"] = json!("09/29");
    form["cvc"] = json!("123");
    form
}

async fn app_with_cart() -> TestApp {
    let mut app = TestApp::new();
    app.post("/api/cart/add", &json!({ "productId": "1" })).await;
    app.post("/api/cart/add", &json!({ "productId": "1" })).await;
    app.post("/api/cart/add", &json!({ "productId": "7" })).await;
    app
}

#[tokio::test]
async fn test_empty_cart_redirects_to_cart() {
    let mut app = TestApp::new();

    let summary = app.get("/api/checkout").await;
    assert_eq!(summary.status, StatusCode::CONFLICT);
    assert_eq!(summary.body["redirect"], "/cart");

    let placed = app.post("/api/checkout", &card_form()).await;
    assert_eq!(placed.status, StatusCode::CONFLICT);
    assert_eq!(placed.body["redirect"], "/cart");
}

#[tokio::test]
async fn test_summary_adds_express_fee() {
    let mut app = app_with_cart().await;

    let standard = app.get("/api/checkout").await;
    assert_eq!(standard.status, StatusCode::OK);
    assert_eq!(decimal(&standard.body["subtotal"]), Decimal::from(285));
    assert_eq!(decimal(&standard.body["deliveryFee"]), Decimal::ZERO);
    assert_eq!(decimal(&standard.body["total"]), Decimal::from(285));

    let express = app.get("/api/checkout?deliveryOption=Express").await;
    assert_eq!(decimal(&express.body["deliveryFee"]), Decimal::from(15));
    assert_eq!(decimal(&express.body["total"]), Decimal::from(300));
}

#[tokio::test]
async fn test_invalid_card_lists_every_field_and_keeps_cart() {
    let mut app = app_with_cart().await;
    let mut form = card_form();
    form["cardNumber"] = json!("4242");
    form["expiryDate"] = json!("13/29");
    form["postalCode"] = json!("12");

    let response = app.post("/api/checkout", &form).await;

    assert_eq!(response.status, StatusCode::UNPROCESSABLE_ENTITY);
    let fields = response.body["fields"].as_object().unwrap();
    assert_eq!(fields.len(), 3);
    assert_eq!(fields["cardNumber"], "Card number must be 16 digits");
    assert_eq!(fields["expiryDate"], "Invalid format (MM/YY)");
    assert!(fields.contains_key("postalCode"));

    assert_eq!(app.get("/api/cart/count").await.body["count"], 3);
}

#[tokio::test]
async fn test_virtual_account_ignores_card_fields() {
    let mut app = app_with_cart().await;
    let mut form = shipping_details();
    form["paymentMethod"] = json!("va");

    let response = app.post("/api/checkout", &form).await;
    assert_eq!(response.status, StatusCode::CREATED);
}

#[tokio::test]
async fn test_placing_order_empties_cart() {
    let mut app = app_with_cart().await;
    let mut form = card_form();
    form["deliveryOption"] = json!("Express");

    let response = app.post("/api/checkout", &form).await;

    assert_eq!(response.status, StatusCode::CREATED);
    let order = &response.body["order"];
    let id = order["id"].as_str().unwrap();
    assert!(id.starts_with("ORD-"));
    assert_eq!(response.body["redirect"], format!("/orders/{id}"));
    assert_eq!(order["status"], "Processing");
    assert_eq!(order["items"].as_array().unwrap().len(), 2);
    assert_eq!(decimal(&order["total"]), Decimal::from(300));

    assert_eq!(app.get("/api/cart/count").await.body["count"], 0);
}

#[tokio::test]
async fn test_order_page_requires_sign_in() {
    let mut app = TestApp::new();
    let response = app.get("/api/orders/ORD-12345").await;

    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.body["redirect"], "/login");
}

#[tokio::test]
async fn test_order_page_shows_progress() {
    let mut app = TestApp::builder()
        .identity(FakeIdentity::new().with_account("ada@example.com", "Ada", true))
        .build();
    app.post(
        "/api/auth/login",
        &json!({ "email": "ada@example.com", "password": TEST_PASSWORD }),
    )
    .await;

    let order = app.get("/api/orders/ORD-12345").await;
    assert_eq!(order.status, StatusCode::OK);
    assert_eq!(order.body["order"]["id"], "ORD-12345");
    assert_eq!(order.body["progressPercent"], 33);

    let unknown = app.get("/api/orders/12345").await;
    assert_eq!(unknown.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_order_history_requires_sign_in() {
    let mut app = TestApp::new();
    let response = app.get("/api/orders").await;

    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.body["redirect"], "/login");
}

#[tokio::test]
async fn test_order_history_for_signed_in_shopper() {
    let mut app = TestApp::builder()
        .identity(FakeIdentity::new().with_account("ada@example.com", "Ada", true))
        .build();
    app.post(
        "/api/auth/login",
        &json!({ "email": "ada@example.com", "password": TEST_PASSWORD }),
    )
    .await;

    let response = app.get("/api/orders").await;
    assert_eq!(response.status, StatusCode::OK);

    let orders = response.body["orders"].as_array().unwrap();
    let statuses: Vec<&str> = orders
        .iter()
        .map(|view| view["order"]["status"].as_str().unwrap())
        .collect();
    assert_eq!(statuses, ["Processing", "Shipped", "Delivered"]);
    assert_eq!(orders[2]["progressPercent"], 100);
    assert_eq!(orders[2]["order"]["items"].as_array().unwrap().len(), 2);
    assert_eq!(decimal(&orders[2]["order"]["total"]), Decimal::from(215));

    let id = orders[1]["order"]["id"].as_str().unwrap();
    let detail = app.get(&format!("/api/orders/{id}")).await;
    assert_eq!(detail.body["order"]["status"], "Shipped");
    assert_eq!(detail.body["progressPercent"], 66);
}
