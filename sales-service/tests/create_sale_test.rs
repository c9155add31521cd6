mod common;

use common::TestApp;
use reqwest::Client;
use serde_json::json;
use wiremock::matchers::{body_partial_json, method, path, path_regex};
use wiremock::{Mock, ResponseTemplate};

fn cart_body() -> serde_json::Value {
    json!({
        "client_id": 100,
        "payment_method": "cash",
        "line_items": [
            { "item_id": 7, "product_name": "Trail Runner", "size_label": "42", "quantity": 2, "unit_price": 25000 },
            { "item_id": 9, "product_name": "Alpine Boot", "size_label": "44", "quantity": 1, "unit_price": 89990 }
        ]
    })
}

#[tokio::test]
async fn create_sale_totals_and_adjusts_stock_in_order() {
    let app = TestApp::spawn().await;

    Mock::given(method("POST"))
        .and(path("/inventory/items/7/stock-adjustments"))
        .and(body_partial_json(
            json!({ "delta": -2, "reason": "sale", "actor_id": 100 }),
        ))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&app.inventory_server)
        .await;
    Mock::given(method("POST"))
        .and(path("/inventory/items/9/stock-adjustments"))
        .and(body_partial_json(
            json!({ "delta": -1, "reason": "sale", "actor_id": 100 }),
        ))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&app.inventory_server)
        .await;
    Mock::given(method("POST"))
        .and(path("/deliveries"))
        .respond_with(ResponseTemplate::new(201))
        .mount(&app.delivery_server)
        .await;

    let client = Client::new();
    let response = client
        .post(format!("{}/sales", app.http_address))
        .json(&cart_body())
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), 201);
    let body: serde_json::Value = response.json().await.expect("Failed to parse JSON");
    assert_eq!(body["total"], "139990");
    assert_eq!(body["status"], "pending");
    assert_eq!(body["line_items"].as_array().map(|v| v.len()), Some(2));
    assert_eq!(body["line_items"][0]["subtotal"], "50000");
    assert_eq!(body["line_items"][1]["subtotal"], "89990");

    // the first item's decrement must be issued before the second's
    let requests = app
        .inventory_server
        .received_requests()
        .await
        .expect("No requests recorded");
    let paths: Vec<String> = requests.iter().map(|r| r.url.path().to_string()).collect();
    assert_eq!(
        paths,
        vec![
            "/inventory/items/7/stock-adjustments".to_string(),
            "/inventory/items/9/stock-adjustments".to_string(),
        ]
    );
}

#[tokio::test]
async fn failed_adjustment_rolls_back_and_compensates() {
    let app = TestApp::spawn().await;

    // first item accepts both the decrement and the later compensation
    Mock::given(method("POST"))
        .and(path("/inventory/items/7/stock-adjustments"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&app.inventory_server)
        .await;
    // second item rejects its decrement
    Mock::given(method("POST"))
        .and(path("/inventory/items/9/stock-adjustments"))
        .respond_with(ResponseTemplate::new(500).set_body_string("out of stock"))
        .mount(&app.inventory_server)
        .await;

    let client = Client::new();
    let response = client
        .post(format!("{}/sales", app.http_address))
        .json(&cart_body())
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), 502);
    let body: serde_json::Value = response.json().await.expect("Failed to parse JSON");
    let error = body["error"].as_str().unwrap_or_default();
    assert!(
        error.contains("item 9"),
        "error should name the failing item: {}",
        error
    );

    // the item 7 decrement was issued, then compensated with the matching +2
    let requests = app
        .inventory_server
        .received_requests()
        .await
        .expect("No requests recorded");
    let item7_bodies: Vec<serde_json::Value> = requests
        .iter()
        .filter(|r| r.url.path() == "/inventory/items/7/stock-adjustments")
        .map(|r| serde_json::from_slice(&r.body).expect("Invalid JSON body"))
        .collect();
    assert_eq!(item7_bodies.len(), 2);
    assert_eq!(item7_bodies[0]["delta"], -2);
    assert_eq!(item7_bodies[0]["reason"], "sale");
    assert_eq!(item7_bodies[1]["delta"], 2);
    assert_eq!(item7_bodies[1]["reason"], "sale_reversal");

    // no delivery request is ever issued for an aborted sale
    let delivery_requests = app
        .delivery_server
        .received_requests()
        .await
        .expect("No requests recorded");
    assert!(delivery_requests.is_empty());
}

#[tokio::test]
async fn sale_succeeds_when_delivery_collaborator_is_down() {
    let app = TestApp::spawn().await;

    Mock::given(method("POST"))
        .and(path_regex(r"^/inventory/items/\d+/stock-adjustments$"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&app.inventory_server)
        .await;
    Mock::given(method("POST"))
        .and(path("/deliveries"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&app.delivery_server)
        .await;

    let client = Client::new();
    let response = client
        .post(format!("{}/sales", app.http_address))
        .json(&cart_body())
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), 201);
    let body: serde_json::Value = response.json().await.expect("Failed to parse JSON");
    let sale_id = body["sale_id"].as_str().expect("Missing sale_id").to_string();

    // the sale stays queryable even though the delivery request failed
    let fetched = client
        .get(format!("{}/sales/{}", app.http_address, sale_id))
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(fetched.status(), 200);
}

#[tokio::test]
async fn empty_cart_is_rejected_without_collaborator_calls() {
    let app = TestApp::spawn().await;

    let client = Client::new();
    let response = client
        .post(format!("{}/sales", app.http_address))
        .json(&json!({
            "client_id": 100,
            "payment_method": "cash",
            "line_items": []
        }))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), 422);

    let inventory_requests = app
        .inventory_server
        .received_requests()
        .await
        .expect("No requests recorded");
    assert!(inventory_requests.is_empty());
    let delivery_requests = app
        .delivery_server
        .received_requests()
        .await
        .expect("No requests recorded");
    assert!(delivery_requests.is_empty());
}

#[tokio::test]
async fn sale_summary_and_status_updates_work() {
    let app = TestApp::spawn().await;

    Mock::given(method("POST"))
        .and(path_regex(r"^/inventory/items/\d+/stock-adjustments$"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&app.inventory_server)
        .await;
    Mock::given(method("POST"))
        .and(path("/deliveries"))
        .respond_with(ResponseTemplate::new(201))
        .mount(&app.delivery_server)
        .await;

    let client = Client::new();
    let response = client
        .post(format!("{}/sales", app.http_address))
        .json(&cart_body())
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status(), 201);
    let body: serde_json::Value = response.json().await.expect("Failed to parse JSON");
    let sale_id = body["sale_id"].as_str().expect("Missing sale_id").to_string();

    let summary: serde_json::Value = client
        .get(format!("{}/sales/{}/summary", app.http_address, sale_id))
        .send()
        .await
        .expect("Failed to execute request")
        .json()
        .await
        .expect("Failed to parse JSON");
    assert_eq!(summary["client_id"], 100);
    assert_eq!(summary["total"], "139990");
    assert_eq!(summary["status"], "pending");

    // a sale is created pending; confirmation is an explicit call
    let updated = client
        .post(format!("{}/sales/{}/status", app.http_address, sale_id))
        .json(&json!({ "status": "confirmed" }))
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(updated.status(), 200);
    let updated_body: serde_json::Value = updated.json().await.expect("Failed to parse JSON");
    assert_eq!(updated_body["status"], "confirmed");

    let rejected = client
        .post(format!("{}/sales/{}/status", app.http_address, sale_id))
        .json(&json!({ "status": "shipped" }))
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(rejected.status(), 400);
}

#[tokio::test]
async fn missing_sale_returns_404() {
    let app = TestApp::spawn().await;

    let client = Client::new();
    let response = client
        .get(format!(
            "{}/sales/{}",
            app.http_address,
            uuid::Uuid::new_v4()
        ))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), 404);
}
