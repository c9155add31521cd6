mod common;

use common::TestApp;
use reqwest::Client;
use serde_json::json;
use std::time::Duration;
use uuid::Uuid;
use wiremock::matchers::{method, path};
use wiremock::{Mock, ResponseTemplate};

fn sale_summary_json(sale_id: &Uuid) -> serde_json::Value {
    json!({
        "sale_id": sale_id,
        "client_id": 100,
        "total": "139990",
        "sale_date": "2024-05-01T12:00:00Z",
        "status": "pending"
    })
}

fn client_json() -> serde_json::Value {
    json!({
        "client_id": 100,
        "display_name": "Ana Rojas",
        "phone": "+56911112222"
    })
}

async fn create_delivery(app: &TestApp, sale_id: &Uuid) -> String {
    let client = Client::new();
    let response = client
        .post(format!("{}/deliveries", app.http_address))
        .json(&json!({ "sale_id": sale_id, "address": "Av. Italia 1439" }))
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status(), 201);

    let body: serde_json::Value = response.json().await.expect("Failed to parse JSON");
    body["delivery_id"]
        .as_str()
        .expect("Missing delivery_id")
        .to_string()
}

#[tokio::test]
async fn create_fetch_and_update_delivery() {
    let app = TestApp::spawn().await;
    let sale_id = Uuid::new_v4();
    let delivery_id = create_delivery(&app, &sale_id).await;

    let client = Client::new();
    let fetched: serde_json::Value = client
        .get(format!("{}/deliveries/{}", app.http_address, delivery_id))
        .send()
        .await
        .expect("Failed to execute request")
        .json()
        .await
        .expect("Failed to parse JSON");
    assert_eq!(fetched["status"], "pending");
    assert_eq!(fetched["sale_id"], sale_id.to_string());
    assert!(fetched["assigned_utc"].is_null());

    let updated = client
        .patch(format!(
            "{}/deliveries/{}/status",
            app.http_address, delivery_id
        ))
        .json(&json!({ "status": "assigned", "carrier_id": 12 }))
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(updated.status(), 200);
    let updated_body: serde_json::Value = updated.json().await.expect("Failed to parse JSON");
    assert_eq!(updated_body["status"], "assigned");
    assert_eq!(updated_body["carrier_id"], 12);
    assert!(!updated_body["assigned_utc"].is_null());

    let rejected = client
        .patch(format!(
            "{}/deliveries/{}/status",
            app.http_address, delivery_id
        ))
        .json(&json!({ "status": "teleported" }))
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(rejected.status(), 400);
}

#[tokio::test]
async fn view_resolves_sale_and_client() {
    let app = TestApp::spawn().await;
    let sale_id = Uuid::new_v4();

    Mock::given(method("GET"))
        .and(path(format!("/sales/{}/summary", sale_id)))
        .respond_with(ResponseTemplate::new(200).set_body_json(sale_summary_json(&sale_id)))
        .expect(1)
        .mount(&app.sales_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/clients/100"))
        .respond_with(ResponseTemplate::new(200).set_body_json(client_json()))
        .expect(1)
        .mount(&app.users_server)
        .await;

    let delivery_id = create_delivery(&app, &sale_id).await;

    let client = Client::new();
    let view: serde_json::Value = client
        .get(format!(
            "{}/deliveries/{}/view",
            app.http_address, delivery_id
        ))
        .send()
        .await
        .expect("Failed to execute request")
        .json()
        .await
        .expect("Failed to parse JSON");

    assert_eq!(view["total"], "139990");
    assert_eq!(view["client_name"], "Ana Rojas");
    assert_eq!(view["client_phone"], "+56911112222");
    assert_eq!(view["sale_resolution"], "resolved");
    assert_eq!(view["client_resolution"], "resolved");
    assert_eq!(view["address"], "Av. Italia 1439");
}

#[tokio::test]
async fn view_with_missing_sale_degrades_and_skips_users() {
    let app = TestApp::spawn().await;
    let sale_id = Uuid::new_v4();

    Mock::given(method("GET"))
        .and(path(format!("/sales/{}/summary", sale_id)))
        .respond_with(ResponseTemplate::new(404))
        .mount(&app.sales_server)
        .await;

    let delivery_id = create_delivery(&app, &sale_id).await;

    let client = Client::new();
    let response = client
        .get(format!(
            "{}/deliveries/{}/view",
            app.http_address, delivery_id
        ))
        .send()
        .await
        .expect("Failed to execute request");

    // a dangling sale reference is not an error for the view itself
    assert_eq!(response.status(), 200);
    let view: serde_json::Value = response.json().await.expect("Failed to parse JSON");
    assert_eq!(view["total"], "0");
    assert_eq!(view["client_name"], "sale not found");
    assert_eq!(view["sale_resolution"], "not_found");
    assert_eq!(view["client_resolution"], "skipped");

    let users_requests = app
        .users_server
        .received_requests()
        .await
        .expect("No requests recorded");
    assert!(users_requests.is_empty());
}

#[tokio::test]
async fn view_with_slow_users_collaborator_keeps_sale_fields() {
    let app = TestApp::spawn().await;
    let sale_id = Uuid::new_v4();

    Mock::given(method("GET"))
        .and(path(format!("/sales/{}/summary", sale_id)))
        .respond_with(ResponseTemplate::new(200).set_body_json(sale_summary_json(&sale_id)))
        .mount(&app.sales_server)
        .await;
    // responds well past the configured 300ms request timeout
    Mock::given(method("GET"))
        .and(path("/clients/100"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(client_json())
                .set_delay(Duration::from_secs(2)),
        )
        .mount(&app.users_server)
        .await;

    let delivery_id = create_delivery(&app, &sale_id).await;

    let client = Client::new();
    let view: serde_json::Value = client
        .get(format!(
            "{}/deliveries/{}/view",
            app.http_address, delivery_id
        ))
        .send()
        .await
        .expect("Failed to execute request")
        .json()
        .await
        .expect("Failed to parse JSON");

    assert_eq!(view["total"], "139990");
    assert_eq!(view["sale_resolution"], "resolved");
    assert_eq!(view["client_resolution"], "unavailable");
    assert_eq!(view["client_name"], "client service unavailable");
    assert_eq!(view["client_phone"], "-");
}

#[tokio::test]
async fn view_with_unreachable_sales_collaborator_degrades() {
    let app = TestApp::spawn().await;
    let sale_id = Uuid::new_v4();

    Mock::given(method("GET"))
        .and(path(format!("/sales/{}/summary", sale_id)))
        .respond_with(ResponseTemplate::new(500))
        .mount(&app.sales_server)
        .await;

    let delivery_id = create_delivery(&app, &sale_id).await;

    let client = Client::new();
    let view: serde_json::Value = client
        .get(format!(
            "{}/deliveries/{}/view",
            app.http_address, delivery_id
        ))
        .send()
        .await
        .expect("Failed to execute request")
        .json()
        .await
        .expect("Failed to parse JSON");

    assert_eq!(view["sale_resolution"], "unavailable");
    assert_eq!(view["client_name"], "sales service unavailable");
    assert_eq!(view["client_resolution"], "skipped");
}

#[tokio::test]
async fn missing_delivery_returns_404() {
    let app = TestApp::spawn().await;
    let client = Client::new();

    let response = client
        .get(format!(
            "{}/deliveries/{}/view",
            app.http_address,
            Uuid::new_v4()
        ))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), 404);
}
