//! API integration tests
//!
//! These run against a live server with the identity and fines
//! collaborators available.

use reqwest::Client;
use serde_json::{json, Value};

const BASE_URL: &str = "http://localhost:8082/api/v1";

/// Librarian account expected on the identity service test fixture
const LIBRARIAN_ID: i64 = 1;
/// Student account expected on the identity service test fixture
const STUDENT_ID: i64 = 2;

/// Register a fresh title and return its key
async fn register_title(client: &Client, copies: u32) -> String {
    let key = format!("isbn-test-{}", uuid::Uuid::new_v4());
    let response = client
        .post(format!("{}/titles", BASE_URL))
        .json(&json!({
            "title_key": key,
            "total_copies": copies
        }))
        .send()
        .await
        .expect("Failed to send register request");

    assert_eq!(response.status(), 201);
    key
}

#[tokio::test]
#[ignore] // Run with: cargo test -- --ignored
async fn test_health_check() {
    let client = Client::new();

    let response = client
        .get(format!("{}/health", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
#[ignore]
async fn test_register_and_get_title() {
    let client = Client::new();
    let key = register_title(&client, 3).await;

    let response = client
        .get(format!("{}/titles/{}", BASE_URL, key))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["total_copies"], 3);
    assert_eq!(body["available_copies"], 3);
    assert_eq!(body["status"], "AVAILABLE");
}

#[tokio::test]
#[ignore]
async fn test_register_duplicate_title() {
    let client = Client::new();
    let key = register_title(&client, 1).await;

    let response = client
        .post(format!("{}/titles", BASE_URL))
        .json(&json!({
            "title_key": key,
            "total_copies": 1
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 409);
}

#[tokio::test]
#[ignore]
async fn test_get_unknown_title() {
    let client = Client::new();

    let response = client
        .get(format!("{}/titles/no-such-title", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 404);

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["retryable"], false);
}

#[tokio::test]
#[ignore]
async fn test_checkout_and_return() {
    let client = Client::new();
    let key = register_title(&client, 1).await;

    let response = client
        .post(format!("{}/loans", BASE_URL))
        .json(&json!({
            "holder_id": STUDENT_ID,
            "title_key": key,
            "actor_id": LIBRARIAN_ID
        }))
        .send()
        .await
        .expect("Failed to send checkout request");

    assert_eq!(response.status(), 201);

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["loan"]["status"], "ACTIVE");
    let loan_id = body["loan"]["id"].as_str().expect("No loan id").to_string();

    // The copy is out
    let response = client
        .get(format!("{}/titles/{}", BASE_URL, key))
        .send()
        .await
        .expect("Failed to send request");
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["available_copies"], 0);
    assert_eq!(body["status"], "UNAVAILABLE");

    let response = client
        .post(format!("{}/loans/return", BASE_URL))
        .json(&json!({
            "holder_id": STUDENT_ID,
            "title_key": key
        }))
        .send()
        .await
        .expect("Failed to send return request");

    assert!(response.status().is_success());

    let response = client
        .get(format!("{}/loans/{}", BASE_URL, loan_id))
        .send()
        .await
        .expect("Failed to send request");
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["status"], "RETURNED");
}

#[tokio::test]
#[ignore]
async fn test_checkout_out_of_stock() {
    let client = Client::new();
    let key = register_title(&client, 1).await;

    let response = client
        .post(format!("{}/loans", BASE_URL))
        .json(&json!({
            "holder_id": STUDENT_ID,
            "title_key": key,
            "actor_id": LIBRARIAN_ID
        }))
        .send()
        .await
        .expect("Failed to send checkout request");
    assert_eq!(response.status(), 201);

    // Second holder, no copy left
    let response = client
        .post(format!("{}/loans", BASE_URL))
        .json(&json!({
            "holder_id": STUDENT_ID + 1,
            "title_key": key,
            "actor_id": LIBRARIAN_ID
        }))
        .send()
        .await
        .expect("Failed to send checkout request");

    assert_eq!(response.status(), 409);
}

#[tokio::test]
#[ignore]
async fn test_reserve_and_cancel() {
    let client = Client::new();
    let key = register_title(&client, 1).await;

    let response = client
        .post(format!("{}/reservations", BASE_URL))
        .json(&json!({
            "holder_id": STUDENT_ID,
            "title_key": key
        }))
        .send()
        .await
        .expect("Failed to send reserve request");

    assert_eq!(response.status(), 201);

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["status"], "ACTIVE");
    let hold_id = body["id"].as_str().expect("No hold id").to_string();

    let response = client
        .post(format!("{}/reservations/{}/cancel", BASE_URL, hold_id))
        .json(&json!({ "holder_id": STUDENT_ID }))
        .send()
        .await
        .expect("Failed to send cancel request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["status"], "CANCELLED");
}

#[tokio::test]
#[ignore]
async fn test_cancel_other_holders_reservation() {
    let client = Client::new();
    let key = register_title(&client, 1).await;

    let response = client
        .post(format!("{}/reservations", BASE_URL))
        .json(&json!({
            "holder_id": STUDENT_ID,
            "title_key": key
        }))
        .send()
        .await
        .expect("Failed to send reserve request");
    let body: Value = response.json().await.expect("Failed to parse response");
    let hold_id = body["id"].as_str().expect("No hold id").to_string();

    let response = client
        .post(format!("{}/reservations/{}/cancel", BASE_URL, hold_id))
        .json(&json!({ "holder_id": STUDENT_ID + 1 }))
        .send()
        .await
        .expect("Failed to send cancel request");

    assert_eq!(response.status(), 403);
}

#[tokio::test]
#[ignore]
async fn test_sweep_endpoints() {
    let client = Client::new();

    let response = client
        .post(format!("{}/sweeps/expired-holds", BASE_URL))
        .send()
        .await
        .expect("Failed to send sweep request");
    assert!(response.status().is_success());
    let body: Value = response.json().await.expect("Failed to parse response");
    assert!(body["transitioned"].is_number());

    let response = client
        .post(format!("{}/sweeps/overdue-loans", BASE_URL))
        .send()
        .await
        .expect("Failed to send sweep request");
    assert!(response.status().is_success());
}

#[tokio::test]
#[ignore]
async fn test_validation_rejects_blank_title_key() {
    let client = Client::new();

    let response = client
        .post(format!("{}/titles", BASE_URL))
        .json(&json!({
            "title_key": "",
            "total_copies": 1
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 400);
}
