// ABOUTME: HTTP-level tests for the appointment endpoints and error status mapping
// ABOUTME: Drives the assembled router in-process with tower's oneshot, no listener needed
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

use groomwise::config::environment::{DatabaseConfig, Environment, LogLevel, ServerConfig};
use groomwise::server::{build_router, ServerResources};
use groomwise::test_utils::create_test_db;

async fn test_router() -> Router {
    let database = create_test_db().await.unwrap();
    let config = ServerConfig {
        http_port: 0,
        http_host: "127.0.0.1".to_string(),
        database: DatabaseConfig {
            url: "sqlite::memory:".to_string(),
        },
        log_level: LogLevel::Error,
        environment: Environment::Testing,
    };
    build_router(Arc::new(ServerResources::new(database, config)))
}

fn post(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn patch(uri: &str, body: Option<Value>) -> Request<Body> {
    let builder = Request::builder().method("PATCH").uri(uri);
    match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

async fn json_body(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// Create user, species, weight class, service, configuration, and pet over
/// HTTP; returns (user_id, pet_id, service_id)
async fn seed(router: &Router) -> (i64, i64, i64) {
    let response = router
        .clone()
        .oneshot(post(
            "/users",
            json!({"full_name": "Alice Example", "phone": "555-0100"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let user_id = json_body(response).await["id"].as_i64().unwrap();

    let response = router
        .clone()
        .oneshot(post("/species", json!({"name": "Dog"})))
        .await
        .unwrap();
    let species_id = json_body(response).await["id"].as_i64().unwrap();

    let response = router
        .clone()
        .oneshot(post("/weight_classes", json!({"label": "Small"})))
        .await
        .unwrap();
    let weight_class_id = json_body(response).await["id"].as_i64().unwrap();

    let response = router
        .clone()
        .oneshot(post(
            "/services",
            json!({"name": "Wash", "base_price": "40"}),
        ))
        .await
        .unwrap();
    let service_id = json_body(response).await["id"].as_i64().unwrap();

    let response = router
        .clone()
        .oneshot(post(
            "/service_configurations",
            json!({
                "species_id": species_id,
                "service_id": service_id,
                "weight_class_id": weight_class_id,
                "price": "40",
                "duration_minutes": 30,
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = router
        .clone()
        .oneshot(post(
            "/pets",
            json!({
                "name": "Rex",
                "species_id": species_id,
                "owner_id": user_id,
                "weight_class_id": weight_class_id,
            }),
        ))
        .await
        .unwrap();
    let pet_id = json_body(response).await["id"].as_i64().unwrap();

    (user_id, pet_id, service_id)
}

fn booking_body(user_id: i64, pet_id: i64, service_id: i64, start: &str) -> Value {
    json!({
        "user_id": user_id,
        "pet_id": pet_id,
        "service_id": service_id,
        "start_time": start,
    })
}

#[tokio::test]
async fn test_health_endpoint() {
    let router = test_router().await;
    let response = router.oneshot(get("/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_booking_returns_created_with_snapshots() {
    let router = test_router().await;
    let (user_id, pet_id, service_id) = seed(&router).await;

    let response = router
        .oneshot(post(
            "/appointments",
            booking_body(user_id, pet_id, service_id, "2026-01-01T10:00:00Z"),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let body = json_body(response).await;
    assert_eq!(body["status"], "booked");
    assert_eq!(body["price_snapshot"], "40");
    assert_eq!(body["duration_snapshot"], 30);
}

#[tokio::test]
async fn test_overlap_maps_to_conflict_status() {
    let router = test_router().await;
    let (user_id, pet_id, service_id) = seed(&router).await;

    let response = router
        .clone()
        .oneshot(post(
            "/appointments",
            booking_body(user_id, pet_id, service_id, "2026-01-01T10:00:00Z"),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = router
        .oneshot(post(
            "/appointments",
            booking_body(user_id, pet_id, service_id, "2026-01-01T10:15:00Z"),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let body = json_body(response).await;
    assert_eq!(body["error"]["code"], "BOOKING_CONFLICT");
    assert_eq!(body["error"]["message"], "appointment overlaps existing booking");
}

#[tokio::test]
async fn test_unknown_appointment_maps_to_not_found() {
    let router = test_router().await;
    let response = router.oneshot(get("/appointments/42")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = json_body(response).await;
    assert_eq!(body["error"]["code"], "RESOURCE_NOT_FOUND");
}

#[tokio::test]
async fn test_invalid_id_maps_to_bad_request() {
    let router = test_router().await;
    let response = router.oneshot(get("/appointments/-1")).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_cancel_and_reschedule_endpoints() {
    let router = test_router().await;
    let (user_id, pet_id, service_id) = seed(&router).await;

    let response = router
        .clone()
        .oneshot(post(
            "/appointments",
            booking_body(user_id, pet_id, service_id, "2026-01-01T10:00:00Z"),
        ))
        .await
        .unwrap();
    let id = json_body(response).await["id"].as_i64().unwrap();

    let response = router
        .clone()
        .oneshot(patch(&format!("/appointments/{id}/cancel"), None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await["status"], "cancelled");

    let response = router
        .clone()
        .oneshot(patch(
            &format!("/appointments/{id}/reschedule"),
            Some(json!({"start_time": "2026-01-01T14:00:00Z"})),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["status"], "booked");
    assert_eq!(body["start_time"], "2026-01-01T14:00:00Z");

    let response = router
        .oneshot(get(&format!("/pets/{pet_id}/appointments")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_booking_unknown_pet_maps_to_bad_request() {
    let router = test_router().await;
    let (user_id, _, service_id) = seed(&router).await;

    let response = router
        .oneshot(post(
            "/appointments",
            booking_body(user_id, 9999, service_id, "2026-01-01T10:00:00Z"),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = json_body(response).await;
    assert_eq!(body["error"]["message"], "pet not found");
}

#[tokio::test]
async fn test_booking_without_configuration_maps_to_bad_request() {
    let router = test_router().await;
    let (user_id, pet_id, _) = seed(&router).await;

    // A service with no configuration for the pet's classification.
    let response = router
        .clone()
        .oneshot(post(
            "/services",
            json!({"name": "Nail Trim", "base_price": "15"}),
        ))
        .await
        .unwrap();
    let bare_service_id = json_body(response).await["id"].as_i64().unwrap();

    let response = router
        .oneshot(post(
            "/appointments",
            booking_body(user_id, pet_id, bare_service_id, "2026-01-01T10:00:00Z"),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = json_body(response).await;
    assert_eq!(body["error"]["message"], "service configuration not found");
}

#[tokio::test]
async fn test_configurations_listed_per_service_over_http() {
    let router = test_router().await;
    let (_, _, service_id) = seed(&router).await;

    let response = router
        .clone()
        .oneshot(get(&format!("/service_configurations/service/{service_id}")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    let configs = body.as_array().unwrap();
    assert_eq!(configs.len(), 1);
    assert_eq!(configs[0]["service_id"].as_i64().unwrap(), service_id);

    let response = router
        .oneshot(get("/service_configurations/service/9999"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(json_body(response).await.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_malformed_booking_payload_maps_to_bad_request() {
    let router = test_router().await;
    let response = router
        .oneshot(post("/appointments", json!({"pet_id": 1})))
        .await
        .unwrap();
    // Missing required fields fail at deserialization.
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}
