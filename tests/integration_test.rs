//! Integration tests for ipam-reservation
//!
//! These tests drive the HTTP routes end to end against an in-memory store.

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use ipam_reservation::allocation::AllocationEngine;
use ipam_reservation::api::build_router;
use ipam_reservation::api::dto::{ErrorResponse, ListResponse, ReleaseResponse, ReserveResponse};
use ipam_reservation::store::SqliteStore;
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

fn app() -> Router {
    let store = SqliteStore::open_in_memory().expect("Failed to open in-memory store");
    build_router(Arc::new(AllocationEngine::new(store)))
}

async fn send<T: DeserializeOwned>(app: &Router, request: Request<Body>) -> (StatusCode, T) {
    let response = app.clone().oneshot(request).await.expect("Request failed");
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("Failed to read body");
    let body = serde_json::from_slice(&bytes)
        .unwrap_or_else(|e| panic!("Bad JSON body ({e}): {}", String::from_utf8_lossy(&bytes)));
    (status, body)
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::post(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::get(uri).body(Body::empty()).unwrap()
}

async fn reserve(app: &Router, cidr: &str, tenant: &str) -> (StatusCode, Value) {
    send(
        app,
        post_json(
            "/reserve-ip",
            json!({"cidr": cidr, "tenant_name": tenant, "purpose": "host"}),
        ),
    )
    .await
}

#[tokio::test]
async fn test_reserve_list_release_workflow() {
    let app = app();

    let (status, first): (_, ReserveResponse) = send(
        &app,
        post_json(
            "/reserve-ip",
            json!({"cidr": "10.0.0.0/24", "tenant_name": "acme", "purpose": "gateway"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        first,
        ReserveResponse {
            ip_address: "10.0.0.1".to_string(),
            reserved: true
        }
    );

    let (_, second) = reserve(&app, "10.0.0.0/24", "acme").await;
    assert_eq!(second["ip_address"], "10.0.0.2");

    let (status, listed): (_, ListResponse) =
        send(&app, get("/get-ips-in-subnet?subnet=10.0.0.0/24")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(listed.ips, vec!["10.0.0.1", "10.0.0.2"]);

    let (status, released): (_, ReleaseResponse) = send(
        &app,
        post_json(
            "/release-ip",
            json!({"cidr": "10.0.0.0/24", "tenant_name": "acme", "ip_address": "10.0.0.1"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(released.success);

    let (_, listed): (_, ListResponse) =
        send(&app, get("/get-ips-in-subnet?subnet=10.0.0.0/24")).await;
    assert_eq!(listed.ips, vec!["10.0.0.2"]);

    // The released address is the lowest free one again.
    let (_, again) = reserve(&app, "10.0.0.0/24", "acme").await;
    assert_eq!(again["ip_address"], "10.0.0.1");
}

#[tokio::test]
async fn test_release_unknown_returns_false() {
    let app = app();
    let (status, released): (_, ReleaseResponse) = send(
        &app,
        post_json(
            "/release-ip",
            json!({"cidr": "10.0.0.0/24", "tenant_name": "acme", "ip_address": "10.0.0.42"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(!released.success);
}

#[tokio::test]
async fn test_exhausted_block_is_conflict() {
    let app = app();
    // /30: .1, .2 and .3 are allocatable.
    for expected in ["10.9.0.1", "10.9.0.2", "10.9.0.3"] {
        let (status, body) = reserve(&app, "10.9.0.0/30", "acme").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["ip_address"], expected);
    }

    let (status, error): (_, ErrorResponse) = send(
        &app,
        post_json(
            "/reserve-ip",
            json!({"cidr": "10.9.0.0/30", "tenant_name": "acme", "purpose": "host"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(error.error, "no_available_address");
    assert!(error.message.contains("10.9.0.0/30"));
    assert!(error.message.contains("acme"));
}

#[tokio::test]
async fn test_malformed_requests_are_client_errors() {
    let app = app();

    let (status, error): (_, ErrorResponse) = send(
        &app,
        post_json("/reserve-ip", json!({"cidr": "10.0.0.0/24", "purpose": "host"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error.error, "invalid_input");
    assert!(error.message.contains("tenant_name"));

    let (status, body) = reserve(&app, "10.0.0.0/33", "acme").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "invalid_input");

    let (status, error): (_, ErrorResponse) = send(
        &app,
        post_json(
            "/release-ip",
            json!({"cidr": "10.0.0.0/24", "tenant_name": "acme", "ip_address": "not-an-ip"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(error.message.contains("not-an-ip"));

    let (status, error): (_, ErrorResponse) = send(&app, get("/get-ips-in-subnet")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error.message, "invalid input: subnet parameter is required");
}

#[tokio::test]
async fn test_rejected_query_string_is_json_error() {
    let app = app();
    let (status, error): (_, ErrorResponse) = send(
        &app,
        get("/get-ips-in-subnet?subnet=10.0.0.0/24&subnet=10.0.1.0/24"),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error.error, "invalid_input");
    assert!(error.message.contains("duplicate field"), "{}", error.message);
}

#[tokio::test]
async fn test_wrong_method_is_rejected() {
    let app = app();
    let response = app
        .clone()
        .oneshot(get("/reserve-ip"))
        .await
        .expect("Request failed");
    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
}

#[tokio::test]
async fn test_list_is_exact_block_match() {
    let app = app();
    reserve(&app, "10.0.0.0/24", "acme").await;
    reserve(&app, "10.0.0.0/24", "globex").await;
    reserve(&app, "10.0.0.0/16", "acme").await;

    let (_, listed): (_, ListResponse) =
        send(&app, get("/get-ips-in-subnet?subnet=10.0.0.0/24")).await;
    assert_eq!(listed.ips, vec!["10.0.0.1", "10.0.0.1"]);

    let (_, listed): (_, ListResponse) =
        send(&app, get("/get-ips-in-subnet?subnet=10.0.0.0/25")).await;
    assert!(listed.ips.is_empty());
}

#[tokio::test]
async fn test_list_bare_address_is_single_host() {
    let app = app();
    reserve(&app, "10.0.0.0/24", "acme").await;

    let (status, listed): (_, ListResponse) =
        send(&app, get("/get-ips-in-subnet?subnet=10.0.0.1")).await;
    assert_eq!(status, StatusCode::OK);
    assert!(listed.ips.is_empty());
}

#[tokio::test]
async fn test_concurrent_reserves_get_distinct_addresses() {
    let app = app();
    let requests = (0..32).map(|_| reserve(&app, "192.168.50.0/24", "acme"));
    let results = futures::future::join_all(requests).await;

    let mut ips: Vec<String> = results
        .into_iter()
        .map(|(status, body)| {
            assert_eq!(status, StatusCode::OK);
            body["ip_address"].as_str().unwrap().to_string()
        })
        .collect();
    ips.sort();
    ips.dedup();
    assert_eq!(ips.len(), 32, "Every reservation must get its own address");
}
