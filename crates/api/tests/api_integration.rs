//! Integration tests for the API server.

use std::sync::{Arc, OnceLock};

use axum::body::Body;
use axum::http::{Request, StatusCode};
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use catalog::InMemoryCatalog;
use metrics_exporter_prometheus::PrometheusHandle;
use orders::InMemoryOrderStore;
use tower::ServiceExt;
use uuid::Uuid;

static METRICS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

fn get_metrics_handle() -> PrometheusHandle {
    METRICS_HANDLE
        .get_or_init(|| {
            let builder = metrics_exporter_prometheus::PrometheusBuilder::new();
            builder
                .install_recorder()
                .expect("failed to install Prometheus recorder")
        })
        .clone()
}

fn setup() -> (
    axum::Router,
    Arc<api::state::AppState<InMemoryCatalog, InMemoryOrderStore>>,
) {
    let (state, _, _) = api::create_default_state();
    let app = api::create_app(state.clone(), get_metrics_handle());
    (app, state)
}

/// Builds an unsigned bearer token carrying the given subject and realm
/// roles (signature verification is the identity layer's job).
fn bearer(sub: Uuid, roles: &[&str]) -> String {
    let claims = serde_json::json!({
        "sub": sub.to_string(),
        "realm_access": { "roles": roles }
    });
    let payload = URL_SAFE_NO_PAD.encode(claims.to_string());
    format!("Bearer eyJhbGciOiJub25lIn0.{payload}.x")
}

fn admin_token() -> String {
    bearer(Uuid::new_v4(), &["ADMIN"])
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}

async fn create_product(
    app: &axum::Router,
    name: &str,
    price_cents: i64,
    quantity: u32,
) -> String {
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/products")
                .header("content-type", "application/json")
                .header("authorization", admin_token())
                .body(Body::from(
                    serde_json::json!({
                        "name": name,
                        "price_cents": price_cents,
                        "quantity": quantity
                    })
                    .to_string(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    body_json(response).await["id"].as_str().unwrap().to_string()
}

async fn place_order(
    app: &axum::Router,
    token: &str,
    products: serde_json::Value,
) -> axum::response::Response {
    app.clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/orders")
                .header("content-type", "application/json")
                .header("authorization", token)
                .body(Body::from(
                    serde_json::json!({ "products": products }).to_string(),
                ))
                .unwrap(),
        )
        .await
        .unwrap()
}

async fn get_with_token(app: &axum::Router, uri: &str, token: &str) -> axum::response::Response {
    app.clone()
        .oneshot(
            Request::builder()
                .uri(uri)
                .header("authorization", token)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap()
}

#[tokio::test]
async fn test_health_check() {
    let (app, _) = setup();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["status"], "ok");
}

#[tokio::test]
async fn test_products_require_authentication() {
    let (app, _) = setup();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/products")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_garbage_token_is_unauthorized() {
    let (app, _) = setup();

    let response = get_with_token(&app, "/api/products", "Bearer not.a.token").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_client_cannot_create_product() {
    let (app, _) = setup();
    let token = bearer(Uuid::new_v4(), &["CLIENT"]);

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/products")
                .header("content-type", "application/json")
                .header("authorization", token)
                .body(Body::from(
                    serde_json::json!({
                        "name": "Widget",
                        "price_cents": 1000,
                        "quantity": 5
                    })
                    .to_string(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_product_crud_round_trip() {
    let (app, _) = setup();
    let id = create_product(&app, "Widget", 1000, 5).await;
    let client = bearer(Uuid::new_v4(), &["CLIENT"]);

    let response = get_with_token(&app, &format!("/api/products/{id}"), &client).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["name"], "Widget");
    assert_eq!(json["price_cents"], 1000);
    assert_eq!(json["quantity"], 5);

    let response = get_with_token(&app, "/api/products", &client).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_duplicate_product_name_conflicts() {
    let (app, _) = setup();
    create_product(&app, "Widget", 1000, 5).await;

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/products")
                .header("content-type", "application/json")
                .header("authorization", admin_token())
                .body(Body::from(
                    serde_json::json!({
                        "name": "Widget",
                        "price_cents": 2000,
                        "quantity": 1
                    })
                    .to_string(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_place_order_end_to_end() {
    // p1 at $10.00 stock 5; basket {p1: 2} => total $20.00, stock 3.
    let (app, _) = setup();
    let id = create_product(&app, "p1", 1000, 5).await;
    let client = bearer(Uuid::new_v4(), &["CLIENT"]);

    let response = place_order(&app, &client, serde_json::json!({ (id.clone()): 2 })).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let order = body_json(response).await;
    assert_eq!(order["status"], "CREATED");
    assert_eq!(order["total_cents"], 2000);
    assert_eq!(order["lines"].as_array().unwrap().len(), 1);
    assert_eq!(order["lines"][0]["quantity"], 2);
    assert_eq!(order["lines"][0]["unit_price_cents"], 1000);

    let response = get_with_token(&app, &format!("/api/products/{id}"), &client).await;
    assert_eq!(body_json(response).await["quantity"], 3);
}

#[tokio::test]
async fn test_insufficient_stock_conflicts_and_preserves_stock() {
    let (app, _) = setup();
    let id = create_product(&app, "p1", 1000, 5).await;
    let client = bearer(Uuid::new_v4(), &["CLIENT"]);

    let response = place_order(&app, &client, serde_json::json!({ (id.clone()): 6 })).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let response = get_with_token(&app, &format!("/api/products/{id}"), &client).await;
    assert_eq!(body_json(response).await["quantity"], 5);
}

#[tokio::test]
async fn test_empty_basket_is_bad_request() {
    let (app, _) = setup();
    let client = bearer(Uuid::new_v4(), &["CLIENT"]);

    let response = place_order(&app, &client, serde_json::json!({})).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_order_visibility_rules() {
    let (app, _) = setup();
    let id = create_product(&app, "p1", 1000, 5).await;

    let owner = bearer(Uuid::new_v4(), &["CLIENT"]);
    let stranger = bearer(Uuid::new_v4(), &["CLIENT"]);

    let response = place_order(&app, &owner, serde_json::json!({ (id): 1 })).await;
    let order_id = body_json(response).await["id"].as_str().unwrap().to_string();

    // Owner sees it.
    let response = get_with_token(&app, &format!("/api/orders/{order_id}"), &owner).await;
    assert_eq!(response.status(), StatusCode::OK);

    // Another client gets 404, not 403.
    let response = get_with_token(&app, &format!("/api/orders/{order_id}"), &stranger).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    // Admin sees any order.
    let response = get_with_token(&app, &format!("/api/orders/{order_id}"), &admin_token()).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_order_listing_roles() {
    let (app, _) = setup();
    let id = create_product(&app, "p1", 1000, 10).await;
    let client = bearer(Uuid::new_v4(), &["CLIENT"]);

    place_order(&app, &client, serde_json::json!({ (id.clone()): 1 })).await;
    place_order(&app, &client, serde_json::json!({ (id): 1 })).await;

    // Admin-only listing.
    let response = get_with_token(&app, "/api/orders", &client).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = get_with_token(&app, "/api/orders", &admin_token()).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await.as_array().unwrap().len(), 2);

    // Own orders for the client.
    let response = get_with_token(&app, "/api/orders/my", &client).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await.as_array().unwrap().len(), 2);

    // A different client has none.
    let other = bearer(Uuid::new_v4(), &["CLIENT"]);
    let response = get_with_token(&app, "/api/orders/my", &other).await;
    assert_eq!(body_json(response).await.as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn test_unknown_order_id_is_not_found() {
    let (app, _) = setup();
    let client = bearer(Uuid::new_v4(), &["CLIENT"]);

    let response =
        get_with_token(&app, &format!("/api/orders/{}", Uuid::new_v4()), &client).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = get_with_token(&app, "/api/orders/not-a-uuid", &client).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_metrics_endpoint() {
    let (app, _) = setup();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/metrics")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}
