//! HTTP binding for the storefront services.
//!
//! Exposes the product catalog (CRUD plus the atomic stock decrement)
//! and the order placement flow over REST, with bearer-token identity
//! extraction, structured logging (tracing) and Prometheus metrics.

pub mod auth;
pub mod config;
pub mod error;
pub mod routes;
pub mod state;

use std::sync::Arc;

use axum::Router;
use axum::routing::{delete, get, post, put};
use catalog::{InMemoryCatalog, NewProduct, ProductCatalog};
use common::Money;
use metrics_exporter_prometheus::PrometheusHandle;
use orders::InMemoryOrderStore;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use state::AppState;

/// Creates the Axum application router with all routes and shared state.
pub fn create_app<K, S>(state: Arc<AppState<K, S>>, metrics_handle: PrometheusHandle) -> Router
where
    K: ProductCatalog + Clone + 'static,
    S: orders::OrderStore + Clone + 'static,
{
    let metrics_router = Router::new()
        .route("/metrics", get(routes::metrics::scrape))
        .with_state(metrics_handle);

    Router::new()
        .route("/health", get(routes::health::check))
        .route("/api/products", get(routes::products::list::<K, S>))
        .route("/api/products", post(routes::products::create::<K, S>))
        .route("/api/products/{id}", get(routes::products::get::<K, S>))
        .route("/api/products/{id}", put(routes::products::update::<K, S>))
        .route(
            "/api/products/{id}",
            delete(routes::products::delete::<K, S>),
        )
        .route(
            "/api/products/{id}/decrease-stock",
            post(routes::products::decrease_stock::<K, S>),
        )
        .route("/api/orders", post(routes::orders::place::<K, S>))
        .route("/api/orders", get(routes::orders::list::<K, S>))
        .route("/api/orders/my", get(routes::orders::list_my::<K, S>))
        .route("/api/orders/{id}", get(routes::orders::get::<K, S>))
        .with_state(state)
        .merge(metrics_router)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
}

/// Creates application state over fresh in-memory collaborators.
pub fn create_default_state() -> (
    Arc<AppState<InMemoryCatalog, InMemoryOrderStore>>,
    InMemoryCatalog,
    InMemoryOrderStore,
) {
    let catalog = InMemoryCatalog::new();
    let store = InMemoryOrderStore::new();
    let state = Arc::new(AppState::new(catalog.clone(), store.clone()));
    (state, catalog, store)
}

/// Seeds a few demo products into an empty catalog.
pub async fn seed_demo_products<K: ProductCatalog>(catalog: &K) {
    let existing = match catalog.list().await {
        Ok(products) => products,
        Err(err) => {
            tracing::warn!(error = %err, "could not inspect catalog, skipping seed");
            return;
        }
    };
    if !existing.is_empty() {
        tracing::info!("catalog already contains data, skipping seed");
        return;
    }

    let seeds = [
        NewProduct::new("Laptop HP EliteBook", Money::from_cents(120_000), 10)
            .with_description("Professional portable workstation")
            .with_image_url("https://images.unsplash.com/photo-1496181133206-80ce9b88a853?w=500"),
        NewProduct::new("Smartphone Samsung S24", Money::from_cents(90_000), 25)
            .with_description("Latest Samsung model with AI")
            .with_image_url("https://images.unsplash.com/photo-1511707171634-5f897ff02aa9?w=500"),
        NewProduct::new("Dell 27-inch Monitor", Money::from_cents(35_000), 5)
            .with_description("4K Ultra HD monitor")
            .with_image_url("https://images.unsplash.com/photo-1527443224154-c4a3942d3acf?w=500"),
    ];

    for spec in seeds {
        if let Err(err) = catalog.create(spec).await {
            tracing::warn!(error = %err, "failed to seed product");
        }
    }
    tracing::info!("seeded demo products");
}
