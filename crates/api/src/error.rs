//! API error types with HTTP response mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use catalog::CatalogError;
use orders::OrderError;

/// API-level error type that maps to HTTP responses.
#[derive(Debug)]
pub enum ApiError {
    /// No or unusable credentials.
    Unauthorized(String),
    /// Authenticated but lacking the required role.
    Forbidden(String),
    /// Resource not found.
    NotFound(String),
    /// Bad request from the client.
    BadRequest(String),
    /// Catalog operation error.
    Catalog(CatalogError),
    /// Order core error.
    Order(OrderError),
    /// Internal server error.
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg),
            ApiError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Catalog(err) => catalog_error_to_response(err),
            ApiError::Order(err) => order_error_to_response(err),
            ApiError::Internal(msg) => {
                tracing::error!(error = %msg, "internal server error");
                (StatusCode::INTERNAL_SERVER_ERROR, msg)
            }
        };

        let body = serde_json::json!({ "error": message });
        (status, axum::Json(body)).into_response()
    }
}

fn catalog_error_to_response(err: CatalogError) -> (StatusCode, String) {
    match &err {
        CatalogError::NotFound(_) => (StatusCode::NOT_FOUND, err.to_string()),
        CatalogError::DuplicateName(_) | CatalogError::InsufficientStock { .. } => {
            (StatusCode::CONFLICT, err.to_string())
        }
        CatalogError::InvalidProduct(_) => (StatusCode::BAD_REQUEST, err.to_string()),
        CatalogError::Unavailable(_) => (StatusCode::BAD_GATEWAY, err.to_string()),
    }
}

fn order_error_to_response(err: OrderError) -> (StatusCode, String) {
    match &err {
        OrderError::Validation(_) => (StatusCode::BAD_REQUEST, err.to_string()),
        OrderError::ItemNotFound(_) | OrderError::OrderNotFound(_) => {
            (StatusCode::NOT_FOUND, err.to_string())
        }
        OrderError::InsufficientStock { .. } => (StatusCode::CONFLICT, err.to_string()),
        OrderError::Upstream(_) => (StatusCode::BAD_GATEWAY, err.to_string()),
        OrderError::Store(_) => (StatusCode::INTERNAL_SERVER_ERROR, err.to_string()),
    }
}

impl From<CatalogError> for ApiError {
    fn from(err: CatalogError) -> Self {
        ApiError::Catalog(err)
    }
}

impl From<OrderError> for ApiError {
    fn from(err: OrderError) -> Self {
        ApiError::Order(err)
    }
}
