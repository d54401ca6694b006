//! HTTP route handlers for the Stockroom API.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                          - Liveness + store reachability
//!
//! # Products
//! POST /api/v1/products/                - Create product
//! GET  /api/v1/products/                - List products (name?, size?, limit, offset)
//! GET  /api/v1/products/{id}            - Product detail (including sizes)
//!
//! # Orders
//! POST /api/v1/orders/                  - Create order (snapshot total)
//! GET  /api/v1/orders/{userId}          - List a user's orders (limit, offset)
//! GET  /api/v1/orders/order/{orderId}   - Order detail (enriched items)
//! ```

pub mod orders;
pub mod products;

use axum::{
    Json, Router,
    extract::State,
    http::{HeaderValue, StatusCode},
    routing::get,
};
use chrono::Utc;
use serde::Serialize;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::config::ApiConfig;
use crate::state::AppState;

/// Build the full application router with middleware applied.
#[must_use]
pub fn app(state: AppState) -> Router {
    let cors = cors_layer(state.config());

    Router::new()
        .route("/health", get(health))
        .nest("/api/v1/products/", products::router())
        .nest("/api/v1/orders/", orders::router())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Build the CORS layer from configured origins.
fn cors_layer(config: &ApiConfig) -> CorsLayer {
    let cors = CorsLayer::new().allow_methods(Any).allow_headers(Any);

    if config.allows_any_origin() {
        cors.allow_origin(Any)
    } else {
        let origins: Vec<HeaderValue> = config
            .cors_origins
            .iter()
            .filter_map(|origin| origin.parse().ok())
            .collect();
        cors.allow_origin(origins)
    }
}

/// Health check response body.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub database: &'static str,
    pub checked_at: String,
}

/// Health check: liveness plus store reachability.
///
/// Returns 503 Service Unavailable if the store cannot answer a trivial
/// query; the process itself keeps running either way.
pub async fn health(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let checked_at = Utc::now().to_rfc3339();

    match sqlx::query_scalar::<_, i64>("SELECT 1")
        .fetch_one(state.pool())
        .await
    {
        Ok(_) => (
            StatusCode::OK,
            Json(HealthResponse {
                status: "ok",
                database: "reachable",
                checked_at,
            }),
        ),
        Err(error) => {
            tracing::error!(error = %error, "Health check failed to reach the store");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(HealthResponse {
                    status: "degraded",
                    database: "unreachable",
                    checked_at,
                }),
            )
        }
    }
}
