//! Integration test harness for Stockroom.
//!
//! Drives the real axum router against an in-memory `SQLite` store, so the
//! whole suite runs hermetically: no server process, no external database.
//!
//! # Example
//!
//! ```rust,ignore
//! let app = TestApp::new().await;
//! let (status, body) = app
//!     .post("/api/v1/products/", json!({"name": "Tee", "price": "10.0", ...}))
//!     .await;
//! assert_eq!(status, StatusCode::CREATED);
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]
#![allow(clippy::unwrap_used, clippy::missing_panics_doc)]

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use secrecy::SecretString;
use serde_json::Value;
use tower::ServiceExt;

use stockroom_api::config::ApiConfig;
use stockroom_api::db::{self, DbPool};
use stockroom_api::routes;
use stockroom_api::state::AppState;
use stockroom_core::PageLimits;

/// A fully wired application over an in-memory store.
pub struct TestApp {
    router: Router,
    pool: DbPool,
}

impl TestApp {
    /// Build the router over a fresh, migrated in-memory database.
    pub async fn new() -> Self {
        let pool = db::create_pool_with("sqlite::memory:", 1)
            .await
            .expect("failed to open in-memory store");
        db::run_migrations(&pool)
            .await
            .expect("failed to run migrations");

        let config = ApiConfig {
            database_url: SecretString::from("sqlite::memory:"),
            host: "127.0.0.1".parse().unwrap(),
            port: 0,
            page_limits: PageLimits::default(),
            cors_origins: vec!["*".to_string()],
        };

        let router = routes::app(AppState::new(config, pool.clone()));
        Self { router, pool }
    }

    /// Direct handle to the store, for asserting on persisted state.
    #[must_use]
    pub const fn pool(&self) -> &DbPool {
        &self.pool
    }

    /// Send a GET request and decode the JSON response.
    pub async fn get(&self, path: &str) -> (StatusCode, Value) {
        let request = Request::builder()
            .method("GET")
            .uri(path)
            .body(Body::empty())
            .unwrap();
        self.send(request).await
    }

    /// Send a POST request with a JSON body and decode the JSON response.
    pub async fn post(&self, path: &str, body: Value) -> (StatusCode, Value) {
        let request = Request::builder()
            .method("POST")
            .uri(path)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        self.send(request).await
    }

    async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("request failed");

        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("failed to read response body");
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).expect("response body was not JSON")
        };

        (status, body)
    }

    /// Create a product through the API and return its id.
    pub async fn create_product(&self, name: &str, price: &str, sizes: Value) -> String {
        let (status, body) = self
            .post(
                "/api/v1/products/",
                serde_json::json!({"name": name, "price": price, "sizes": sizes}),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "create_product failed: {body}");
        body["id"].as_str().expect("missing id").to_string()
    }

    /// Create an order through the API and return its id.
    pub async fn create_order(&self, user_id: &str, items: Value) -> String {
        let (status, body) = self
            .post(
                "/api/v1/orders/",
                serde_json::json!({"userId": user_id, "items": items}),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "create_order failed: {body}");
        body["id"].as_str().expect("missing id").to_string()
    }

    /// Count rows in a collection, for no-partial-write assertions.
    pub async fn count(&self, table: &str) -> i64 {
        // Table names come from the test itself, never from input.
        let sql = format!("SELECT COUNT(*) FROM {table}");
        sqlx::query_scalar::<_, i64>(&sql)
            .fetch_one(&self.pool)
            .await
            .expect("count query failed")
    }
}
