//! Persistence gateway for the Stockroom store.
//!
//! # Collections
//!
//! - `products` - catalog entries; `sizes` is a JSON document column
//! - `orders` - immutable orders; `items` is a JSON document column
//!
//! Rows are decoded into typed structs here and nowhere else; a row that does
//! not decode is a [`RepositoryError::Decode`], never trusted downstream.
//!
//! # Migrations
//!
//! Migrations live in `crates/api/migrations/` and are embedded via
//! `sqlx::migrate!`. They run on server startup and can also be run
//! explicitly:
//! ```bash
//! cargo run -p stockroom-cli -- migrate
//! ```

use std::time::Duration;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use secrecy::ExposeSecret;
use sqlx::migrate::{MigrateError, Migrator};
use sqlx::sqlite::SqlitePoolOptions;
use thiserror::Error;

pub mod orders;
pub mod products;

pub use orders::OrderRepository;
pub use products::ProductRepository;

/// Connection pool alias for the backing store.
pub type DbPool = sqlx::SqlitePool;

/// Embedded migrations.
pub static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

/// Errors surfaced by the persistence gateway.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// The store rejected or failed the operation.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    /// A stored row did not match the expected shape.
    #[error("decode error: {0}")]
    Decode(String),
}

/// Create a connection pool with sensible defaults.
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<DbPool, sqlx::Error> {
    create_pool_with(database_url.expose_secret(), 5).await
}

/// Create a connection pool with an explicit size.
///
/// In-memory databases must use a single connection: each new connection to
/// `sqlite::memory:` would otherwise open its own empty database.
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool_with(
    database_url: &str,
    max_connections: u32,
) -> Result<DbPool, sqlx::Error> {
    let max_connections = if database_url.contains(":memory:") {
        1
    } else {
        max_connections.max(1)
    };

    SqlitePoolOptions::new()
        .max_connections(max_connections)
        .acquire_timeout(Duration::from_secs(10))
        .after_connect(|conn, _meta| {
            Box::pin(async move {
                sqlx::query("PRAGMA foreign_keys = ON")
                    .execute(&mut *conn)
                    .await?;
                sqlx::query("PRAGMA busy_timeout = 5000")
                    .execute(&mut *conn)
                    .await?;
                Ok(())
            })
        })
        .connect(database_url)
        .await
}

/// Apply pending migrations.
///
/// # Errors
///
/// Returns `MigrateError` if a migration fails to apply.
pub async fn run_migrations(pool: &DbPool) -> Result<(), MigrateError> {
    MIGRATOR.run(pool).await
}

/// Decode a stored decimal column.
pub(crate) fn decode_decimal(column: &str, raw: &str) -> Result<Decimal, RepositoryError> {
    raw.parse::<Decimal>()
        .map_err(|e| RepositoryError::Decode(format!("invalid decimal in `{column}`: {e}")))
}

/// Decode a stored RFC 3339 timestamp column.
pub(crate) fn decode_timestamp(column: &str, raw: &str) -> Result<DateTime<Utc>, RepositoryError> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| RepositoryError::Decode(format!("invalid timestamp in `{column}`: {e}")))
}
