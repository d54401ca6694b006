//! Database migration command.
//!
//! Connects using the same configuration as the API server and applies any
//! pending migrations. The server also migrates on startup; this command
//! exists so deployments can migrate ahead of a rollout.

use stockroom_api::config::ApiConfig;
use stockroom_api::db;

/// Run pending database migrations.
///
/// # Errors
///
/// Returns an error if configuration is invalid, the store is unreachable,
/// or a migration fails to apply.
pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = ApiConfig::from_env()?;

    tracing::info!("Connecting to database...");
    let pool = db::create_pool(&config.database_url).await?;

    tracing::info!("Running migrations...");
    db::run_migrations(&pool).await?;
    pool.close().await;

    tracing::info!("Migrations complete");
    Ok(())
}
