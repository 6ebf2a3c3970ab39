use crate::core::config::DatabaseConfig;
use sqlx::{migrate::MigrateError, postgres::PgPoolOptions, PgPool};
use std::time::Duration;

/// Build the shared report-store pool from configuration
pub async fn create_pool(config: &DatabaseConfig) -> Result<PgPool, sqlx::Error> {
    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .acquire_timeout(Duration::from_secs(config.acquire_timeout_secs))
        .idle_timeout(Duration::from_secs(config.idle_timeout_secs))
        .max_lifetime(Duration::from_secs(config.max_lifetime_secs))
        .connect(&config.url)
        .await?;

    tracing::info!(
        max_connections = config.max_connections,
        min_connections = config.min_connections,
        "Report store pool ready"
    );

    Ok(pool)
}

/// Apply the embedded `migrations/` directory (reports, timeline, ticket sequence)
pub async fn run_migrations(pool: &PgPool) -> Result<(), MigrateError> {
    tracing::info!("Running database migrations...");
    sqlx::migrate!("./migrations").run(pool).await?;
    tracing::info!("Database migrations completed successfully");
    Ok(())
}
