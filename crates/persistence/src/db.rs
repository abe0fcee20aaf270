//! Database connection pool management.

use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use std::time::Duration;

use crate::metrics::QueryTimer;

/// Connection pool settings.
#[derive(Debug, Clone)]
pub struct PoolSettings {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub connect_timeout_secs: u64,
    pub idle_timeout_secs: u64,
}

/// Creates a PostgreSQL connection pool with the given settings.
pub async fn create_pool(settings: &PoolSettings) -> Result<PgPool, sqlx::Error> {
    tracing::debug!(
        max_connections = settings.max_connections,
        min_connections = settings.min_connections,
        "Creating database pool"
    );

    PgPoolOptions::new()
        .max_connections(settings.max_connections)
        .min_connections(settings.min_connections)
        .acquire_timeout(Duration::from_secs(settings.connect_timeout_secs))
        .idle_timeout(Duration::from_secs(settings.idle_timeout_secs))
        .connect(&settings.url)
        .await
}

/// Round-trips a trivial query; used by the health check.
pub async fn ping(pool: &PgPool) -> Result<(), sqlx::Error> {
    let timer = QueryTimer::new("ping");
    let result = sqlx::query("SELECT 1").execute(pool).await;
    timer.record();
    crate::metrics::record_pool_metrics(pool);
    result.map(|_| ())
}
