use sqlx::{postgres::PgPoolOptions, PgPool};

use crate::error::AppResult;

/// Creates a PostgreSQL connection pool
///
/// A pipeline run issues its writes sequentially, so a small pool suffices.
pub async fn create_pool(database_url: &str) -> anyhow::Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(database_url)
        .await?;

    Ok(pool)
}

/// Applies the embedded migrations under `migrations/`
pub async fn run_migrations(pool: &PgPool) -> AppResult<()> {
    sqlx::migrate!("./migrations").run(pool).await?;
    tracing::info!("Database migrations applied");
    Ok(())
}
