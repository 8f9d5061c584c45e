//! # Database Layer
//!
//! Optional PostgreSQL persistence behind the in-memory store. The
//! service runs fine without it; when `DATABASE_URL` is set, submission
//! writes go through to Postgres and the store is re-hydrated from it
//! on startup.

pub mod submissions;

use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

/// Connect to PostgreSQL and ensure the schema exists.
///
/// Returns `Ok(None)` when `DATABASE_URL` is unset — in-memory-only
/// mode is a supported configuration, not an error.
pub async fn init_pool() -> Result<Option<PgPool>, sqlx::Error> {
    let Ok(url) = std::env::var("DATABASE_URL") else {
        tracing::info!("DATABASE_URL not set, running in-memory only");
        return Ok(None);
    };

    let pool = PgPoolOptions::new().max_connections(5).connect(&url).await?;
    migrate(&pool).await?;
    tracing::info!("connected to PostgreSQL");
    Ok(Some(pool))
}

/// Create the submissions table if it does not exist.
async fn migrate(pool: &PgPool) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS submissions (
            id UUID PRIMARY KEY,
            data JSONB NOT NULL,
            created_at TIMESTAMPTZ NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;
    Ok(())
}
