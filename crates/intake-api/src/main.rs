//! # intake-api — Binary Entry Point
//!
//! Starts the Axum HTTP server for the form intake API.
//! Binds to configurable port (default 4000).

use intake_api::state::AppConfig;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize structured tracing.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    // Build configuration from environment.
    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(4000);

    let schema_path = std::env::var("SCHEMA_PATH").ok().map(Into::into);
    let config = AppConfig { port, schema_path };

    // Initialize database pool (optional — absent means in-memory only).
    let db_pool = intake_api::db::init_pool().await.map_err(|e| {
        tracing::error!("Database initialization failed: {e}");
        e
    })?;

    let state = intake_api::state::AppState::with_config(config, db_pool).map_err(|e| {
        tracing::error!("Schema load failed: {e}");
        e
    })?;

    // Hydrate the in-memory store from the database (if connected).
    state.hydrate_from_db().await.map_err(|e| {
        tracing::error!("Database hydration failed: {e}");
        e
    })?;

    let app = intake_api::app(state);

    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("Intake API listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
