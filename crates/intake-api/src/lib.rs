//! # intake-api — HTTP Service for Schema-Driven Form Intake
//!
//! Serves a declarative form schema to rendering clients and accepts
//! submissions against it. Every submission write passes through the
//! validation engine in `intake-core`; nothing invalid ever reaches
//! the store.
//!
//! ## API Surface
//!
//! | Route                              | Module                   |
//! |------------------------------------|--------------------------|
//! | `GET /rest/v1/form-schema`         | [`routes::schema`]       |
//! | `POST/GET /rest/v1/submissions`    | [`routes::submissions`]  |
//! | `PUT/DELETE /rest/v1/submissions/{id}` | [`routes::submissions`] |
//! | `GET /rest/v1/submissions/export`  | [`routes::submissions`]  |
//! | `GET /openapi.json`                | [`openapi`]              |
//! | `GET /health/*`                    | health probes            |
//!
//! ## Middleware Stack (execution order)
//!
//! ```text
//! TraceLayer → CorsLayer → RateLimitMiddleware → Handler
//! ```

pub mod db;
pub mod error;
pub mod extractors;
pub mod middleware;
pub mod openapi;
pub mod routes;
pub mod state;

use axum::extract::State;
use axum::http::StatusCode;
use axum::middleware::from_fn;
use axum::response::{IntoResponse, Response};
use axum::{Json, Router};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::error::MessageBody;
use crate::middleware::rate_limit::{RateLimitConfig, RateLimiter};
use crate::state::AppState;

/// Assemble the full application router with all routes and middleware.
///
/// Health probes (`/health/*`) are mounted outside the rate limiter so
/// orchestrator checks never count against client budgets.
pub fn app(state: AppState) -> Router {
    app_with_rate_limit(state, RateLimitConfig::default())
}

/// [`app`] with an explicit rate limit, so tests can exercise the
/// limiter with small windows.
pub fn app_with_rate_limit(state: AppState, rate_limit: RateLimitConfig) -> Router {
    let limiter = RateLimiter::new(rate_limit);

    let api = Router::new()
        .merge(routes::schema::router())
        .merge(routes::submissions::router())
        .merge(openapi::router())
        .layer(from_fn(middleware::rate_limit::rate_limit_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .layer(axum::Extension(limiter))
        .with_state(state.clone());

    let health = Router::new()
        .route("/health/liveness", axum::routing::get(liveness))
        .route("/health/readiness", axum::routing::get(readiness))
        .with_state(state);

    Router::new().merge(health).merge(api).fallback(not_found)
}

/// Liveness probe — always returns 200 if the process is running.
async fn liveness() -> &'static str {
    "ok"
}

/// Readiness probe — 200 when the service can take traffic. With a
/// database configured, that includes a round-trip to it.
async fn readiness(State(state): State<AppState>) -> Response {
    if let Some(pool) = &state.db_pool {
        if let Err(e) = sqlx::query("SELECT 1").execute(pool).await {
            tracing::warn!(error = %e, "readiness check failed");
            return (StatusCode::SERVICE_UNAVAILABLE, "database unavailable").into_response();
        }
    }
    "ready".into_response()
}

/// Fallback for unmatched routes.
async fn not_found() -> Response {
    let body = MessageBody {
        success: false,
        message: "Not Found".to_string(),
    };
    (StatusCode::NOT_FOUND, Json(body)).into_response()
}
