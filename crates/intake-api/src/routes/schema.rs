//! # Form Schema API
//!
//! Serves the active form schema to rendering clients.

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use intake_core::FormSchema;
use serde::Serialize;
use utoipa::ToSchema;

use crate::state::AppState;

/// Envelope for the schema document.
#[derive(Debug, Serialize, ToSchema)]
pub struct SchemaEnvelope {
    #[schema(value_type = Object)]
    pub schema: FormSchema,
}

/// Build the schema router.
pub fn router() -> Router<AppState> {
    Router::new().route("/rest/v1/form-schema", get(get_form_schema))
}

/// GET /rest/v1/form-schema — The active form schema.
#[utoipa::path(
    get,
    path = "/rest/v1/form-schema",
    responses(
        (status = 200, description = "Active form schema", body = SchemaEnvelope),
    ),
    tag = "schema"
)]
pub async fn get_form_schema(State(state): State<AppState>) -> Json<SchemaEnvelope> {
    Json(SchemaEnvelope {
        schema: FormSchema::clone(&state.schema),
    })
}
