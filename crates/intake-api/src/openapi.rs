//! # OpenAPI Specification Assembly
//!
//! Assembles all utoipa-documented routes into a single OpenAPI spec,
//! served at `/openapi.json`.

use axum::routing::get;
use axum::{Json, Router};
use utoipa::OpenApi;

use crate::state::AppState;

/// Assembled OpenAPI spec for the entire API surface.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Intake API",
        version = "0.1.0",
        description = "Schema-driven form intake: serves the active form schema, validates submissions against it, and manages the submission lifecycle."
    ),
    paths(
        crate::routes::schema::get_form_schema,
        crate::routes::submissions::create_submission,
        crate::routes::submissions::list_submissions,
        crate::routes::submissions::update_submission,
        crate::routes::submissions::delete_submission,
        crate::routes::submissions::export_submissions,
    ),
    components(schemas(
        crate::state::SubmissionRecord,
        crate::error::ValidationErrorBody,
        crate::error::MessageBody,
        crate::routes::schema::SchemaEnvelope,
        crate::routes::submissions::CreateResponse,
        crate::routes::submissions::UpdateResponse,
        crate::routes::submissions::ListResponse,
    )),
    tags(
        (name = "schema", description = "Form schema for rendering clients"),
        (name = "submissions", description = "Submission lifecycle behind the validation gate"),
    )
)]
pub struct ApiDoc;

/// Build the OpenAPI router.
pub fn router() -> Router<AppState> {
    Router::new().route("/openapi.json", get(openapi_json))
}

/// GET /openapi.json — Return the generated OpenAPI specification.
async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
