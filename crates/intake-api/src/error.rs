//! # API Error Types
//!
//! Structured error type implementing `axum::response::IntoResponse`.
//! Response bodies follow the wire shapes the form clients already
//! string-assert on: validation failures carry the engine's error
//! report verbatim under `errors`; everything else is
//! `{"success": false, "message": …}`. Internal error details are
//! never exposed to clients.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use intake_core::ValidationReport;
use serde::Serialize;
use thiserror::Error;
use utoipa::ToSchema;

/// Error body for validation failures: the field-keyed report from the
/// validation engine, passed through verbatim.
#[derive(Debug, Serialize, ToSchema)]
pub struct ValidationErrorBody {
    pub success: bool,
    pub errors: std::collections::BTreeMap<String, String>,
}

/// Error body for every non-validation failure.
#[derive(Debug, Serialize, ToSchema)]
pub struct MessageBody {
    pub success: bool,
    pub message: String,
}

/// Application-level error type that implements [`IntoResponse`].
#[derive(Error, Debug)]
pub enum AppError {
    /// The payload violated the active schema (400). Carries the full
    /// engine report so the client can render all field errors at once.
    #[error("validation failed for {} field(s)", .0.errors.len())]
    Validation(ValidationReport),

    /// Resource not found (404).
    #[error("not found: {0}")]
    NotFound(String),

    /// Request could not be interpreted (400) — malformed JSON body or
    /// malformed path parameter.
    #[error("bad request: {0}")]
    BadRequest(String),

    /// Internal server error (500). Message is logged but not returned
    /// to the client.
    #[error("internal error: {0}")]
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            Self::Validation(report) => {
                let body = ValidationErrorBody {
                    success: false,
                    errors: report.errors,
                };
                (StatusCode::BAD_REQUEST, Json(body)).into_response()
            }
            Self::NotFound(message) => {
                let body = MessageBody {
                    success: false,
                    message,
                };
                (StatusCode::NOT_FOUND, Json(body)).into_response()
            }
            Self::BadRequest(message) => {
                let body = MessageBody {
                    success: false,
                    message,
                };
                (StatusCode::BAD_REQUEST, Json(body)).into_response()
            }
            Self::Internal(_) => {
                tracing::error!(error = %self, "internal server error");
                let body = MessageBody {
                    success: false,
                    message: "Internal server error".to_string(),
                };
                (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
            }
        }
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        Self::Internal(err.to_string())
    }
}
