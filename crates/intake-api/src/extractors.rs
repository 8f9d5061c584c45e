//! # Request Extraction Helpers
//!
//! Maps axum's extraction rejections to the service's error bodies so
//! handlers stay focused on their domain logic.

use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::Path;
use axum::Json;
use intake_core::Payload;
use serde_json::Value;
use uuid::Uuid;

use crate::error::AppError;

/// Extract a submission payload from a JSON body.
///
/// The payload contract is a flat JSON object; an absent or `null`
/// body is the empty payload, anything else non-object is rejected.
pub fn extract_payload(result: Result<Json<Value>, JsonRejection>) -> Result<Payload, AppError> {
    let Json(value) = result.map_err(|err| AppError::BadRequest(err.body_text()))?;
    match value {
        Value::Object(map) => Ok(map),
        Value::Null => Ok(Payload::new()),
        _ => Err(AppError::BadRequest(
            "payload must be a JSON object".to_string(),
        )),
    }
}

/// Extract a submission id path parameter, mapping malformed ids to
/// the client-facing message instead of axum's default rejection text.
pub fn extract_id(result: Result<Path<Uuid>, PathRejection>) -> Result<Uuid, AppError> {
    result
        .map(|Path(id)| id)
        .map_err(|_| AppError::BadRequest("Invalid submission id".to_string()))
}
