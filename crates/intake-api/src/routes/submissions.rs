//! # Submissions API
//!
//! Submission lifecycle behind the validation gate: every create and
//! update runs the payload through the validation engine first and a
//! failing report is returned verbatim with status 400. Accepted
//! payloads are stored exactly as submitted — this service has no
//! opinion on their content beyond the schema's rules.

use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Path, Query, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post, put};
use axum::{Json, Router};
use chrono::{SecondsFormat, Utc};
use intake_core::{coerce, validate, Payload};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::error::AppError;
use crate::extractors::{extract_id, extract_payload};
use crate::state::{AppState, SubmissionRecord};

/// Response to a successful create.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateResponse {
    pub success: bool,
    pub id: Uuid,
    pub created_at: chrono::DateTime<Utc>,
}

/// Response to a successful update.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateResponse {
    pub success: bool,
    pub id: Uuid,
    pub created_at: chrono::DateTime<Utc>,
    #[schema(value_type = Object)]
    pub data: Payload,
}

/// One page of submissions.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ListResponse {
    pub data: Vec<SubmissionRecord>,
    pub page: usize,
    pub limit: usize,
    pub total: usize,
    pub total_pages: usize,
}

/// Raw list query parameters. Values that fail to parse fall back to
/// defaults rather than erroring, matching the tolerant reference
/// behavior.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListQuery {
    pub page: Option<String>,
    pub limit: Option<String>,
    /// Only `createdAt` is supported; the parameter exists for forward
    /// compatibility and is otherwise ignored.
    #[allow(dead_code)]
    pub sort_by: Option<String>,
    pub sort_order: Option<String>,
    pub search: Option<String>,
}

/// Build the submissions router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/rest/v1/submissions",
            post(create_submission).get(list_submissions),
        )
        .route(
            "/rest/v1/submissions/:id",
            put(update_submission).delete(delete_submission),
        )
        .route("/rest/v1/submissions/export", get(export_submissions))
}

/// POST /rest/v1/submissions — Validate and store a submission.
#[utoipa::path(
    post,
    path = "/rest/v1/submissions",
    request_body = Object,
    responses(
        (status = 201, description = "Submission accepted", body = CreateResponse),
        (status = 400, description = "Validation failed", body = crate::error::ValidationErrorBody),
    ),
    tag = "submissions"
)]
pub async fn create_submission(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<(StatusCode, Json<CreateResponse>), AppError> {
    let payload = extract_payload(body)?;

    let report = validate(&state.schema, &payload);
    if !report.is_valid {
        return Err(AppError::Validation(report));
    }

    let record = SubmissionRecord {
        id: Uuid::new_v4(),
        created_at: Utc::now(),
        data: payload,
    };
    state.submissions.insert(record.id, record.clone());

    // Write-through: failure is surfaced because the in-memory record
    // would be lost on restart, causing silent data loss.
    if let Some(pool) = &state.db_pool {
        if let Err(e) = crate::db::submissions::insert(pool, &record).await {
            tracing::error!(submission_id = %record.id, error = %e, "failed to persist submission");
            return Err(AppError::Internal(
                "submission recorded in-memory but database persist failed".to_string(),
            ));
        }
    }

    tracing::info!(submission_id = %record.id, "submission accepted");
    Ok((
        StatusCode::CREATED,
        Json(CreateResponse {
            success: true,
            id: record.id,
            created_at: record.created_at,
        }),
    ))
}

/// GET /rest/v1/submissions — Paginated, searchable listing.
#[utoipa::path(
    get,
    path = "/rest/v1/submissions",
    params(
        ("page" = Option<String>, Query, description = "1-based page number (default 1)"),
        ("limit" = Option<String>, Query, description = "Page size (default 10)"),
        ("sortOrder" = Option<String>, Query, description = "`asc` or `desc` (default desc)"),
        ("search" = Option<String>, Query, description = "Case-insensitive substring match over payloads"),
    ),
    responses(
        (status = 200, description = "One page of submissions", body = ListResponse),
    ),
    tag = "submissions"
)]
pub async fn list_submissions(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Json<ListResponse> {
    let page = parse_positive(query.page.as_deref()).unwrap_or(1);
    let limit = parse_positive(query.limit.as_deref()).unwrap_or(10);
    let ascending = query.sort_order.as_deref() == Some("asc");

    // Newest first by default; tie-break on id so ordering is total.
    let mut rows = state.submissions.list();
    rows.sort_by(|a, b| {
        b.created_at
            .cmp(&a.created_at)
            .then_with(|| b.id.cmp(&a.id))
    });
    if ascending {
        rows.reverse();
    }

    if let Some(q) = query.search.as_deref().map(str::trim).filter(|q| !q.is_empty()) {
        let needle = q.to_lowercase();
        rows.retain(|r| {
            serde_json::to_string(&r.data)
                .map(|s| s.to_lowercase().contains(&needle))
                .unwrap_or(false)
        });
    }

    let total = rows.len();
    let total_pages = std::cmp::max(1, total.div_ceil(limit));
    let page = page.min(total_pages);
    let start = (page - 1) * limit;
    let data: Vec<SubmissionRecord> = rows.into_iter().skip(start).take(limit).collect();

    Json(ListResponse {
        data,
        page,
        limit,
        total,
        total_pages,
    })
}

/// PUT /rest/v1/submissions/{id} — Re-validate and replace a payload.
#[utoipa::path(
    put,
    path = "/rest/v1/submissions/{id}",
    request_body = Object,
    params(("id" = Uuid, Path, description = "Submission id")),
    responses(
        (status = 200, description = "Submission updated", body = UpdateResponse),
        (status = 400, description = "Validation failed", body = crate::error::ValidationErrorBody),
        (status = 404, description = "No such submission", body = crate::error::MessageBody),
    ),
    tag = "submissions"
)]
pub async fn update_submission(
    State(state): State<AppState>,
    id: Result<Path<Uuid>, PathRejection>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<UpdateResponse>, AppError> {
    let id = extract_id(id)?;
    let payload = extract_payload(body)?;

    let report = validate(&state.schema, &payload);
    if !report.is_valid {
        return Err(AppError::Validation(report));
    }

    let updated = state
        .submissions
        .update(&id, |record| {
            record.data = payload.clone();
        })
        .ok_or_else(|| AppError::NotFound("Submission not found".to_string()))?;

    if let Some(pool) = &state.db_pool {
        if let Err(e) = crate::db::submissions::update_data(pool, id, &updated.data).await {
            tracing::error!(submission_id = %id, error = %e, "failed to persist submission update");
            return Err(AppError::Internal(
                "submission updated in-memory but database persist failed".to_string(),
            ));
        }
    }

    Ok(Json(UpdateResponse {
        success: true,
        id: updated.id,
        created_at: updated.created_at,
        data: updated.data,
    }))
}

/// DELETE /rest/v1/submissions/{id} — Remove a submission.
#[utoipa::path(
    delete,
    path = "/rest/v1/submissions/{id}",
    params(("id" = Uuid, Path, description = "Submission id")),
    responses(
        (status = 204, description = "Submission deleted"),
        (status = 404, description = "No such submission", body = crate::error::MessageBody),
    ),
    tag = "submissions"
)]
pub async fn delete_submission(
    State(state): State<AppState>,
    id: Result<Path<Uuid>, PathRejection>,
) -> Result<StatusCode, AppError> {
    let id = extract_id(id)?;

    state
        .submissions
        .remove(&id)
        .ok_or_else(|| AppError::NotFound("Submission not found".to_string()))?;

    if let Some(pool) = &state.db_pool {
        if let Err(e) = crate::db::submissions::delete(pool, id).await {
            tracing::error!(submission_id = %id, error = %e, "failed to delete submission from database");
            return Err(AppError::Internal(
                "submission deleted in-memory but database delete failed".to_string(),
            ));
        }
    }

    Ok(StatusCode::NO_CONTENT)
}

/// GET /rest/v1/submissions/export — All submissions as CSV.
///
/// Columns are `id`, `createdAt`, then the schema's field names in
/// declared order, so the export shape tracks the active schema.
#[utoipa::path(
    get,
    path = "/rest/v1/submissions/export",
    responses(
        (status = 200, description = "CSV attachment", content_type = "text/csv"),
    ),
    tag = "submissions"
)]
pub async fn export_submissions(State(state): State<AppState>) -> Response {
    let mut rows = state.submissions.list();
    rows.sort_by(|a, b| {
        b.created_at
            .cmp(&a.created_at)
            .then_with(|| b.id.cmp(&a.id))
    });

    let field_names: Vec<&str> = state.schema.field_names().collect();
    let mut lines = Vec::with_capacity(rows.len() + 1);
    lines.push(
        std::iter::once("id")
            .chain(std::iter::once("createdAt"))
            .chain(field_names.iter().copied())
            .collect::<Vec<_>>()
            .join(","),
    );
    for row in &rows {
        let mut cells = vec![
            row.id.to_string(),
            row.created_at.to_rfc3339_opts(SecondsFormat::Millis, true),
        ];
        for name in &field_names {
            cells.push(escape_csv(row.data.get(*name)));
        }
        lines.push(cells.join(","));
    }
    let csv = lines.join("\n");

    (
        [
            (header::CONTENT_TYPE, "text/csv"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"submissions.csv\"",
            ),
        ],
        csv,
    )
        .into_response()
}

/// Render one payload value as a CSV cell. Absent/null cells are
/// empty; array values join their elements with `|`; quotes are
/// doubled and cells containing quote/comma/newline are wrapped.
fn escape_csv(value: Option<&Value>) -> String {
    let raw = match value {
        None | Some(Value::Null) => return String::new(),
        Some(Value::Array(items)) => items
            .iter()
            .map(coerce::stringify)
            .collect::<Vec<_>>()
            .join("|"),
        Some(other) => coerce::stringify(other),
    };
    let escaped = raw.replace('"', "\"\"");
    if escaped.contains(['"', ',', '\n']) {
        format!("\"{escaped}\"")
    } else {
        escaped
    }
}

/// Parse a positive integer query parameter; anything else is "use
/// the default".
fn parse_positive(raw: Option<&str>) -> Option<usize> {
    raw?.trim().parse::<usize>().ok().filter(|n| *n > 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn csv_escaping() {
        assert_eq!(escape_csv(None), "");
        assert_eq!(escape_csv(Some(&Value::Null)), "");
        assert_eq!(escape_csv(Some(&json!("plain"))), "plain");
        assert_eq!(escape_csv(Some(&json!(42))), "42");
        assert_eq!(escape_csv(Some(&json!(["a", "b"]))), "a|b");
        assert_eq!(escape_csv(Some(&json!("a,b"))), "\"a,b\"");
        assert_eq!(escape_csv(Some(&json!("say \"hi\""))), "\"say \"\"hi\"\"\"");
        assert_eq!(escape_csv(Some(&json!("line\nbreak"))), "\"line\nbreak\"");
    }

    #[test]
    fn positive_parse_falls_back() {
        assert_eq!(parse_positive(Some("3")), Some(3));
        assert_eq!(parse_positive(Some("0")), None);
        assert_eq!(parse_positive(Some("abc")), None);
        assert_eq!(parse_positive(None), None);
    }
}
