//! Submission persistence queries.
//!
//! Payloads are stored as JSONB. A row whose `data` column is not a
//! JSON object (possible after manual edits) hydrates as an empty
//! payload rather than failing startup.

use chrono::{DateTime, Utc};
use intake_core::Payload;
use serde_json::Value;
use sqlx::PgPool;
use uuid::Uuid;

use crate::state::SubmissionRecord;

#[derive(sqlx::FromRow)]
struct SubmissionRow {
    id: Uuid,
    data: Value,
    created_at: DateTime<Utc>,
}

impl SubmissionRow {
    fn into_record(self) -> SubmissionRecord {
        let data = match self.data {
            Value::Object(map) => map,
            _ => Payload::new(),
        };
        SubmissionRecord {
            id: self.id,
            created_at: self.created_at,
            data,
        }
    }
}

/// Insert a new submission row.
pub async fn insert(pool: &PgPool, record: &SubmissionRecord) -> Result<(), sqlx::Error> {
    sqlx::query("INSERT INTO submissions (id, data, created_at) VALUES ($1, $2, $3)")
        .bind(record.id)
        .bind(Value::Object(record.data.clone()))
        .bind(record.created_at)
        .execute(pool)
        .await?;
    Ok(())
}

/// Replace the payload of an existing submission row.
pub async fn update_data(pool: &PgPool, id: Uuid, data: &Payload) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE submissions SET data = $2 WHERE id = $1")
        .bind(id)
        .bind(Value::Object(data.clone()))
        .execute(pool)
        .await?;
    Ok(())
}

/// Delete a submission row.
pub async fn delete(pool: &PgPool, id: Uuid) -> Result<(), sqlx::Error> {
    sqlx::query("DELETE FROM submissions WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(())
}

/// Load every submission row, used to hydrate the in-memory store on
/// startup.
pub async fn load_all(pool: &PgPool) -> Result<Vec<SubmissionRecord>, sqlx::Error> {
    let rows: Vec<SubmissionRow> =
        sqlx::query_as("SELECT id, data, created_at FROM submissions")
            .fetch_all(pool)
            .await?;
    Ok(rows.into_iter().map(SubmissionRow::into_record).collect())
}
