//! # Application State
//!
//! Shared state for the Axum application, passed to all route handlers
//! via the `State` extractor.
//!
//! The active [`FormSchema`] is loaded once at startup and held as an
//! immutable value — handlers receive it by reference and nothing
//! mutates it afterwards. Submissions live in a thread-safe in-memory
//! store; when a database pool is configured, writes go through to
//! Postgres and the store is hydrated from it on startup.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use intake_core::{FormSchema, Payload, SchemaError};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use utoipa::ToSchema;
use uuid::Uuid;

// -- Generic In-Memory Store --------------------------------------------------

/// Thread-safe, cloneable in-memory key-value store.
///
/// All operations are synchronous (the RwLock is `parking_lot`, not
/// `tokio::sync`) because the lock is never held across `.await`
/// points. `parking_lot::RwLock` is non-poisonable — a panicking
/// writer does not permanently corrupt the store.
#[derive(Debug)]
pub struct Store<T: Clone + Send + Sync> {
    data: Arc<RwLock<HashMap<Uuid, T>>>,
}

impl<T: Clone + Send + Sync> Clone for Store<T> {
    fn clone(&self) -> Self {
        Self {
            data: Arc::clone(&self.data),
        }
    }
}

impl<T: Clone + Send + Sync> Store<T> {
    /// Create an empty store.
    pub fn new() -> Self {
        Self {
            data: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Insert a record, returning the previous value if the key existed.
    pub fn insert(&self, id: Uuid, value: T) -> Option<T> {
        self.data.write().insert(id, value)
    }

    /// Retrieve a record by ID.
    pub fn get(&self, id: &Uuid) -> Option<T> {
        self.data.read().get(id).cloned()
    }

    /// List all records.
    pub fn list(&self) -> Vec<T> {
        self.data.read().values().cloned().collect()
    }

    /// Update a record in place. Returns the updated record, or `None`
    /// if not found.
    pub fn update(&self, id: &Uuid, f: impl FnOnce(&mut T)) -> Option<T> {
        let mut guard = self.data.write();
        if let Some(entry) = guard.get_mut(id) {
            f(entry);
            Some(entry.clone())
        } else {
            None
        }
    }

    /// Remove a record by ID.
    pub fn remove(&self, id: &Uuid) -> Option<T> {
        self.data.write().remove(id)
    }

    /// Return the number of records.
    pub fn len(&self) -> usize {
        self.data.read().len()
    }

    /// Whether the store is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<T: Clone + Send + Sync> Default for Store<T> {
    fn default() -> Self {
        Self::new()
    }
}

// -- Records ------------------------------------------------------------------

/// One accepted submission: the payload stored verbatim, plus the
/// assigned identifier and creation timestamp.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionRecord {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    /// The raw payload exactly as validated — opaque to this service.
    #[schema(value_type = Object)]
    pub data: Payload,
}

// -- Application Configuration ------------------------------------------------

/// Application configuration, built from the environment at startup.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Port to bind the HTTP server to.
    pub port: u16,
    /// Optional path to a JSON schema document overriding the embedded
    /// default form.
    pub schema_path: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port: 4000,
            schema_path: None,
        }
    }
}

// -- Application State --------------------------------------------------------

/// Embedded default form definition, used when no `SCHEMA_PATH` is
/// configured.
const DEFAULT_SCHEMA_JSON: &str = include_str!("../schema/employee_onboarding.json");

/// Shared application state accessible to all route handlers.
///
/// Clone-friendly via `Arc` internals in the schema and the store.
#[derive(Debug, Clone)]
pub struct AppState {
    /// The active form schema. Immutable for the process lifetime.
    pub schema: Arc<FormSchema>,
    pub submissions: Store<SubmissionRecord>,
    /// PostgreSQL connection pool for durable persistence. When `None`,
    /// the service operates in in-memory-only mode.
    pub db_pool: Option<PgPool>,
    pub config: AppConfig,
}

impl AppState {
    /// In-memory state with the embedded default schema. Used by tests
    /// and as the no-configuration fallback.
    pub fn new() -> Self {
        Self::with_schema(Self::default_schema())
    }

    /// In-memory state serving the given schema.
    pub fn with_schema(schema: FormSchema) -> Self {
        Self {
            schema: Arc::new(schema),
            submissions: Store::new(),
            db_pool: None,
            config: AppConfig::default(),
        }
    }

    /// Build state from configuration: loads the schema from
    /// `config.schema_path` when present, otherwise the embedded
    /// default.
    pub fn with_config(config: AppConfig, db_pool: Option<PgPool>) -> Result<Self, SchemaError> {
        let schema = match &config.schema_path {
            Some(path) => {
                let schema = FormSchema::from_path(path)?;
                tracing::info!(path = %path.display(), title = %schema.title, "loaded form schema");
                schema
            }
            None => Self::default_schema(),
        };
        Ok(Self {
            schema: Arc::new(schema),
            submissions: Store::new(),
            db_pool,
            config,
        })
    }

    /// Parse the embedded default schema.
    pub fn default_schema() -> FormSchema {
        FormSchema::from_json_str(DEFAULT_SCHEMA_JSON)
            .expect("embedded default schema is a valid form document")
    }

    /// Hydrate the in-memory store from the database on startup.
    /// No-op in in-memory-only mode.
    pub async fn hydrate_from_db(&self) -> Result<(), sqlx::Error> {
        let Some(pool) = &self.db_pool else {
            return Ok(());
        };
        let records = crate::db::submissions::load_all(pool).await?;
        let count = records.len();
        for record in records {
            self.submissions.insert(record.id, record);
        }
        tracing::info!(count, "hydrated submissions from database");
        Ok(())
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}
