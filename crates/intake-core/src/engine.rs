//! # Validation Engine
//!
//! The orchestrator: walks the schema's fields in declared order,
//! dispatches each to its type's validator, and aggregates results
//! into a field-name-keyed error report.
//!
//! [`validate`] is pure and deterministic — identical inputs always
//! produce identical reports, and neither the schema nor the payload
//! is ever mutated.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::field::FormSchema;
use crate::validators;

/// A raw submitted payload: field name → arbitrary JSON value.
/// Missing keys are treated as absent values.
pub type Payload = serde_json::Map<String, Value>;

/// Reserved error-report key for schema-level failures, distinct from
/// any field error.
pub const SCHEMA_ERROR_KEY: &str = "_schema";

const SCHEMA_NOT_CONFIGURED: &str = "Schema not configured. Please provide form fields.";

/// The outcome of validating one payload against one schema.
///
/// `errors` maps each failing field's `name` (never its label) to a
/// single message — the first rule that field violated. `is_valid` is
/// true iff `errors` is empty. Keys are stored ordered so serialized
/// reports are byte-identical across calls.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationReport {
    pub is_valid: bool,
    pub errors: BTreeMap<String, String>,
}

impl ValidationReport {
    /// A report with no errors.
    pub fn valid() -> Self {
        Self {
            is_valid: true,
            errors: BTreeMap::new(),
        }
    }
}

/// Validate a payload against a schema, producing a complete per-field
/// error report in one pass.
///
/// A schema with zero fields is itself invalid: the report carries a
/// single error under [`SCHEMA_ERROR_KEY`] and no per-field entries.
/// Otherwise each declared field is checked independently; at most one
/// message is recorded per field.
pub fn validate(schema: &FormSchema, payload: &Payload) -> ValidationReport {
    let mut errors = BTreeMap::new();

    if schema.fields.is_empty() {
        errors.insert(
            SCHEMA_ERROR_KEY.to_string(),
            SCHEMA_NOT_CONFIGURED.to_string(),
        );
        return ValidationReport {
            is_valid: false,
            errors,
        };
    }

    for field in &schema.fields {
        let raw = payload.get(&field.name).unwrap_or(&Value::Null);
        if let Some(message) = validators::validate_field(field, raw) {
            errors.insert(field.name.clone(), message);
        }
    }

    ValidationReport {
        is_valid: errors.is_empty(),
        errors,
    }
}
