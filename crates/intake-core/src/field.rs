//! # Field Descriptor Model
//!
//! The declarative schema unit: a form is an ordered sequence of
//! [`FieldDescriptor`]s, each carrying a type tag, an optional fixed
//! option set, and an open bag of validation rule parameters.
//!
//! ## Leniency
//!
//! The rule bag ([`RuleSet`]) is loosely typed on purpose. Accessors
//! attempt a typed extraction of each parameter; on extraction failure
//! the rule is treated as unset rather than erroring. Schema authors
//! rely on this when they omit or mistype bounds.

use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::coerce;

/// The closed set of recognized field types.
///
/// Deserializing any unrecognized tag produces [`FieldType::Unknown`],
/// an explicit permissive fallback: such fields are silently skipped
/// by validation, never errored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum FieldType {
    Text,
    Textarea,
    Number,
    Date,
    Select,
    MultiSelect,
    Switch,
    Unknown,
}

// Manual Deserialize so an unrecognized tag maps to `Unknown` instead
// of rejecting the whole schema document.
impl<'de> Deserialize<'de> for FieldType {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let tag = String::deserialize(deserializer)?;
        Ok(Self::from_tag(&tag))
    }
}

impl FieldType {
    /// Map a schema-document tag to a field type.
    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "text" => Self::Text,
            "textarea" => Self::Textarea,
            "number" => Self::Number,
            "date" => Self::Date,
            "select" => Self::Select,
            "multi-select" => Self::MultiSelect,
            "switch" => Self::Switch,
            _ => Self::Unknown,
        }
    }

    /// Return the schema-document tag for this type.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Textarea => "textarea",
            Self::Number => "number",
            Self::Date => "date",
            Self::Select => "select",
            Self::MultiSelect => "multi-select",
            Self::Switch => "switch",
            Self::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for FieldType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One admissible value for a `select`/`multi-select` field.
///
/// Schema documents write options either as bare strings or as
/// `{value, label}` pairs. Membership checks compare against the
/// stringified form of `value`, so numeric-looking option values and
/// numeric-looking payload values land on the same text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldOption {
    /// A bare option value that doubles as its own label.
    Bare(String),
    /// An explicit value/label pair. A pair with no `value` key keeps
    /// its slot with a `null` value, which stringifies to `"null"` for
    /// membership checks.
    Pair {
        #[serde(default)]
        value: Value,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        label: Option<String>,
    },
}

impl FieldOption {
    /// The stringified admissible value used for membership checks.
    pub fn value_text(&self) -> String {
        match self {
            Self::Bare(s) => s.clone(),
            Self::Pair { value, .. } => coerce::stringify(value),
        }
    }
}

/// JS-style truthiness over JSON values: absent, `false`, `0`, `""`
/// and `null` are falsy, everything else is truthy.
fn truthy(v: &Value) -> bool {
    match v {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0).unwrap_or(true),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// The open bag of validation rule parameters attached to a field,
/// keyed by rule name (`required`, `minLength`, `regex`, `min`, …).
///
/// Presence of a key activates the rule; a parameter of the wrong
/// shape deactivates it. The accessors encode the two extraction
/// regimes the reference behavior distinguishes:
///
/// - `required` and the activation of `minLength`/`maxLength`/`regex`/
///   `minDate` follow truthiness, so `required: false` or
///   `minLength: 0` deactivate the rule;
/// - `min`/`max`/`minSelected`/`maxSelected` require a JSON number,
///   so `min: 0` and `maxSelected: 0` ARE active.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RuleSet(serde_json::Map<String, Value>);

impl RuleSet {
    /// Raw parameter lookup.
    pub fn get(&self, rule: &str) -> Option<&Value> {
        self.0.get(rule)
    }

    /// Whether a truthiness-gated rule is active.
    pub fn is_active(&self, rule: &str) -> bool {
        self.0.get(rule).map(truthy).unwrap_or(false)
    }

    /// Extract a length bound (`minLength`/`maxLength`): active when
    /// truthy, usable when numeric or a numeric string. Returns the
    /// bound together with its echo text for error messages, which
    /// reproduces the parameter as the schema author wrote it.
    pub fn length_bound(&self, rule: &str) -> Option<(f64, String)> {
        let v = self.0.get(rule)?;
        if !truthy(v) {
            return None;
        }
        match v {
            Value::Number(n) => n.as_f64().map(|f| (f, coerce::fmt_float(f))),
            Value::String(s) => s
                .trim()
                .parse::<f64>()
                .ok()
                .filter(|f| f.is_finite())
                .map(|f| (f, s.clone())),
            _ => None,
        }
    }

    /// Extract a strictly numeric bound (`min`/`max`/`minSelected`/
    /// `maxSelected`). Non-number parameters deactivate the rule;
    /// zero is a live bound.
    pub fn numeric_bound(&self, rule: &str) -> Option<f64> {
        match self.0.get(rule)? {
            Value::Number(n) => n.as_f64(),
            _ => None,
        }
    }

    /// Whether the bag holds no parameters at all.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// One form field as declared by the schema author.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDescriptor {
    /// Unique identifier; doubles as the payload key and the error
    /// report key. Uniqueness within a schema is the author's
    /// responsibility — the engine does not police it.
    pub name: String,
    /// Human-readable display name; falls back to `name` when absent
    /// or empty.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(rename = "type")]
    pub field_type: FieldType,
    /// Rendering hint carried through verbatim; no validation meaning.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
    /// Admissible values for `select`/`multi-select`. Absence or
    /// emptiness disables the membership check.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<FieldOption>,
    #[serde(default, skip_serializing_if = "RuleSet::is_empty")]
    pub validation: RuleSet,
}

impl FieldDescriptor {
    /// The label used in error messages: `label`, or `name` when the
    /// label is absent or empty.
    pub fn display_label(&self) -> &str {
        self.label
            .as_deref()
            .filter(|l| !l.is_empty())
            .unwrap_or(&self.name)
    }
}

/// Error loading a schema document.
#[derive(Debug, Error)]
pub enum SchemaError {
    /// The document was not valid JSON or did not match the schema shape.
    #[error("schema document is not valid: {0}")]
    Parse(#[from] serde_json::Error),

    /// The schema file could not be read.
    #[error("failed to read schema file '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// An ordered form declaration: descriptive metadata plus the field
/// sequence. Constructed once at process start and immutable
/// thereafter; the engine receives it by reference on every call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormSchema {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub fields: Vec<FieldDescriptor>,
}

impl FormSchema {
    /// Parse a schema from a JSON document.
    pub fn from_json_str(json: &str) -> Result<Self, SchemaError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load a schema from a JSON file on disk.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, SchemaError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|source| SchemaError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json_str(&contents)
    }

    /// Field names in declared order (payload keys, CSV columns).
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|f| f.name.as_str())
    }
}
