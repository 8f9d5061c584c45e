//! # Field Validators
//!
//! One validation routine per field type. Each consumes a field
//! descriptor and the corresponding raw payload value and produces
//! either "valid" (`None`) or a single human-readable error message.
//!
//! ## Rule Priority
//!
//! Rules are evaluated in a fixed priority order per type and the
//! first failing rule wins — a field never reports more than one
//! message no matter how many of its rules it breaks. The ordering is
//! a load-bearing contract; consumers string-assert on the messages.
//!
//! | type            | rule order                                          |
//! |-----------------|-----------------------------------------------------|
//! | text / textarea | required → minLength → maxLength → regex            |
//! | number          | required → min → max                                |
//! | date            | required → minDate                                  |
//! | select          | required → membership                               |
//! | multi-select    | required → minSelected → maxSelected → membership   |
//! | switch          | required                                            |
//! | (unrecognized)  | none — silently valid                               |

use std::collections::HashSet;

use serde_json::Value;

use crate::coerce;
use crate::field::{FieldDescriptor, FieldType};

/// Dispatch a field to its type's validator. Returns the error
/// message for the first violated rule, or `None` when the value is
/// acceptable.
pub fn validate_field(field: &FieldDescriptor, raw: &Value) -> Option<String> {
    match field.field_type {
        FieldType::Text | FieldType::Textarea => validate_text(field, raw),
        FieldType::Number => validate_number(field, raw),
        FieldType::Date => validate_date(field, raw),
        FieldType::Select => validate_select(field, raw),
        FieldType::MultiSelect => validate_multi_select(field, raw),
        FieldType::Switch => validate_switch(field, raw),
        FieldType::Unknown => None,
    }
}

/// The set of stringified admissible values for membership checks.
fn option_set(field: &FieldDescriptor) -> HashSet<String> {
    field.options.iter().map(|o| o.value_text()).collect()
}

fn validate_text(field: &FieldDescriptor, raw: &Value) -> Option<String> {
    let label = field.display_label();
    let rules = &field.validation;

    // A value that is already a string is used verbatim; only
    // non-string values are stringified and trimmed. Reference
    // behavior — whitespace-only strings pass `required`.
    let val = match raw {
        Value::String(s) => s.clone(),
        other => coerce::to_text(other).trim().to_string(),
    };

    if rules.is_active("required") && val.is_empty() {
        return Some(format!("{label} is required"));
    }
    let len = val.chars().count() as f64;
    if let Some((bound, echo)) = rules.length_bound("minLength") {
        if len < bound {
            return Some(format!("{label} must be at least {echo} characters"));
        }
    }
    if let Some((bound, echo)) = rules.length_bound("maxLength") {
        if len > bound {
            return Some(format!("{label} must be at most {echo} characters"));
        }
    }
    if rules.is_active("regex") {
        if let Some(re) = rules.get("regex").and_then(coerce::compile_pattern) {
            if !re.is_match(&val) {
                return Some(format!("{label} is invalid"));
            }
        }
    }
    None
}

fn validate_number(field: &FieldDescriptor, raw: &Value) -> Option<String> {
    let label = field.display_label();
    let rules = &field.validation;

    let val = coerce::to_number(raw);
    if rules.is_active("required") && val.is_none() {
        return Some(format!("{label} is required"));
    }
    // Bounds apply only to a successfully coerced value; an absent
    // optional number is acceptable regardless of min/max.
    if let Some(n) = val {
        if let Some(min) = rules.numeric_bound("min") {
            if n < min {
                return Some(format!("{label} must be at least {}", coerce::fmt_float(min)));
            }
        }
        if let Some(max) = rules.numeric_bound("max") {
            if n > max {
                return Some(format!("{label} must be at most {}", coerce::fmt_float(max)));
            }
        }
    }
    None
}

fn validate_date(field: &FieldDescriptor, raw: &Value) -> Option<String> {
    let label = field.display_label();
    let rules = &field.validation;

    let val = coerce::to_date(raw);
    if rules.is_active("required") && val.is_none() {
        return Some(format!("{label} is required"));
    }
    if let Some(value) = val {
        if rules.is_active("minDate") {
            if let Some(bound_raw) = rules.get("minDate") {
                if let Some(bound) = coerce::to_date(bound_raw) {
                    if value < bound {
                        // The bound is echoed in its original textual
                        // form, never reformatted.
                        let echo = bound_raw.as_str().unwrap_or_default();
                        return Some(format!("{label} must be on or after {echo}"));
                    }
                }
            }
        }
    }
    None
}

fn validate_select(field: &FieldDescriptor, raw: &Value) -> Option<String> {
    let label = field.display_label();
    let rules = &field.validation;

    // No trim here — membership compares the untrimmed value.
    let val = match raw {
        Value::String(s) => s.clone(),
        other => coerce::to_text(other),
    };

    if rules.is_active("required") && val.trim().is_empty() {
        return Some(format!("{label} is required"));
    }
    if !val.is_empty() && !field.options.is_empty() && !option_set(field).contains(&val) {
        return Some(format!("Please select a valid {}", label.to_lowercase()));
    }
    None
}

fn validate_multi_select(field: &FieldDescriptor, raw: &Value) -> Option<String> {
    let label = field.display_label();
    let rules = &field.validation;

    // A non-array payload is treated as the empty selection.
    let empty = Vec::new();
    let arr = match raw {
        Value::Array(items) => items,
        _ => &empty,
    };

    if rules.is_active("required") && arr.is_empty() {
        return Some(format!("{label} requires at least one selection"));
    }
    if let Some(min) = rules.numeric_bound("minSelected") {
        if (arr.len() as f64) < min {
            return Some(format!(
                "{label} must have at least {} selections",
                coerce::fmt_float(min)
            ));
        }
    }
    if let Some(max) = rules.numeric_bound("maxSelected") {
        if (arr.len() as f64) > max {
            return Some(format!(
                "{label} must have at most {} selections",
                coerce::fmt_float(max)
            ));
        }
    }
    // All-or-nothing membership, only once count bounds pass and only
    // when an options set is declared.
    if !field.options.is_empty() && !arr.is_empty() {
        let set = option_set(field);
        if !arr.iter().all(|v| set.contains(&coerce::stringify(v))) {
            return Some(format!(
                "Please select valid options for {}",
                label.to_lowercase()
            ));
        }
    }
    None
}

fn validate_switch(field: &FieldDescriptor, raw: &Value) -> Option<String> {
    let label = field.display_label();
    let rules = &field.validation;

    if rules.is_active("required") && coerce::to_boolean(raw).is_none() {
        return Some(format!("{label} is required"));
    }
    None
}
