//! # Coercion Utilities
//!
//! Pure, total functions that interpret a raw JSON value as a target
//! shape. Absence and failure are expressed as `None`, never as an
//! error — a value that cannot be coerced simply means "the rule that
//! needed it does not apply".
//!
//! ## Platform Decisions
//!
//! The legacy implementation leaned on the host platform's parsers,
//! with behavior the spec leaves undefined. This module pins explicit
//! replacements and documents the divergences:
//!
//! - [`to_date`] accepts ISO 8601 only (RFC 3339, a naive
//!   `YYYY-MM-DDTHH:MM:SS[.f]`, or a bare `YYYY-MM-DD` taken as
//!   midnight). The legacy `Date` constructor was far more lenient;
//!   inputs outside ISO 8601 now coerce to "absent".
//! - [`to_number`] parses numeric strings with `f64::from_str`, so
//!   hex literals like `"0x10"` are not numbers here.
//! - [`compile_pattern`] compiles with the `regex` crate. Pattern
//!   bodies using constructs that engine rejects (backreferences,
//!   lookaround) fail to compile and disable the rule — the same
//!   silent-leniency path a malformed pattern always takes.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use regex::Regex;
use serde_json::Value;

/// Interpret a value as text. `null` (and absent keys, which callers
/// pass as `null`) become the empty string; scalars stringify; arrays
/// join their stringified elements with `,`.
pub fn to_text(v: &Value) -> String {
    match v {
        Value::Null => String::new(),
        other => stringify(other),
    }
}

/// Interpret a value as a finite number. Numbers pass through;
/// non-blank strings are parsed and accepted only when finite.
/// Everything else is absent — absence and zero stay distinguishable.
pub fn to_number(v: &Value) -> Option<f64> {
    match v {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                return None;
            }
            trimmed.parse::<f64>().ok().filter(|n| n.is_finite())
        }
        _ => None,
    }
}

/// Interpret a value as a boolean. Booleans pass through; strings
/// match `"true"`/`"false"` case-insensitively after trimming. Any
/// other shape is absent — never silently `false`.
pub fn to_boolean(v: &Value) -> Option<bool> {
    match v {
        Value::Bool(b) => Some(*b),
        Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "true" => Some(true),
            "false" => Some(false),
            _ => None,
        },
        _ => None,
    }
}

/// Interpret a value as a calendar timestamp. Only textual inputs are
/// eligible; see the module docs for the accepted formats.
pub fn to_date(v: &Value) -> Option<NaiveDateTime> {
    let s = v.as_str()?.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.naive_utc());
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(dt);
    }
    if let Ok(d) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return d.and_hms_opt(0, 0, 0);
    }
    None
}

/// Compile a pattern rule into a usable matcher.
///
/// Accepts either a bare pattern body or the delimited `/body/flags`
/// form. Flags `i`, `m` and `s` translate to inline flag groups; the
/// remaining legal JS flags (`d g u v y`) do not affect single-match
/// testing and are ignored. An unknown flag character, a non-textual
/// or empty input, or a body the engine rejects all yield `None` —
/// the rule disables itself rather than failing the submission.
pub fn compile_pattern(v: &Value) -> Option<Regex> {
    let s = v.as_str()?;
    if s.is_empty() {
        return None;
    }
    let (body, flags) = match s.rfind('/') {
        Some(last) if s.starts_with('/') && last > 0 => (&s[1..last], &s[last + 1..]),
        _ => (s, ""),
    };
    let mut inline = String::new();
    for flag in flags.chars() {
        match flag {
            'i' | 'm' | 's' => inline.push(flag),
            'd' | 'g' | 'u' | 'v' | 'y' => {}
            _ => return None,
        }
    }
    let pattern = if inline.is_empty() {
        body.to_string()
    } else {
        format!("(?{inline}){body}")
    };
    Regex::new(&pattern).ok()
}

/// Stringify a value for comparison purposes (option membership) and
/// message interpolation. Numeric-looking options and numeric payload
/// values must both land on the same text, so integral floats render
/// without a trailing `.0`.
pub fn stringify(v: &Value) -> String {
    match v {
        Value::Null => "null".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => match n.as_f64() {
            Some(f) => fmt_float(f),
            None => n.to_string(),
        },
        Value::String(s) => s.clone(),
        Value::Array(items) => items
            .iter()
            .map(stringify)
            .collect::<Vec<_>>()
            .join(","),
        // Objects are outside the payload contract; compact JSON keeps
        // the function total.
        Value::Object(_) => v.to_string(),
    }
}

/// Render a float the way rule messages echo it: `3`, not `3.0`.
pub(crate) fn fmt_float(f: f64) -> String {
    if f.is_finite() && f.fract() == 0.0 && f.abs() < 1e15 {
        format!("{}", f as i64)
    } else {
        f.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn text_null_is_empty() {
        assert_eq!(to_text(&Value::Null), "");
    }

    #[test]
    fn text_passes_strings_through() {
        assert_eq!(to_text(&json!("  hello  ")), "  hello  ");
    }

    #[test]
    fn text_stringifies_scalars() {
        assert_eq!(to_text(&json!(42)), "42");
        assert_eq!(to_text(&json!(4.5)), "4.5");
        assert_eq!(to_text(&json!(true)), "true");
    }

    #[test]
    fn text_joins_arrays() {
        assert_eq!(to_text(&json!(["a", 1, "b"])), "a,1,b");
    }

    #[test]
    fn number_accepts_numeric_strings() {
        assert_eq!(to_number(&json!("5")), Some(5.0));
        assert_eq!(to_number(&json!("  5.5  ")), Some(5.5));
        assert_eq!(to_number(&json!("1e3")), Some(1000.0));
    }

    #[test]
    fn number_rejects_blank_and_garbage() {
        assert_eq!(to_number(&json!("")), None);
        assert_eq!(to_number(&json!("   ")), None);
        assert_eq!(to_number(&json!("abc")), None);
        assert_eq!(to_number(&json!("Infinity")), None);
        assert_eq!(to_number(&Value::Null), None);
        assert_eq!(to_number(&json!(true)), None);
    }

    #[test]
    fn number_zero_is_not_absent() {
        assert_eq!(to_number(&json!(0)), Some(0.0));
        assert_eq!(to_number(&json!("0")), Some(0.0));
    }

    #[test]
    fn boolean_recognizes_strings() {
        assert_eq!(to_boolean(&json!("true")), Some(true));
        assert_eq!(to_boolean(&json!(" FALSE ")), Some(false));
        assert_eq!(to_boolean(&json!(false)), Some(false));
    }

    #[test]
    fn boolean_other_shapes_are_absent() {
        assert_eq!(to_boolean(&json!("yes")), None);
        assert_eq!(to_boolean(&json!(1)), None);
        assert_eq!(to_boolean(&Value::Null), None);
    }

    #[test]
    fn date_parses_iso_forms() {
        assert!(to_date(&json!("2024-03-01")).is_some());
        assert!(to_date(&json!("2024-03-01T10:30:00")).is_some());
        assert!(to_date(&json!("2024-03-01T10:30:00Z")).is_some());
        assert!(to_date(&json!("2024-03-01T10:30:00+05:00")).is_some());
    }

    #[test]
    fn date_rejects_non_strings_and_garbage() {
        assert_eq!(to_date(&json!(1709251200)), None);
        assert_eq!(to_date(&json!("March 1, 2024")), None);
        assert_eq!(to_date(&json!("not a date")), None);
    }

    #[test]
    fn date_bare_day_is_midnight() {
        let dt = to_date(&json!("2024-03-01")).unwrap();
        assert_eq!(dt.format("%H:%M:%S").to_string(), "00:00:00");
    }

    #[test]
    fn pattern_bare_body() {
        let re = compile_pattern(&json!("^a+$")).unwrap();
        assert!(re.is_match("aaa"));
        assert!(!re.is_match("b"));
    }

    #[test]
    fn pattern_delimited_with_flags() {
        let re = compile_pattern(&json!("/^hello$/i")).unwrap();
        assert!(re.is_match("HELLO"));
    }

    #[test]
    fn pattern_ignores_matching_irrelevant_flags() {
        assert!(compile_pattern(&json!("/a/g")).is_some());
    }

    #[test]
    fn pattern_unknown_flag_disables() {
        assert!(compile_pattern(&json!("/a/q")).is_none());
    }

    #[test]
    fn pattern_malformed_body_disables() {
        assert!(compile_pattern(&json!("[unclosed")).is_none());
        assert!(compile_pattern(&json!("")).is_none());
        assert!(compile_pattern(&json!(42)).is_none());
    }

    #[test]
    fn pattern_leading_slash_without_closing_is_bare() {
        // "/abc" has no closing delimiter; the whole string is the body.
        let re = compile_pattern(&json!("/abc")).unwrap();
        assert!(re.is_match("x/abc"));
    }

    #[test]
    fn stringify_aligns_numbers_and_text() {
        assert_eq!(stringify(&json!(3)), "3");
        assert_eq!(stringify(&json!(3.0)), "3");
        assert_eq!(stringify(&json!(3.5)), "3.5");
        assert_eq!(stringify(&json!("3")), "3");
        assert_eq!(stringify(&Value::Null), "null");
    }
}
