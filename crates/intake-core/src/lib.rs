//! # intake-core — Schema-Driven Form Validation
//!
//! Interprets a declarative form schema against raw submitted payloads.
//! An operator describes an intake form as data (typed fields plus
//! validation rule parameters); this crate decides, field by field,
//! whether a payload is acceptable and produces a stable,
//! machine-consumable error report.
//!
//! ## Components
//!
//! - [`coerce`] — pure, total functions that interpret an arbitrary
//!   JSON value as a target primitive (text, number, boolean, date)
//!   or as a compiled pattern matcher, under lenient rules.
//! - [`field`] — the declarative schema model: [`FieldDescriptor`],
//!   [`FieldType`], [`FieldOption`], the open [`RuleSet`] rule bag,
//!   and [`FormSchema`].
//! - [`validators`] — one validation routine per field type, each
//!   producing at most one human-readable error message.
//! - [`engine`] — the orchestrator: [`validate`] walks the schema's
//!   fields in declared order and aggregates a field-name-keyed
//!   [`ValidationReport`].
//!
//! ## Leniency Contract
//!
//! Rule parameters that are absent or of the wrong shape deactivate
//! the rule instead of erroring; an unrecognized field type is always
//! valid; a malformed regex rule silently disables itself. Schema
//! authors rely on this — it is a compatibility contract, not a bug.
//!
//! ## Purity
//!
//! [`validate`] is a pure function of `(schema, payload)`: no I/O, no
//! logging, no shared state, and by contract it never panics. It is
//! safe to call concurrently from any number of callers.

pub mod coerce;
pub mod engine;
pub mod field;
pub mod validators;

pub use engine::{validate, Payload, ValidationReport, SCHEMA_ERROR_KEY};
pub use field::{FieldDescriptor, FieldOption, FieldType, FormSchema, RuleSet, SchemaError};
