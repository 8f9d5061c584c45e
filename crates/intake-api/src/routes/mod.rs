//! # API Route Modules
//!
//! - `schema` — read-only form schema endpoint, consumed by the form
//!   renderer so its interpretation of types/rules stays in sync with
//!   the validation engine.
//! - `submissions` — submission CRUD behind the validation gate, plus
//!   paginated/searchable listing and CSV export.

pub mod schema;
pub mod submissions;
