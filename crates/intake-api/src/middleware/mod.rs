//! # HTTP Middleware
//!
//! - `rate_limit` — fixed-window in-memory request limiting.

pub mod rate_limit;
