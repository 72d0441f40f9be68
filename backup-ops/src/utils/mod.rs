//! Utility functions for run identifiers and timestamp handling.

pub mod timestamps;
mod uuid_utils;

pub use timestamps::{duration_ms, format_iso8601, now_utc, Timestamp};
pub use uuid_utils::{generate_run_id, RunId};
