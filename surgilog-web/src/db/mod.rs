//! Database access layer for surgilog-web
//!
//! One module per entity, each a set of thin async functions over the shared
//! SQLite pool. Soft-deletable entities are filtered with `deleted = 0` in
//! every retrieval query; nothing ever clears the flag.

pub mod areas;
pub mod records;
pub mod residents;
pub mod sessions;
pub mod surgeries;
pub mod teachers;
pub mod users;

use chrono::{DateTime, Utc};
use surgilog_common::{Error, Result};

/// Current time rendered the way timestamps are stored
pub(crate) fn now_rfc3339() -> String {
    Utc::now().to_rfc3339()
}

/// Parse a stored RFC3339 timestamp
pub(crate) fn parse_timestamp(field: &str, value: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| Error::Internal(format!("Failed to parse {}: {}", field, e)))
}
