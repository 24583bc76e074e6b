//! Internal helpers for input validation and error classification.
//!
//! These utilities are **not** part of the public API.

use sea_orm::DbErr;

use crate::{LedgerError, ResultLedger};

/// Substrings reported by SQLite and Postgres when a statement lost a race
/// against a concurrent writer rather than violating anything.
const TRANSIENT_MARKERS: [&str; 6] = [
    "database is locked",
    "database table is locked",
    "database is busy",
    "deadlock detected",
    "could not serialize access",
    "serialization failure",
];

/// Trim an identity and reject empty ones.
pub(crate) fn normalize_identity(value: &str, label: &str) -> ResultLedger<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(LedgerError::InvalidIdentity(format!(
            "{label} must not be empty"
        )));
    }
    Ok(trimmed.to_string())
}

pub(crate) fn is_transient_db_error(err: &DbErr) -> bool {
    if matches!(err, DbErr::ConnectionAcquire(_)) {
        return true;
    }
    let message = err.to_string().to_lowercase();
    TRANSIENT_MARKERS
        .iter()
        .any(|marker| message.contains(marker))
}
