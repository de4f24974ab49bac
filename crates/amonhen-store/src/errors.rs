//! Error helpers for amonhen-store
//!
//! Wraps [`amonhen_core_types::AmError`] with store-specific constructors.

use amonhen_core_types::{AmError, AmErrorKind};

pub use amonhen_core_types::Result;

/// Create a migration error
pub fn migration_error(migration_id: &str, reason: &str) -> AmError {
    AmError::new(AmErrorKind::Persistence)
        .with_op("migration")
        .with_message(format!("migration {migration_id} failed: {reason}"))
}

/// Create a database error from [`rusqlite::Error`]
pub fn from_rusqlite(err: rusqlite::Error) -> AmError {
    AmError::new(AmErrorKind::Persistence)
        .with_op("sqlite")
        .with_message(err.to_string())
}

/// Create a not-found error for a missing row
pub fn not_found(op: &str, entity_id: &str) -> AmError {
    AmError::new(AmErrorKind::NotFound)
        .with_op(op)
        .with_entity_id(entity_id)
        .with_message("row not found")
}

/// Create a duplicate-URL error (unique constraint violation on `source_url`)
pub fn duplicate_url(url: &str) -> AmError {
    AmError::new(AmErrorKind::DuplicateUrl)
        .with_op("insert_item")
        .with_message(format!("{url} already exists"))
}

/// Create an IO error
pub fn io_error(operation: &str, err: std::io::Error) -> AmError {
    AmError::new(AmErrorKind::Io)
        .with_op(operation.to_string())
        .with_message(err.to_string())
}
