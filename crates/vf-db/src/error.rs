//! Database error types for vf-db.

use thiserror::Error;
use vf_core::errors::CoreError;

/// Errors from database operations.
#[derive(Debug, Error)]
pub enum DatabaseError {
    /// A SQL query failed.
    #[error("Query failed: {0}")]
    Query(String),

    /// Schema migration failed.
    #[error("Migration failed: {0}")]
    Migration(String),

    /// Expected a result row but none was returned.
    #[error("No result returned")]
    NoResult,

    /// Invalid state encountered (e.g., an illegal status transition).
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// A row changed between read and write.
    #[error("Write conflict on {entity} {id}: expected version {expected_version}")]
    Conflict {
        entity: &'static str,
        id: String,
        expected_version: i64,
    },

    /// Underlying libSQL error.
    #[error("libSQL error: {0}")]
    LibSql(#[from] libsql::Error),

    /// Catch-all for unexpected errors.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl DatabaseError {
    /// Whether retrying the whole operation may succeed.
    #[must_use]
    pub const fn is_conflict(&self) -> bool {
        matches!(self, Self::Conflict { .. })
    }
}

impl From<CoreError> for DatabaseError {
    fn from(e: CoreError) -> Self {
        Self::InvalidState(e.to_string())
    }
}
