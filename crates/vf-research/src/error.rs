//! Research error types.

use thiserror::Error;
use vf_db::error::DatabaseError;

/// Errors that end a research session.
///
/// Recheck and discovery failures are not in here: they are recorded on the
/// facts and in the session notes, and the session carries on.
#[derive(Debug, Error)]
pub enum ResearchError {
    /// The fact store rejected a read or write.
    #[error("store error: {0}")]
    Store(#[from] DatabaseError),

    /// The request cannot be researched as given.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// The discovery collaborator failed.
    #[error("discovery failed: {0}")]
    Discovery(String),
}
