//! Cross-cutting error types.
//!
//! Domain-specific errors (`DatabaseError`, `ResearchError`) live in their own
//! crates. `CoreError` covers failures that can be detected on plain values,
//! before any storage is involved.

use thiserror::Error;

/// Errors that can be raised by any crate in the workspace.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A state machine transition was attempted that is not allowed.
    #[error("Invalid state transition: {entity_type} {id} from {from} to {to}")]
    InvalidTransition {
        entity_type: String,
        id: String,
        from: String,
        to: String,
    },
}
