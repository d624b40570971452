//! Repository modules implementing store operations.
//!
//! Each module adds methods to `FactService` via `impl FactService` blocks.

pub mod candidates;
pub mod facts;
pub mod registry;
pub mod research_logs;
pub mod verification_log;
