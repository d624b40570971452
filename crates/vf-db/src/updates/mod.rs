//! Input and update builder types for store mutations.
//!
//! Builders produce plain structs with `Option` fields; only `Some` fields are
//! applied by the corresponding repo method.

pub mod recheck;
pub mod registry;
