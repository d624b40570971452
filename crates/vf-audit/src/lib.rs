//! # vf-audit
//!
//! Audit cross-checker for synthesized vendor reports.
//!
//! Compares the facts extracted during a research session with the narrative
//! report written from them:
//! - **dropped facts**: extracted but missing from the report
//! - **unsupported claims**: compliance statements in the report that no
//!   extracted fact backs
//!
//! Both feed the confidence score in [`scoring`]. Text matching is confined
//! to this crate; source classification never looks at report text.

pub mod checker;
pub mod review;
pub mod scoring;
pub mod text;
pub mod vocabulary;

pub use checker::CrossChecker;
pub use review::{AuditReview, DroppedReference};
pub use scoring::{AuditScore, score};
pub use vocabulary::ClaimVocabulary;
