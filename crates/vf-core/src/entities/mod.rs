//! Entity structs for all stored domain objects.
//!
//! Each entity maps to a table in the libSQL fact store. All structs derive
//! `Serialize`, `Deserialize`, and `JsonSchema` for JSON roundtrip and schema
//! validation at collaborator boundaries.

mod audit;
mod candidate;
mod registry;
mod research_log;
mod vendor_fact;
mod verification_log;

pub use audit::{AuditResult, DroppedFact, UnsupportedClaim};
pub use candidate::CandidateVendorUrl;
pub use registry::{VendorRegistryEntry, VendorUrl};
pub use research_log::ResearchLog;
pub use vendor_fact::{FactKey, NewFact, VendorFact};
pub use verification_log::FactVerificationLogEntry;
