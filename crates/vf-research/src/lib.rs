//! # vf-research
//!
//! Research orchestration for the vendor fact store.
//!
//! A [`Researcher`] takes a vendor, product and mode, and for every requested
//! key decides between serving the cache, rechecking the cached fact's source,
//! or handing the key to discovery. Network and model work happens behind two
//! traits, [`SourceChecker`] and [`DiscoveryAgent`]; this crate only schedules
//! it, bounds it, and writes the results through `vf-db`.
//!
//! ## Concurrency
//!
//! Rechecks run in a `JoinSet` gated by a semaphore sized from
//! `research.max_concurrent_rechecks`, alongside one discovery call. Each
//! recheck and the discovery call carry their own timeout. A timed-out
//! recheck is recorded on the fact as `timeout`; a timed-out discovery leaves
//! its gaps unfilled. Results are applied one at a time as tasks complete.
//!
//! ## Cancellation
//!
//! A [`CancellationFlag`] stops new work from starting. Work already running
//! completes and commits, and the research log is closed as cancelled.

pub mod cancel;
pub mod collaborators;
pub mod error;
pub mod policy;
pub mod report;
pub mod session;

pub use cancel::CancellationFlag;
pub use collaborators::{
    DiscoveryAgent, DiscoveryRequest, DiscoveryResponse, ResearchKey, SourceChecker,
};
pub use error::ResearchError;
pub use policy::{Decision, DecisionReason, STANDARD_KEYS, decide};
pub use report::{PlannedKey, RecheckRun, RecheckSummary, SessionReport};
pub use session::{ResearchRequest, Researcher, SessionSettings};
