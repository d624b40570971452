//! # vf-classify
//!
//! Deciding whether a URL is vendor-authoritative.
//!
//! Everything in this crate is pure and synchronous: no network, storage or
//! model access, and no state held across calls. Identical inputs always give
//! identical outputs, which is what makes a classification auditable.
//!
//! - [`domain`] canonicalizes URLs into comparable domain strings
//! - [`classifier`] maps a URL onto `vendor` / `third_party` by exact domain match
//! - [`candidate`] guesses which unknown URLs might be authoritative
//! - [`resolver`] builds the URL set the classifier runs against

pub mod candidate;
pub mod classifier;
pub mod domain;
pub mod resolver;

pub use candidate::{AuthorityPatterns, CandidateAnalyzer, CandidateResult, MatchTier};
pub use classifier::{Classification, ClassificationReason, DomainIndex, classify};
pub use domain::normalize_domain;
pub use resolver::{Resolution, UrlSource, resolve, resolve_effective_urls};
