//! Source classifier: URL × authoritative URL set → vendor / third party.
//!
//! Matching is exact domain equality only. There is no substring or suffix
//! matching, so `evil-trust.tabnine.com.attacker.net` never matches
//! `trust.tabnine.com`. Failures are reported as reason codes, never errors.

use std::collections::HashMap;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use vf_core::entities::VendorUrl;
use vf_core::enums::{SourceType, UrlType};

use crate::domain::normalize_domain;

/// Why a URL received its classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ClassificationReason {
    NoUrl,
    NoRegistryUrls,
    InvalidUrl,
    ExactDomainMatch,
    NoMatch,
}

impl ClassificationReason {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NoUrl => "no_url",
            Self::NoRegistryUrls => "no_registry_urls",
            Self::InvalidUrl => "invalid_url",
            Self::ExactDomainMatch => "exact_domain_match",
            Self::NoMatch => "no_match",
        }
    }
}

impl std::fmt::Display for ClassificationReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of classifying one URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Classification {
    pub source_type: SourceType,
    pub reason: ClassificationReason,
    pub matched_type: Option<UrlType>,
    pub matched_domain: Option<String>,
}

impl Classification {
    const fn third_party(reason: ClassificationReason) -> Self {
        Self {
            source_type: SourceType::ThirdParty,
            reason,
            matched_type: None,
            matched_domain: None,
        }
    }

    #[must_use]
    pub fn is_vendor(&self) -> bool {
        self.source_type == SourceType::Vendor
    }
}

/// Domain → url type lookup built from a vendor URL list.
///
/// The first URL to claim a domain wins, preserving the caller's priority order.
#[derive(Debug, Clone, Default)]
pub struct DomainIndex {
    by_domain: HashMap<String, UrlType>,
    /// Vendor URLs supplied, including ones that failed to normalize.
    supplied: usize,
}

impl DomainIndex {
    #[must_use]
    pub fn build(vendor_urls: &[VendorUrl]) -> Self {
        let mut by_domain = HashMap::with_capacity(vendor_urls.len());
        for entry in vendor_urls {
            match normalize_domain(&entry.url) {
                Some(domain) => {
                    by_domain.entry(domain).or_insert(entry.url_type);
                }
                None => tracing::debug!(url = %entry.url, "skipping unparseable vendor url"),
            }
        }
        Self {
            by_domain,
            supplied: vendor_urls.len(),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_domain.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.by_domain.len()
    }

    #[must_use]
    pub fn lookup(&self, domain: &str) -> Option<UrlType> {
        self.by_domain.get(domain).copied()
    }

    /// Classify a URL against this index.
    ///
    /// `no_registry_urls` is reserved for an empty vendor URL list. A list
    /// whose entries all fail to normalize still yields `invalid_url` or
    /// `no_match`.
    #[must_use]
    pub fn classify(&self, url: &str) -> Classification {
        if url.trim().is_empty() {
            return Classification::third_party(ClassificationReason::NoUrl);
        }
        if self.supplied == 0 {
            return Classification::third_party(ClassificationReason::NoRegistryUrls);
        }
        let Some(domain) = normalize_domain(url) else {
            return Classification::third_party(ClassificationReason::InvalidUrl);
        };
        match self.lookup(&domain) {
            Some(url_type) => Classification {
                source_type: SourceType::Vendor,
                reason: ClassificationReason::ExactDomainMatch,
                matched_type: Some(url_type),
                matched_domain: Some(domain),
            },
            None => Classification::third_party(ClassificationReason::NoMatch),
        }
    }
}

/// Classify `url` against the vendor's authoritative URLs.
///
/// Builds a fresh [`DomainIndex`]; callers classifying many URLs against the
/// same set should build the index once and call [`DomainIndex::classify`].
#[must_use]
pub fn classify(url: &str, vendor_urls: &[VendorUrl]) -> Classification {
    if url.trim().is_empty() {
        return Classification::third_party(ClassificationReason::NoUrl);
    }
    DomainIndex::build(vendor_urls).classify(url)
}
