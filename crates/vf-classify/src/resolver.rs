//! Effective-URL resolver.
//!
//! A registry entry is authoritative and is never extended by candidates. Only
//! novel vendors fall back to analyzed candidates, de-duplicated per domain.
//!
//! Callers must re-run classification after resolution: a URL seen before the
//! effective set existed was classified against an empty set.

use std::collections::HashMap;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use vf_core::entities::{VendorRegistryEntry, VendorUrl};

use crate::candidate::{CandidateAnalyzer, CandidateResult};

/// Where the effective URL set came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum UrlSource {
    Registry,
    Candidates,
}

/// Effective URLs plus the candidates that produced them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Resolution {
    pub source: UrlSource,
    pub urls: Vec<VendorUrl>,
    /// Surviving candidates, one per domain. Empty for registry resolutions.
    pub candidates: Vec<CandidateResult>,
}

/// Resolve the URL set for a vendor.
#[must_use]
pub fn resolve(
    entry: Option<&VendorRegistryEntry>,
    discovered: &[String],
    vendor_name: &str,
    analyzer: &CandidateAnalyzer,
) -> Resolution {
    if let Some(entry) = entry {
        if discovered.iter().any(|url| !url.trim().is_empty()) {
            tracing::debug!(
                vendor = vendor_name,
                registry = %entry.vendor_name,
                discovered = discovered.len(),
                "registry entry present, ignoring discovered urls"
            );
        }
        return Resolution {
            source: UrlSource::Registry,
            urls: entry.urls(),
            candidates: Vec::new(),
        };
    }

    let candidates = dedupe_by_domain(discovered.iter().map(|url| analyzer.analyze(url)));
    let urls = candidates
        .iter()
        .filter_map(|c| {
            c.candidate_type
                .registry_type()
                .map(|url_type| VendorUrl::new(url_type, c.url.clone()))
        })
        .collect::<Vec<_>>();

    tracing::debug!(
        vendor = vendor_name,
        discovered = discovered.len(),
        effective = urls.len(),
        "resolved effective urls from candidates"
    );

    Resolution {
        source: UrlSource::Candidates,
        urls,
        candidates,
    }
}

/// Convenience wrapper returning only the `(type, url)` list.
#[must_use]
pub fn resolve_effective_urls(
    entry: Option<&VendorRegistryEntry>,
    discovered: &[String],
    vendor_name: &str,
    analyzer: &CandidateAnalyzer,
) -> Vec<VendorUrl> {
    resolve(entry, discovered, vendor_name, analyzer).urls
}

/// Keep one promotable candidate per domain: the highest confidence, ties
/// going to the first seen. Output follows first appearance of each domain.
fn dedupe_by_domain(results: impl Iterator<Item = CandidateResult>) -> Vec<CandidateResult> {
    let mut kept: Vec<CandidateResult> = Vec::new();
    let mut slot_by_domain: HashMap<String, usize> = HashMap::new();

    for result in results {
        if !result.promotable {
            continue;
        }
        let Some(domain) = result.normalized_domain.clone() else {
            continue;
        };
        match slot_by_domain.get(&domain) {
            Some(&slot) => {
                if result.confidence > kept[slot].confidence {
                    kept[slot] = result;
                }
            }
            None => {
                slot_by_domain.insert(domain, kept.len());
                kept.push(result);
            }
        }
    }
    kept
}
