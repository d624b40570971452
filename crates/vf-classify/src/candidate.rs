//! Candidate authority analyzer.
//!
//! Guesses whether a URL found during research could be one of a vendor's
//! authoritative pages, from subdomain and path tokens alone. There are no
//! vendor-name heuristics: a vendor name showing up in an unrelated domain
//! (`techcrunch.com/newco-funding`) says nothing about authority.
//!
//! The token tables are an explicit value ([`AuthorityPatterns`]) owned by the
//! caller and handed to a [`CandidateAnalyzer`].

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use vf_core::enums::CandidateType;

use crate::domain::{normalize_domain, parse_with_default_scheme};

/// Which signals matched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum MatchTier {
    SubdomainAndPath,
    Subdomain,
    Path,
    None,
}

/// Confidence assigned to each tier.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ConfidenceTiers {
    pub subdomain_and_path: f64,
    pub subdomain: f64,
    pub path: f64,
}

impl Default for ConfidenceTiers {
    fn default() -> Self {
        Self {
            subdomain_and_path: 0.9,
            subdomain: 0.7,
            path: 0.5,
        }
    }
}

impl ConfidenceTiers {
    #[must_use]
    pub const fn for_tier(&self, tier: MatchTier) -> f64 {
        match tier {
            MatchTier::SubdomainAndPath => self.subdomain_and_path,
            MatchTier::Subdomain => self.subdomain,
            MatchTier::Path => self.path,
            MatchTier::None => 0.0,
        }
    }
}

/// Token tables used by the analyzer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct AuthorityPatterns {
    /// Leftmost-label tokens, e.g. `trust` in `trust.vendor.com`.
    pub subdomain_tokens: Vec<(String, CandidateType)>,
    /// Path segment tokens, e.g. `security` in `vendor.com/security`.
    pub path_tokens: Vec<(String, CandidateType)>,
    pub tiers: ConfidenceTiers,
}

impl AuthorityPatterns {
    /// The standard token set.
    #[must_use]
    pub fn standard() -> Self {
        let subdomain_tokens = [
            ("trust", CandidateType::TrustCenter),
            ("security", CandidateType::SecurityPage),
            ("docs", CandidateType::Docs),
            ("pricing", CandidateType::PricingPage),
            ("status", CandidateType::StatusPage),
        ];
        let path_tokens = [
            ("security", CandidateType::SecurityPage),
            ("trust", CandidateType::TrustCenter),
            ("privacy", CandidateType::PrivacyPage),
            ("pricing", CandidateType::PricingPage),
            ("docs", CandidateType::Docs),
        ];
        Self {
            subdomain_tokens: subdomain_tokens
                .into_iter()
                .map(|(token, kind)| (token.to_string(), kind))
                .collect(),
            path_tokens: path_tokens
                .into_iter()
                .map(|(token, kind)| (token.to_string(), kind))
                .collect(),
            tiers: ConfidenceTiers::default(),
        }
    }
}

impl Default for AuthorityPatterns {
    fn default() -> Self {
        Self::standard()
    }
}

/// Analysis of a single discovered URL.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct CandidateResult {
    pub url: String,
    pub normalized_domain: Option<String>,
    pub candidate_type: CandidateType,
    pub confidence: f64,
    pub tier: MatchTier,
    /// `false` for `status_page` and `unknown`, which have no registry field.
    pub promotable: bool,
}

/// Pattern-based candidate analyzer.
#[derive(Debug, Clone, Default)]
pub struct CandidateAnalyzer {
    patterns: AuthorityPatterns,
}

impl CandidateAnalyzer {
    #[must_use]
    pub const fn new(patterns: AuthorityPatterns) -> Self {
        Self { patterns }
    }

    #[must_use]
    pub const fn patterns(&self) -> &AuthorityPatterns {
        &self.patterns
    }

    #[must_use]
    pub fn analyze(&self, url: &str) -> CandidateResult {
        let Some(domain) = normalize_domain(url) else {
            return unknown(url, None);
        };

        let subdomain_type = self.match_subdomain(&domain);
        let path_type =
            parse_with_default_scheme(url).and_then(|parsed| self.match_path(parsed.path()));

        let (candidate_type, tier) = match (subdomain_type, path_type) {
            (Some(kind), Some(_)) => (kind, MatchTier::SubdomainAndPath),
            (Some(kind), None) => (kind, MatchTier::Subdomain),
            (None, Some(kind)) => (kind, MatchTier::Path),
            (None, None) => return unknown(url, Some(domain)),
        };

        CandidateResult {
            url: url.trim().to_string(),
            normalized_domain: Some(domain),
            candidate_type,
            confidence: self.patterns.tiers.for_tier(tier),
            tier,
            promotable: candidate_type.is_promotable(),
        }
    }

    /// Only hosts with at least three labels have a subdomain to match.
    fn match_subdomain(&self, domain: &str) -> Option<CandidateType> {
        let labels: Vec<&str> = domain.split('.').collect();
        if labels.len() < 3 {
            return None;
        }
        let first = labels[0];
        self.patterns
            .subdomain_tokens
            .iter()
            .find(|(token, _)| first == token.as_str() || first.starts_with(&format!("{token}-")))
            .map(|(_, kind)| *kind)
    }

    /// A segment matches when it equals a token or starts with `token-`
    /// (`/trust-center`, `/privacy-policy`). The first matching segment wins.
    fn match_path(&self, path: &str) -> Option<CandidateType> {
        path.split('/')
            .filter(|segment| !segment.is_empty())
            .find_map(|segment| {
                let segment = segment.to_ascii_lowercase();
                self.patterns
                    .path_tokens
                    .iter()
                    .find(|(token, _)| {
                        segment == token.as_str() || segment.starts_with(&format!("{token}-"))
                    })
                    .map(|(_, kind)| *kind)
            })
    }
}

fn unknown(url: &str, domain: Option<String>) -> CandidateResult {
    CandidateResult {
        url: url.trim().to_string(),
        normalized_domain: domain,
        candidate_type: CandidateType::Unknown,
        confidence: 0.0,
        tier: MatchTier::None,
        promotable: false,
    }
}
