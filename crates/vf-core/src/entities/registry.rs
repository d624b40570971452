use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::enums::UrlType;

/// One `(type, url)` pair fed to the source classifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub struct VendorUrl {
    #[serde(rename = "type")]
    pub url_type: UrlType,
    pub url: String,
}

impl VendorUrl {
    #[must_use]
    pub fn new(url_type: UrlType, url: impl Into<String>) -> Self {
        Self {
            url_type,
            url: url.into(),
        }
    }
}

/// A known vendor's authoritative URLs, keyed by vendor name and aliases.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct VendorRegistryEntry {
    pub vendor_name: String,
    #[serde(default)]
    pub aliases: Vec<String>,
    pub trust_center: Option<String>,
    pub security_page: Option<String>,
    pub privacy_page: Option<String>,
    pub pricing_page: Option<String>,
    pub docs: Option<String>,
    pub updated_at: DateTime<Utc>,
}

impl VendorRegistryEntry {
    #[must_use]
    pub fn new(vendor_name: impl Into<String>) -> Self {
        Self {
            vendor_name: vendor_name.into(),
            aliases: Vec::new(),
            trust_center: None,
            security_page: None,
            privacy_page: None,
            pricing_page: None,
            docs: None,
            updated_at: Utc::now(),
        }
    }

    #[must_use]
    pub fn url_for(&self, url_type: UrlType) -> Option<&str> {
        let slot = match url_type {
            UrlType::TrustCenter => &self.trust_center,
            UrlType::SecurityPage => &self.security_page,
            UrlType::PrivacyPage => &self.privacy_page,
            UrlType::PricingPage => &self.pricing_page,
            UrlType::Docs => &self.docs,
        };
        slot.as_deref().filter(|url| !url.trim().is_empty())
    }

    pub fn set_url(&mut self, url_type: UrlType, url: impl Into<String>) {
        let slot = match url_type {
            UrlType::TrustCenter => &mut self.trust_center,
            UrlType::SecurityPage => &mut self.security_page,
            UrlType::PrivacyPage => &mut self.privacy_page,
            UrlType::PricingPage => &mut self.pricing_page,
            UrlType::Docs => &mut self.docs,
        };
        *slot = Some(url.into());
    }

    /// Registered URLs in canonical priority order, skipping empty fields.
    #[must_use]
    pub fn urls(&self) -> Vec<VendorUrl> {
        UrlType::CANONICAL_ORDER
            .iter()
            .filter_map(|&url_type| self.url_for(url_type).map(|url| VendorUrl::new(url_type, url)))
            .collect()
    }

    /// Case-insensitive match on the vendor name or any alias.
    #[must_use]
    pub fn matches_name(&self, name: &str) -> bool {
        let name = name.trim();
        self.vendor_name.eq_ignore_ascii_case(name)
            || self.aliases.iter().any(|alias| alias.eq_ignore_ascii_case(name))
    }
}
