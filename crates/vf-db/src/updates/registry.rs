//! Registry entry update builder.

use serde::Serialize;
use vf_core::entities::VendorRegistryEntry;
use vf_core::enums::UrlType;

/// Partial update of a registry entry.
///
/// URL slots use `Option<Option<String>>`: `Some(None)` clears the slot.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RegistryUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub aliases: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub urls: Vec<(UrlType, Option<String>)>,
}

impl RegistryUpdate {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.aliases.is_none() && self.urls.is_empty()
    }

    /// Apply to an entry in place.
    pub fn apply(&self, entry: &mut VendorRegistryEntry) {
        if let Some(aliases) = &self.aliases {
            entry.aliases.clone_from(aliases);
        }
        for (url_type, url) in &self.urls {
            match url.as_deref().map(str::trim) {
                Some(url) if !url.is_empty() => entry.set_url(*url_type, url),
                _ => clear_url(entry, *url_type),
            }
        }
    }
}

fn clear_url(entry: &mut VendorRegistryEntry, url_type: UrlType) {
    match url_type {
        UrlType::TrustCenter => entry.trust_center = None,
        UrlType::SecurityPage => entry.security_page = None,
        UrlType::PrivacyPage => entry.privacy_page = None,
        UrlType::PricingPage => entry.pricing_page = None,
        UrlType::Docs => entry.docs = None,
    }
}

#[derive(Default)]
pub struct RegistryUpdateBuilder(RegistryUpdate);

impl RegistryUpdateBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self(RegistryUpdate::default())
    }

    #[must_use]
    pub fn aliases(mut self, val: Vec<String>) -> Self {
        self.0.aliases = Some(val);
        self
    }

    #[must_use]
    pub fn url(mut self, url_type: UrlType, val: impl Into<String>) -> Self {
        self.0.urls.push((url_type, Some(val.into())));
        self
    }

    #[must_use]
    pub fn clear_url(mut self, url_type: UrlType) -> Self {
        self.0.urls.push((url_type, None));
        self
    }

    #[must_use]
    pub fn build(self) -> RegistryUpdate {
        self.0
    }
}
