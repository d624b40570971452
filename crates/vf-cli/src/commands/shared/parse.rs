use anyhow::Context;
use serde::de::DeserializeOwned;
use vf_core::entities::VendorUrl;
use vf_core::enums::{FactCategory, UrlType};
use vf_research::ResearchKey;

/// Parse a snake_case enum value using serde deserialization.
pub fn parse_enum<T>(raw: &str, field: &str) -> anyhow::Result<T>
where
    T: DeserializeOwned,
{
    let normalized = raw.trim().replace('-', "_");
    serde_json::from_value(serde_json::Value::String(normalized))
        .map_err(|error| anyhow::anyhow!("invalid {field} '{raw}': {error}"))
}

/// Split `left<sep>right`, trimming both halves.
fn split_pair<'a>(raw: &'a str, sep: char, what: &str) -> anyhow::Result<(&'a str, &'a str)> {
    raw.split_once(sep)
        .map(|(l, r)| (l.trim(), r.trim()))
        .with_context(|| format!("invalid {what} '{raw}': expected '{sep}' separator"))
}

/// `trust_center=https://trust.vendor.com`
pub fn parse_vendor_url(raw: &str) -> anyhow::Result<VendorUrl> {
    let (url_type, url) = split_pair(raw, '=', "vendor url")?;
    if url.is_empty() {
        anyhow::bail!("invalid vendor url '{raw}': url is empty");
    }
    Ok(VendorUrl::new(parse_enum::<UrlType>(url_type, "url type")?, url))
}

/// `type=url` where an empty url means "clear this slot".
pub fn parse_url_slot(raw: &str) -> anyhow::Result<(UrlType, Option<String>)> {
    let (url_type, url) = split_pair(raw, '=', "url")?;
    let url = (!url.is_empty()).then(|| url.to_string());
    Ok((parse_enum(url_type, "url type")?, url))
}

/// `category:key`
pub fn parse_research_key(raw: &str) -> anyhow::Result<ResearchKey> {
    let (category, key) = split_pair(raw, ':', "key")?;
    if key.is_empty() {
        anyhow::bail!("invalid key '{raw}': key is empty");
    }
    Ok(ResearchKey::new(
        parse_enum::<FactCategory>(category, "category")?,
        key,
    ))
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use vf_core::enums::{SourceStatus, VerificationStatus};

    use super::*;

    #[test]
    fn parses_snake_case_and_hyphenated_values() {
        let status: VerificationStatus = parse_enum("verified", "status").unwrap();
        assert_eq!(status, VerificationStatus::Verified);
        let url_type: UrlType = parse_enum("trust-center", "url type").unwrap();
        assert_eq!(url_type, UrlType::TrustCenter);
        let source: SourceStatus = parse_enum("404", "source status").unwrap();
        assert_eq!(source, SourceStatus::NotFound);
    }

    #[test]
    fn errors_name_the_field() {
        let err = parse_enum::<VerificationStatus>("done", "status").unwrap_err();
        assert!(err.to_string().contains("invalid status 'done'"));
    }

    #[test]
    fn vendor_url_pairs() {
        assert_eq!(
            parse_vendor_url("security_page = https://www.tabnine.com/security").unwrap(),
            VendorUrl::new(UrlType::SecurityPage, "https://www.tabnine.com/security")
        );
        assert!(parse_vendor_url("https://www.tabnine.com").is_err());
        assert!(parse_vendor_url("docs=").is_err());
        assert_eq!(parse_url_slot("docs=").unwrap(), (UrlType::Docs, None));
    }

    #[test]
    fn research_keys() {
        assert_eq!(
            parse_research_key("data_handling:training_policy").unwrap(),
            ResearchKey::new(FactCategory::DataHandling, "training_policy")
        );
        assert!(parse_research_key("training_policy").is_err());
        assert!(parse_research_key("nonsense:training_policy").is_err());
    }
}
