//! URL → canonical domain.

use url::Url;

/// Canonicalize a URL into a comparable domain.
///
/// Lowercases, adds `https://` when no scheme is present, drops any port,
/// strips a leading `www.` and a trailing root dot. Returns `None` for empty
/// or unparseable input and for hosts without a `.`.
#[must_use]
pub fn normalize_domain(url: &str) -> Option<String> {
    let host = parse_with_default_scheme(url)?
        .host_str()?
        .to_ascii_lowercase();

    let host = host.trim_end_matches('.');
    let host = host.strip_prefix("www.").unwrap_or(host);

    if host.is_empty() || !host.contains('.') {
        return None;
    }
    Some(host.to_string())
}

/// Parse a URL, assuming `https://` when the input carries no scheme.
pub(crate) fn parse_with_default_scheme(url: &str) -> Option<Url> {
    let trimmed = url.trim();
    if trimmed.is_empty() {
        return None;
    }
    let lowered = trimmed.to_ascii_lowercase();
    let candidate = if lowered.contains("://") {
        lowered
    } else {
        format!("https://{lowered}")
    };
    Url::parse(&candidate).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("https://trust.tabnine.com")]
    #[case("http://trust.tabnine.com")]
    #[case("https://www.trust.tabnine.com")]
    #[case("trust.tabnine.com")]
    #[case("www.trust.tabnine.com")]
    #[case("https://trust.tabnine.com:8443/soc2")]
    #[case("trust.tabnine.com:80")]
    #[case("HTTPS://Trust.Tabnine.COM/Path?q=1")]
    #[case("  https://trust.tabnine.com/  ")]
    #[case("https://trust.tabnine.com./")]
    fn variants_normalize_identically(#[case] input: &str) {
        assert_eq!(normalize_domain(input).as_deref(), Some("trust.tabnine.com"));
    }

    #[rstest]
    #[case("")]
    #[case("   ")]
    #[case("localhost")]
    #[case("https://localhost:3000")]
    #[case("http://")]
    #[case("https://exa mple.com")]
    fn invalid_inputs_yield_none(#[case] input: &str) {
        assert_eq!(normalize_domain(input), None);
    }

    #[test]
    fn only_leading_www_is_stripped() {
        assert_eq!(
            normalize_domain("https://www.wwwexample.com").as_deref(),
            Some("wwwexample.com")
        );
        assert_eq!(
            normalize_domain("https://docs.www.example.com").as_deref(),
            Some("docs.www.example.com")
        );
    }
}
