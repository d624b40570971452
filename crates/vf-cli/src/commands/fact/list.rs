use vf_core::enums::{FactCategory, VerificationStatus};
use vf_db::repos::facts::FactFilter;

use crate::commands::shared::parse::parse_enum;

pub fn build_filter(
    vendor: Option<&str>,
    product: Option<&str>,
    category: Option<&str>,
    status: Option<&str>,
    include_history: bool,
    limit: u32,
) -> anyhow::Result<FactFilter> {
    Ok(FactFilter {
        vendor_name: vendor.map(str::to_string),
        product_name: product.map(str::to_string),
        category: category
            .map(|raw| parse_enum::<FactCategory>(raw, "category"))
            .transpose()?,
        status: status
            .map(|raw| parse_enum::<VerificationStatus>(raw, "status"))
            .transpose()?,
        include_history,
        limit: Some(limit),
    })
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use vf_core::enums::{FactCategory, VerificationStatus};

    use super::build_filter;

    #[test]
    fn parses_category_and_status() {
        let filter = build_filter(
            Some("Acme"),
            None,
            Some("data-handling"),
            Some("verified"),
            false,
            20,
        )
        .unwrap();
        assert_eq!(filter.vendor_name.as_deref(), Some("Acme"));
        assert_eq!(filter.category, Some(FactCategory::DataHandling));
        assert_eq!(filter.status, Some(VerificationStatus::Verified));
        assert_eq!(filter.limit, Some(20));
    }

    #[test]
    fn rejects_unknown_status() {
        let err = build_filter(None, None, None, Some("fresh"), false, 20).unwrap_err();
        assert!(err.to_string().contains("invalid status 'fresh'"));
    }
}
