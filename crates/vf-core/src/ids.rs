//! ID prefixes for stored entities.
//!
//! IDs are generated as `{prefix}-{8 hex chars}`, e.g. `fct-a3f8b2c1`.

pub const PREFIX_FACT: &str = "fct";
pub const PREFIX_VERIFICATION_LOG: &str = "vlg";
pub const PREFIX_CANDIDATE: &str = "cnd";
pub const PREFIX_RESEARCH_LOG: &str = "rsl";

pub const ALL_PREFIXES: &[&str] = &[
    PREFIX_FACT,
    PREFIX_VERIFICATION_LOG,
    PREFIX_CANDIDATE,
    PREFIX_RESEARCH_LOG,
];

/// Format an ID from a prefix and a random hex suffix.
#[must_use]
pub fn format_id(prefix: &str, suffix: &str) -> String {
    format!("{prefix}-{suffix}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefixes_are_unique_and_three_chars() {
        let mut seen = std::collections::HashSet::new();
        for prefix in ALL_PREFIXES {
            assert_eq!(prefix.len(), 3, "prefix {prefix} should be 3 chars");
            assert!(seen.insert(*prefix), "duplicate prefix {prefix}");
        }
    }

    #[test]
    fn format_id_joins_with_dash() {
        assert_eq!(format_id(PREFIX_FACT, "a3f8b2c1"), "fct-a3f8b2c1");
    }
}
