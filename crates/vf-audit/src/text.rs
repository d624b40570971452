//! Report text helpers: sentence splitting and case-insensitive matching.

/// A sentence of the report with its 1-based position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sentence {
    pub paragraph: usize,
    pub index: usize,
    pub text: String,
}

impl Sentence {
    #[must_use]
    pub fn location(&self) -> String {
        format!("paragraph {}, sentence {}", self.paragraph, self.index)
    }
}

/// Split a report into sentences.
///
/// Paragraphs are separated by blank lines. A sentence ends at `.`, `!` or
/// `?` followed by whitespace or end of paragraph, so `99.9%` and `v2.1` stay
/// intact. Markdown list markers and headings are treated as their own
/// sentences.
#[must_use]
pub fn sentences(report: &str) -> Vec<Sentence> {
    let mut out = Vec::new();
    let mut paragraph = 0;

    for block in report.split("\n\n").map(str::trim).filter(|b| !b.is_empty()) {
        paragraph += 1;
        let mut index = 0;
        for line in block.lines().map(str::trim).filter(|l| !l.is_empty()) {
            let line = line.trim_start_matches(['#', '-', '*', '>']).trim_start();
            for text in split_line(line) {
                index += 1;
                out.push(Sentence {
                    paragraph,
                    index,
                    text,
                });
            }
        }
    }
    out
}

fn split_line(line: &str) -> Vec<String> {
    let mut parts = Vec::new();
    let mut current = String::new();
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        current.push(c);
        let at_boundary = matches!(c, '.' | '!' | '?')
            && chars.peek().is_none_or(|next| next.is_whitespace());
        if at_boundary {
            push_trimmed(&mut parts, &current);
            current.clear();
        }
    }
    push_trimmed(&mut parts, &current);
    parts
}

fn push_trimmed(parts: &mut Vec<String>, text: &str) {
    let trimmed = text.trim();
    if !trimmed.is_empty() {
        parts.push(trimmed.to_string());
    }
}

/// Lowercased text with runs of whitespace collapsed to one space.
#[must_use]
pub fn fold(text: &str) -> String {
    text.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Human label for a fact key: `hipaa_baa` → `hipaa baa`.
#[must_use]
pub fn key_label(key: &str) -> String {
    fold(&key.replace(['_', '-'], " "))
}

/// Whether `term` occurs in `folded` starting at a word boundary.
///
/// Only the start is anchored, so `encrypt` matches `encrypted` while `sso`
/// does not match `associated`.
#[must_use]
pub fn contains_term(folded: &str, term: &str) -> bool {
    if term.is_empty() {
        return false;
    }
    folded.match_indices(term).any(|(start, _)| {
        !folded[..start]
            .chars()
            .next_back()
            .is_some_and(char::is_alphanumeric)
    })
}

/// Whether a value is a bare yes/no style answer that a report would phrase
/// in words rather than quote.
#[must_use]
pub fn is_boolean_like(value: &str) -> bool {
    matches!(
        fold(value).as_str(),
        "yes" | "no" | "true" | "false" | "available" | "not available" | "none"
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn splits_paragraphs_and_sentences() {
        let report = "Tabnine holds SOC 2 Type II. Uptime is 99.9% monthly!\n\n\
                      Data stays in the EU? It does.";
        let s = sentences(report);
        let located: Vec<_> = s.iter().map(|s| (s.location(), s.text.as_str())).collect();
        assert_eq!(
            located,
            vec![
                ("paragraph 1, sentence 1".to_string(), "Tabnine holds SOC 2 Type II."),
                ("paragraph 1, sentence 2".to_string(), "Uptime is 99.9% monthly!"),
                ("paragraph 2, sentence 1".to_string(), "Data stays in the EU?"),
                ("paragraph 2, sentence 2".to_string(), "It does."),
            ]
        );
    }

    #[test]
    fn list_items_are_sentences() {
        let s = sentences("## Certifications\n- SOC 2 Type II\n- ISO 27001");
        let texts: Vec<_> = s.iter().map(|s| s.text.as_str()).collect();
        assert_eq!(texts, vec!["Certifications", "SOC 2 Type II", "ISO 27001"]);
    }

    #[test]
    fn labels_and_folding() {
        assert_eq!(key_label("hipaa_baa"), "hipaa baa");
        assert_eq!(fold("  SOC 2\n Type   II "), "soc 2 type ii");
        assert!(is_boolean_like("Yes"));
        assert!(!is_boolean_like("SOC 2 Type II"));
    }

    #[test]
    fn terms_anchor_at_word_start() {
        assert!(contains_term("data is encrypted at rest", "encrypt"));
        assert!(contains_term("supports sso via saml", "sso"));
        assert!(!contains_term("associated vendors", "sso"));
        assert!(!contains_term("anything", ""));
    }
}
