//! Section extraction from free-text analysis output
//!
//! Model output is only loosely structured, so extraction is best-effort:
//! a section that cannot be located is reported as [`NOT_SPECIFIED`] and
//! never as an error.

use regex::Regex;
use shared_types::{SectionLabel, NOT_SPECIFIED};

use crate::patterns::{label_pattern, HEADING_BOUNDARY};

/// Extract the body of `label` from an analysis.
///
/// The body starts after the first `label:` heading (matched
/// case-insensitively anywhere in the text) and runs up to the next line
/// that reads as a heading, or the end of the text. The result is trimmed.
///
/// # Example
/// ```
/// use clause_engine::extract_section;
/// use shared_types::SectionLabel;
///
/// let text = "Parties: Acme and Beta\nJurisdiction: Delaware";
/// assert_eq!(extract_section(text, SectionLabel::Parties), "Acme and Beta");
/// assert_eq!(extract_section(text, SectionLabel::RiskFlags), "Not specified");
/// ```
pub fn extract_section(text: &str, label: SectionLabel) -> String {
    extract_with(text, label_pattern(label))
}

/// Extract every label in the given order
pub fn extract_sections(text: &str, labels: &[SectionLabel]) -> Vec<(SectionLabel, String)> {
    labels
        .iter()
        .map(|label| (*label, extract_section(text, *label)))
        .collect()
}

fn extract_with(text: &str, heading: &Regex) -> String {
    let Some(found) = heading.find(text) else {
        return NOT_SPECIFIED.to_string();
    };

    let rest = &text[found.end()..];
    let end = HEADING_BOUNDARY
        .find(rest)
        .map_or(rest.len(), |boundary| boundary.start());

    // A heading with nothing under it is as good as a missing one
    match rest[..end].trim() {
        "" => NOT_SPECIFIED.to_string(),
        body => body.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    const MARKDOWN_ANALYSIS: &str = "\
1. **Parties**: Acme Corp (Discloser) and Beta LLC (Recipient)
2. **Effective Date**: January 1, 2024
3. **Term**: Two years, renewing annually
4. **Confidential Information**: Business plans and customer lists
5. **Obligations**:
   - Recipient: keep information secret
   - Return materials on request
6. **Jurisdiction**: State of Delaware
7. **Risk Flags**: Perpetual confidentiality clause";

    #[test]
    fn test_extracts_up_to_next_heading() {
        let text = "Parties: Acme and Beta\nJurisdiction: Delaware";
        assert_eq!(extract_section(text, SectionLabel::Parties), "Acme and Beta");
        assert_eq!(extract_section(text, SectionLabel::Jurisdiction), "Delaware");
    }

    #[test]
    fn test_missing_label_is_not_specified() {
        let text = "Parties: Acme and Beta\nJurisdiction: Delaware";
        assert_eq!(extract_section(text, SectionLabel::RiskFlags), NOT_SPECIFIED);
        assert_eq!(extract_section("", SectionLabel::Parties), NOT_SPECIFIED);
    }

    #[test]
    fn test_markdown_numbered_output() {
        let sections = extract_sections(MARKDOWN_ANALYSIS, &SectionLabel::ALL);
        let values: Vec<&str> = sections.iter().map(|(_, v)| v.as_str()).collect();
        assert_eq!(
            values,
            vec![
                "Acme Corp (Discloser) and Beta LLC (Recipient)",
                "January 1, 2024",
                "Two years, renewing annually",
                "Business plans and customer lists",
                "- Recipient: keep information secret\n   - Return materials on request",
                "State of Delaware",
                "Perpetual confidentiality clause",
            ]
        );
    }

    #[test]
    fn test_sections_returned_in_label_order() {
        let labels = [SectionLabel::Jurisdiction, SectionLabel::Parties];
        let sections = extract_sections("Parties: A\nJurisdiction: B", &labels);
        assert_eq!(
            sections,
            vec![
                (SectionLabel::Jurisdiction, "B".to_string()),
                (SectionLabel::Parties, "A".to_string())
            ]
        );
    }

    #[test]
    fn test_label_is_case_insensitive_and_unanchored() {
        assert_eq!(extract_section("PARTIES: Acme", SectionLabel::Parties), "Acme");
        assert_eq!(
            extract_section("Summary of the parties: Acme", SectionLabel::Parties),
            "Acme"
        );
    }

    #[test]
    fn test_label_requires_word_boundary() {
        assert_eq!(extract_section("Terms: net 30", SectionLabel::Term), NOT_SPECIFIED);
        assert_eq!(extract_section("Midterm: x", SectionLabel::Term), NOT_SPECIFIED);
    }

    #[test]
    fn test_empty_body_is_not_specified() {
        let text = "Parties:\nJurisdiction: Delaware";
        assert_eq!(extract_section(text, SectionLabel::Parties), NOT_SPECIFIED);
    }

    #[test]
    fn test_lowercase_line_does_not_end_section() {
        let text = "Obligations: keep secrets\nnote: survives termination\nJurisdiction: NY";
        assert_eq!(
            extract_section(text, SectionLabel::Obligations),
            "keep secrets\nnote: survives termination"
        );
    }

    #[test]
    fn test_fallback_prefix_is_ignored() {
        let text = "(Fallback to gpt-3.5-turbo)\nParties: Acme\nTerm: 1 year";
        assert_eq!(extract_section(text, SectionLabel::Parties), "Acme");
        assert_eq!(extract_section(text, SectionLabel::Term), "1 year");
    }

    #[test]
    fn test_parenthetical_heading() {
        let text = "Effective Date (start, end, renewal terms): March 3, 2023\nTerm: 5 years";
        assert_eq!(
            extract_section(text, SectionLabel::EffectiveDate),
            "March 3, 2023"
        );
    }

    /// A first line followed by bullet or lowercase `note:` lines, none of
    /// which reads as a heading
    fn section_body() -> impl Strategy<Value = String> {
        let first = "[A-Za-z0-9][A-Za-z0-9 ,.]{0,40}[A-Za-z0-9.]";
        let continuation = prop_oneof![
            "- [a-z0-9][a-z0-9 ,.:]{0,30}[a-z0-9.]",
            "[a-z][a-z0-9 ,.]{0,20}: [a-z0-9]{1,10}",
        ];
        (first, proptest::collection::vec(continuation, 0..4)).prop_map(|(first, rest)| {
            std::iter::once(first)
                .chain(rest)
                .collect::<Vec<_>>()
                .join("\n")
        })
    }

    #[test]
    fn test_multiline_body_keeps_notes_and_bullets() {
        let text = concat!(
            "Obligations: Keep records\n",
            "- notify within 5 days\n",
            "note: see annex\n",
            "Term: 1 year"
        );
        assert_eq!(
            extract_section(text, SectionLabel::Obligations),
            "Keep records\n- notify within 5 days\nnote: see annex"
        );
    }

    proptest! {
        /// Re-extracting a value wrapped in its own heading returns the value
        #[test]
        fn extraction_is_idempotent(
            label in proptest::sample::select(SectionLabel::ALL.to_vec()),
            value in section_body(),
        ) {
            let first = extract_section(&format!("{}: {}", label, value), label);
            prop_assert_eq!(&first, &value);
            let second = extract_section(&format!("{}: {}", label, first), label);
            prop_assert_eq!(second, first);
        }

        /// Arbitrary input never panics and never yields an empty cell
        #[test]
        fn extraction_never_empty(text in "\\PC{0,200}") {
            for label in SectionLabel::ALL {
                prop_assert!(!extract_section(&text, label).is_empty());
            }
        }
    }
}
