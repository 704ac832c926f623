//! Regex patterns for locating section headings in model output

use std::collections::HashMap;

use lazy_static::lazy_static;
use regex::Regex;
use shared_types::SectionLabel;

lazy_static! {
    /// Start of a line that reads as the next heading: optional markdown
    /// heading marker or list number, optional emphasis, then a capitalized
    /// word sequence (optionally with a parenthetical) and a colon.
    ///
    /// Case-sensitive on the leading capital so lowercase prose such as
    /// `note: ...` does not end a section. Bulleted `- Name:` lines are
    /// list items, not headings.
    pub static ref HEADING_BOUNDARY: Regex = Regex::new(
        r"\n[ \t]*(?:#+[ \t]*)?(?:\d+[.)][ \t]*)?\**[A-Z][A-Za-z ]+(?:\([^)\n]*\))?[ \t]*\**[ \t]*:"
    ).unwrap();

    /// Compiled heading patterns for the fixed section labels
    static ref LABEL_PATTERNS: HashMap<SectionLabel, Regex> = SectionLabel::ALL
        .iter()
        .map(|label| (*label, heading_pattern(label.as_str())))
        .collect();
}

/// Pattern matching `label` as a heading: case-insensitive, on a word
/// boundary, anywhere in the text, followed by emphasis markers and a colon.
///
/// Whitespace inside the label matches any whitespace run, and a short
/// parenthetical after the label (`Term (duration):`) is tolerated.
fn heading_pattern(label: &str) -> Regex {
    let words: Vec<String> = label.split_whitespace().map(regex::escape).collect();
    let pattern = format!(
        r"(?i)\b{}\b[ \t]*(?:\([^)\n]*\))?[ \t]*\**[ \t]*:\**",
        words.join(r"\s+")
    );
    // Every label fragment is escaped, so the pattern is always valid
    Regex::new(&pattern).unwrap()
}

/// Cached heading pattern of a fixed label
pub fn label_pattern(label: SectionLabel) -> &'static Regex {
    &LABEL_PATTERNS[&label]
}
