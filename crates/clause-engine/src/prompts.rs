//! Prompt construction for document analysis and follow-up questions

use std::fmt::Write as _;

use shared_types::{Role, SectionLabel, NOT_SPECIFIED};

/// System prompt when no role is selected
pub const ANALYZER_SYSTEM_PROMPT: &str = "You are a precise legal document analyzer.";

/// A system prompt plus the instruction placed before the payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt {
    pub system: String,
    pub instruction: String,
}

impl Prompt {
    /// Structured analysis prompt asking for every label as a `Label:` heading.
    /// A role swaps in a system prompt written for that persona.
    pub fn analysis(role: Option<Role>) -> Self {
        let system = match role {
            Some(role) => format!(
                "You are a legal expert assisting a {}. Analyze the following legal content \
                 and extract relevant clauses or issues in bullet points.",
                role
            ),
            None => ANALYZER_SYSTEM_PROMPT.to_string(),
        };

        Self {
            system,
            instruction: section_instruction(&SectionLabel::ALL),
        }
    }

    /// Free-form question asked on behalf of `role`
    pub fn follow_up(role: Role, question: &str) -> Self {
        Self {
            system: format!("You are a helpful legal assistant for a {}.", role),
            instruction: format!(
                "As a {}, respond to the following legal question: {}",
                role,
                question.trim()
            ),
        }
    }

    /// User message for one document window: the instruction, a blank line,
    /// then the text
    pub fn user_message(&self, text: &str) -> String {
        format!("{}\n\n{}", self.instruction, text)
    }
}

/// Numbered list of the requested sections with formatting rules
pub fn section_instruction(labels: &[SectionLabel]) -> String {
    let mut instruction = String::from(
        "Analyze this legal PDF and produce a concise, structured result with these sections:\n",
    );
    for (i, label) in labels.iter().enumerate() {
        let _ = writeln!(instruction, "{}. {}", i + 1, label);
    }
    let _ = write!(
        instruction,
        "\nStart each section on its own line with the section name followed by a colon \
         (for example \"{}: ...\"). If any info is missing, write \"{}\".",
        labels.first().map_or("Parties", |l| l.as_str()),
        NOT_SPECIFIED
    );
    instruction
}
