//! Per-document results flowing through the analysis pipeline

use serde::{Deserialize, Serialize};

/// A PDF received from the client. Bytes are never persisted.
#[derive(Debug, Clone)]
pub struct UploadedDocument {
    pub filename: String,
    pub bytes: Vec<u8>,
}

impl UploadedDocument {
    pub fn new(filename: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            filename: filename.into(),
            bytes,
        }
    }
}

/// What happened to one document of a batch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum DocumentOutcome {
    Analyzed {
        analysis: String,
        /// True when the fallback model produced some or all of the text
        degraded: bool,
        /// Number of requests the document was split into
        windows: usize,
    },
    /// The PDF could not be read or contained no text
    Unreadable { message: String },
    /// The text-generation request failed
    Failed { error: String },
}

impl DocumentOutcome {
    /// Text shown for the document in tables and exports
    pub fn display_text(&self) -> String {
        match self {
            DocumentOutcome::Analyzed { analysis, .. } => analysis.clone(),
            DocumentOutcome::Unreadable { message } => message.clone(),
            DocumentOutcome::Failed { error } => format!("Analysis failed: {}", error),
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, DocumentOutcome::Failed { .. })
    }

    pub fn is_analyzed(&self) -> bool {
        matches!(self, DocumentOutcome::Analyzed { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentReport {
    pub filename: String,
    #[serde(flatten)]
    pub outcome: DocumentOutcome,
}

/// Filename and analysis text pair, the unit of every export
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisRecord {
    pub filename: String,
    pub analysis: String,
}

impl AnalysisRecord {
    pub fn new(filename: impl Into<String>, analysis: impl Into<String>) -> Self {
        Self {
            filename: filename.into(),
            analysis: analysis.into(),
        }
    }
}

impl From<&DocumentReport> for AnalysisRecord {
    fn from(report: &DocumentReport) -> Self {
        Self {
            filename: report.filename.clone(),
            analysis: report.outcome.display_text(),
        }
    }
}
