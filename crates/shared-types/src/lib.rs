pub mod outcome;
pub mod types;

pub use outcome::{AnalysisRecord, DocumentOutcome, DocumentReport, UploadedDocument};
pub use types::{
    ErrorPolicy, ParseError, Role, SectionLabel, EMPTY_DOCUMENT_RESULT, NOT_SPECIFIED,
};
