//! Shared PDF handling utilities
//!
//! Turns uploaded PDF bytes into the normalized plain text the analysis
//! pipeline sends upstream, optionally followed by the document's
//! interactive form fields.

pub mod error;
pub mod extract;
#[cfg(any(test, feature = "fixtures"))]
pub mod fixtures;
pub mod forms;
pub mod text;

pub use error::PdfError;
pub use extract::{ExtractOptions, ExtractedDocument, PdfExtractor};
pub use forms::FormField;
