use thiserror::Error;

/// Whole-document extraction failures. Page-level problems never surface here.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PdfError {
    #[error("PDF is empty")]
    Empty,

    #[error("Invalid PDF: {0}")]
    InvalidPdf(String),

    #[error("PDF is password protected")]
    PasswordProtected,
}
