//! Word and Excel downloads of analysis results
//!
//! Exports are built in memory and returned as bytes; nothing touches disk.

pub mod docx;
pub mod error;
pub mod xlsx;

pub use docx::analysis_docx;
pub use error::ExportError;
pub use xlsx::{analysis_rows, analysis_xlsx, matrix_xlsx};

/// Download name of the per-file Word export
pub const DOCX_FILENAME: &str = "Clause_Summary.docx";
/// Download name of the per-file Excel export
pub const XLSX_FILENAME: &str = "Clause_Summary.xlsx";
/// Download name of the comparison matrix export
pub const MATRIX_FILENAME: &str = "comparison.xlsx";
