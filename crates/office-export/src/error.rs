use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("Failed to write Word document: {0}")]
    Docx(String),

    #[error("Failed to write spreadsheet: {0}")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),
}
