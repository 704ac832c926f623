//! PDF text extraction
//!
//! Produces the plain text the analysis pipeline works on:
//! - page texts concatenated in page order
//! - pages that cannot be decoded contribute nothing instead of failing
//! - an optional `Form Fields:` block listing AcroForm values
//! - surrounding whitespace trimmed, so a blank document yields `""`
//!
//! `pdf-extract` is the primary engine since it handles CID fonts and
//! ToUnicode maps. It panics on some malformed input, so calls run inside
//! `catch_unwind` and fall back to lopdf's per-page extraction.

use std::fmt::Write as _;
use std::panic::{self, AssertUnwindSafe};

use lopdf::Document;
use tracing::{debug, warn};

use crate::error::PdfError;
use crate::forms::{form_fields, FormField};

/// Heading that introduces the form field block
pub const FORM_FIELDS_HEADING: &str = "Form Fields:";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExtractOptions {
    /// Append AcroForm field names and values after the body text
    pub include_form_fields: bool,
}

impl ExtractOptions {
    pub fn with_form_fields() -> Self {
        Self {
            include_form_fields: true,
        }
    }
}

/// Extraction result with the structure the text was assembled from
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractedDocument {
    /// Normalized text, empty when the document carries no text at all
    pub text: String,
    pub page_count: usize,
    pub form_fields: Vec<FormField>,
}

impl ExtractedDocument {
    pub fn is_blank(&self) -> bool {
        self.text.is_empty()
    }
}

/// Main PDF extraction interface
pub struct PdfExtractor;

impl PdfExtractor {
    /// Extract normalized text from PDF bytes.
    ///
    /// # Errors
    /// Only whole-document failures are reported: empty input, bytes that do
    /// not parse as a PDF, or an encrypted document that needs a user password.
    pub fn extract_text(pdf_bytes: &[u8], options: &ExtractOptions) -> Result<String, PdfError> {
        Self::extract_document(pdf_bytes, options).map(|doc| doc.text)
    }

    /// Extract text together with page count and form fields
    pub fn extract_document(
        pdf_bytes: &[u8],
        options: &ExtractOptions,
    ) -> Result<ExtractedDocument, PdfError> {
        let doc = load_document(pdf_bytes)?;
        let pages = page_texts(pdf_bytes, &doc);
        let page_count = doc.get_pages().len();

        let mut text = pages.concat();

        let fields = if options.include_form_fields {
            form_fields(&doc)
        } else {
            Vec::new()
        };

        if !fields.is_empty() {
            text.push_str("\n\n");
            text.push_str(FORM_FIELDS_HEADING);
            text.push('\n');
            for field in &fields {
                // Writing to a String cannot fail
                let _ = writeln!(text, "{}: {}", field.name, field.value);
            }
        }

        let text = text.trim().to_string();
        debug!(
            "Extracted {} chars from {} pages ({} form fields)",
            text.len(),
            page_count,
            fields.len()
        );

        Ok(ExtractedDocument {
            text,
            page_count,
            form_fields: fields,
        })
    }

    /// Number of pages, or an error if the document does not load
    pub fn page_count(pdf_bytes: &[u8]) -> Result<usize, PdfError> {
        Ok(load_document(pdf_bytes)?.get_pages().len())
    }

    /// Form fields of the document without extracting body text
    pub fn extract_form_fields(pdf_bytes: &[u8]) -> Result<Vec<FormField>, PdfError> {
        Ok(form_fields(&load_document(pdf_bytes)?))
    }
}

fn load_document(pdf_bytes: &[u8]) -> Result<Document, PdfError> {
    if pdf_bytes.is_empty() {
        return Err(PdfError::Empty);
    }

    let mut doc = Document::load_mem(pdf_bytes).map_err(|e| {
        let message = e.to_string();
        let lower = message.to_lowercase();
        if lower.contains("encrypt") || lower.contains("password") {
            PdfError::PasswordProtected
        } else {
            PdfError::InvalidPdf(message)
        }
    })?;

    // Permission-restricted documents open with the empty user password
    if doc.is_encrypted() {
        doc.decrypt("").map_err(|e| {
            debug!("Empty-password decryption failed: {}", e);
            PdfError::PasswordProtected
        })?;
    }

    Ok(doc)
}

/// Text of every page in page order
fn page_texts(pdf_bytes: &[u8], doc: &Document) -> Vec<String> {
    let result = panic::catch_unwind(AssertUnwindSafe(|| {
        pdf_extract::extract_text_from_mem_by_pages(pdf_bytes)
    }));

    match result {
        Ok(Ok(pages)) => pages,
        Ok(Err(e)) => {
            warn!("pdf-extract failed ({}), falling back to per-page lopdf extraction", e);
            lopdf_page_texts(doc)
        }
        Err(_) => {
            warn!("pdf-extract panicked, falling back to per-page lopdf extraction");
            lopdf_page_texts(doc)
        }
    }
}

fn lopdf_page_texts(doc: &Document) -> Vec<String> {
    doc.get_pages()
        .keys()
        .map(|&page_number| match doc.extract_text(&[page_number]) {
            Ok(text) => text,
            Err(e) => {
                debug!("Page {} yielded no text: {}", page_number, e);
                String::new()
            }
        })
        .collect()
}
