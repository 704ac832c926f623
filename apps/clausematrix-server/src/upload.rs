//! Multipart upload parsing and validation

use axum::extract::Multipart;
use shared_types::{ErrorPolicy, Role, UploadedDocument};
use tracing::debug;

use crate::error::ServerError;

const PDF_MAGIC: &[u8] = b"%PDF";

/// Fields of an analyze or compare upload
#[derive(Debug, Default)]
pub struct UploadForm {
    pub files: Vec<UploadedDocument>,
    pub role: Option<Role>,
    pub include_form_fields: bool,
    pub error_policy: Option<ErrorPolicy>,
}

impl UploadForm {
    /// Read every part of the request.
    ///
    /// File parts (`file` or `files`) must carry a filename, look like a PDF
    /// and have a filename not used earlier in the same upload.
    pub async fn read(mut multipart: Multipart) -> Result<Self, ServerError> {
        let mut form = UploadForm::default();

        while let Some(field) = multipart.next_field().await? {
            let name = field.name().map(str::to_string);
            match name.as_deref() {
                Some("file") | Some("files") => {
                    let filename = field
                        .file_name()
                        .map(str::to_string)
                        .filter(|n| !n.trim().is_empty())
                        .ok_or_else(|| {
                            ServerError::InvalidRequest("File part has no filename".to_string())
                        })?;
                    let content_type = field.content_type().map(str::to_string);
                    let bytes = field.bytes().await?;

                    if !looks_like_pdf(content_type.as_deref(), &bytes) {
                        return Err(ServerError::InvalidRequest(format!(
                            "'{}' is not a PDF",
                            filename
                        )));
                    }
                    if form.files.iter().any(|f| f.filename == filename) {
                        return Err(ServerError::InvalidRequest(format!(
                            "Duplicate filename '{}' in upload",
                            filename
                        )));
                    }

                    debug!("Received '{}' ({} bytes)", filename, bytes.len());
                    form.files.push(UploadedDocument::new(filename, bytes.to_vec()));
                }
                Some("role") => {
                    let value = field.text().await?;
                    if !value.trim().is_empty() {
                        form.role = Some(value.parse()?);
                    }
                }
                Some("include_form_fields") => {
                    form.include_form_fields = parse_flag(&field.text().await?)?;
                }
                Some("error_policy") => {
                    let value = field.text().await?;
                    if !value.trim().is_empty() {
                        form.error_policy = Some(value.parse()?);
                    }
                }
                other => debug!("Ignoring multipart field {:?}", other),
            }
        }

        Ok(form)
    }

    /// Fail unless the upload holds between `min` and `max` files
    pub fn expect_files(&self, min: usize, max: usize) -> Result<(), ServerError> {
        let count = self.files.len();
        if count < min || count > max {
            let expected = if min == max {
                format!("exactly {}", min)
            } else {
                format!("at least {}", min)
            };
            return Err(ServerError::InvalidRequest(format!(
                "Expected {} PDF file(s), got {}",
                expected, count
            )));
        }
        Ok(())
    }
}

/// Declared as a PDF or starting with the PDF header
pub fn looks_like_pdf(content_type: Option<&str>, bytes: &[u8]) -> bool {
    let declared = content_type
        .map(|ct| ct.split(';').next().unwrap_or("").trim().eq_ignore_ascii_case("application/pdf"))
        .unwrap_or(false);
    declared || bytes.starts_with(PDF_MAGIC)
}

/// Parse a checkbox-style form value
pub fn parse_flag(value: &str) -> Result<bool, ServerError> {
    match value.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" | "" => Ok(false),
        other => Err(ServerError::InvalidRequest(format!(
            "Invalid boolean '{}'",
            other
        ))),
    }
}
