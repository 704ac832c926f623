//! API handlers for the ClauseMatrix server
//!
//! Provides REST endpoints for:
//! - Single-document analysis
//! - Multi-document comparison
//! - Follow-up questions
//! - Word and Excel exports

use axum::{
    extract::{Multipart, State},
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use clause_engine::{extract_sections, sample_questions, ComparisonMatrix};
use office_export::{DOCX_FILENAME, MATRIX_FILENAME, XLSX_FILENAME};
use serde::{Deserialize, Serialize};
use shared_pdf::ExtractOptions;
use shared_types::{AnalysisRecord, DocumentOutcome, DocumentReport, Role, SectionLabel};
use tracing::{debug, info};

use crate::error::ServerError;
use crate::pipeline::{self, BatchOptions, BatchReport};
use crate::upload::UploadForm;
use crate::AppState;

const DOCX_MIME: &str = "application/vnd.openxmlformats-officedocument.wordprocessingml.document";
const XLSX_MIME: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

/// Health check response
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
    pub version: &'static str,
}

/// Handler: GET /health
pub async fn handle_health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        service: "clausematrix-server",
        version: env!("CARGO_PKG_VERSION"),
    })
}

#[derive(Serialize)]
pub struct SectionInfo {
    pub id: SectionLabel,
    pub label: &'static str,
}

#[derive(Serialize)]
pub struct SectionListResponse {
    pub success: bool,
    pub sections: Vec<SectionInfo>,
}

/// Handler: GET /api/sections
pub async fn handle_list_sections() -> Json<SectionListResponse> {
    Json(SectionListResponse {
        success: true,
        sections: SectionLabel::ALL
            .iter()
            .map(|label| SectionInfo {
                id: *label,
                label: label.as_str(),
            })
            .collect(),
    })
}

#[derive(Serialize)]
pub struct RoleInfo {
    pub id: Role,
    pub name: &'static str,
    pub sample_questions: &'static [&'static str],
}

#[derive(Serialize)]
pub struct RoleListResponse {
    pub success: bool,
    pub roles: Vec<RoleInfo>,
}

/// Handler: GET /api/roles
pub async fn handle_list_roles() -> Json<RoleListResponse> {
    Json(RoleListResponse {
        success: true,
        roles: Role::ALL
            .iter()
            .map(|role| RoleInfo {
                id: *role,
                name: role.display_name(),
                sample_questions: sample_questions(*role),
            })
            .collect(),
    })
}

/// One parsed section of an analysis
#[derive(Serialize)]
pub struct SectionValue {
    pub label: SectionLabel,
    pub value: String,
}

/// Single-document analysis response
#[derive(Serialize)]
pub struct AnalyzeResponse {
    pub success: bool,
    #[serde(flatten)]
    pub report: DocumentReport,
    /// Parsed sections, empty unless the document was analyzed
    pub sections: Vec<SectionValue>,
}

/// Handler: POST /api/analyze
pub async fn handle_analyze(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<AnalyzeResponse>, ServerError> {
    let form = UploadForm::read(multipart).await?;
    form.expect_files(1, 1)?;
    let options = batch_options(&state, &form);

    let Some(document) = form.files.into_iter().next() else {
        return Err(ServerError::InvalidRequest("No PDF file uploaded".to_string()));
    };
    info!("Analyze request: file={}, role={:?}", document.filename, options.role);

    let prompt = clause_engine::Prompt::analysis(options.role);
    let report = pipeline::analyze_document(
        &state.requester,
        &state.pipeline,
        document,
        &prompt,
        options.extract,
    )
    .await;

    let sections = match &report.outcome {
        DocumentOutcome::Analyzed { analysis, .. } => extract_sections(analysis, &SectionLabel::ALL)
            .into_iter()
            .map(|(label, value)| SectionValue { label, value })
            .collect(),
        DocumentOutcome::Unreadable { .. } => Vec::new(),
        DocumentOutcome::Failed { error } => {
            return Err(ServerError::AnalysisFailed {
                filename: report.filename.clone(),
                message: error.clone(),
            });
        }
    };

    Ok(Json(AnalyzeResponse {
        success: true,
        report,
        sections,
    }))
}

/// Multi-document comparison response
#[derive(Serialize)]
pub struct CompareResponse {
    pub success: bool,
    #[serde(flatten)]
    pub batch: BatchReport,
    pub matrix: ComparisonMatrix,
}

/// Handler: POST /api/compare
pub async fn handle_compare(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<CompareResponse>, ServerError> {
    let form = UploadForm::read(multipart).await?;
    form.expect_files(2, usize::MAX)?;
    let options = batch_options(&state, &form);

    info!(
        "Compare request: {} files, role={:?}, policy={}",
        form.files.len(),
        options.role,
        options.policy
    );

    let batch = pipeline::run_batch(&state.requester, &state.pipeline, form.files, &options).await?;
    let matrix = ComparisonMatrix::build(&SectionLabel::ALL, &batch.records());
    debug!("Matrix built, raw fallback: {}", matrix.is_fallback());

    Ok(Json(CompareResponse {
        success: true,
        batch,
        matrix,
    }))
}

fn batch_options(state: &AppState, form: &UploadForm) -> BatchOptions {
    BatchOptions {
        role: form.role,
        extract: ExtractOptions {
            include_form_fields: form.include_form_fields,
        },
        policy: form.error_policy.unwrap_or(state.default_policy),
    }
}

/// Follow-up question request body
#[derive(Deserialize)]
pub struct AskRequest {
    /// Role id or display name
    pub role: String,
    pub question: String,
}

#[derive(Serialize)]
pub struct AskResponse {
    pub success: bool,
    pub role: Role,
    pub answer: String,
}

/// Handler: POST /api/ask
pub async fn handle_ask(
    State(state): State<AppState>,
    Json(req): Json<AskRequest>,
) -> Result<Json<AskResponse>, ServerError> {
    let role: Role = req.role.parse()?;
    let question = req.question.trim();
    if question.is_empty() {
        return Err(ServerError::InvalidRequest("Question is empty".to_string()));
    }

    info!("Ask request: role={}", role);
    let answer = state.requester.ask(role, question).await?;

    Ok(Json(AskResponse {
        success: true,
        role,
        answer,
    }))
}

/// Export request body: filename and analysis text pairs
#[derive(Deserialize)]
pub struct ExportRequest {
    pub results: Vec<AnalysisRecord>,
}

impl ExportRequest {
    fn into_records(self) -> Result<Vec<AnalysisRecord>, ServerError> {
        if self.results.is_empty() {
            return Err(ServerError::InvalidRequest(
                "Nothing to export, results are empty".to_string(),
            ));
        }
        Ok(self.results)
    }
}

/// Handler: POST /api/export/docx
pub async fn handle_export_docx(Json(req): Json<ExportRequest>) -> Result<Response, ServerError> {
    let records = req.into_records()?;
    let bytes = office_export::analysis_docx(&records)?;
    Ok(attachment(bytes, DOCX_MIME, DOCX_FILENAME))
}

/// Handler: POST /api/export/xlsx
pub async fn handle_export_xlsx(Json(req): Json<ExportRequest>) -> Result<Response, ServerError> {
    let records = req.into_records()?;
    let bytes = office_export::analysis_xlsx(&records)?;
    Ok(attachment(bytes, XLSX_MIME, XLSX_FILENAME))
}

/// Handler: POST /api/export/matrix
pub async fn handle_export_matrix(Json(req): Json<ExportRequest>) -> Result<Response, ServerError> {
    let records = req.into_records()?;
    let matrix = ComparisonMatrix::build(&SectionLabel::ALL, &records);
    let bytes = office_export::matrix_xlsx(&matrix)?;
    Ok(attachment(bytes, XLSX_MIME, MATRIX_FILENAME))
}

fn attachment(bytes: Vec<u8>, mime: &'static str, filename: &'static str) -> Response {
    (
        [
            (header::CONTENT_TYPE, mime.to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", filename),
            ),
        ],
        bytes,
    )
        .into_response()
}
