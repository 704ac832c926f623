//! Error types for the ClauseMatrix server

use axum::{
    extract::multipart::MultipartError,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use inference_client::InferenceError;
use office_export::ExportError;
use serde::Serialize;
use shared_types::ParseError;
use thiserror::Error;
use tracing::error;

use crate::pipeline::PipelineError;

/// Server error types
#[derive(Error, Debug)]
pub enum ServerError {
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Upload exceeds the size limit")]
    PayloadTooLarge,

    #[error("Analysis of '{filename}' failed: {message}")]
    AnalysisFailed { filename: String, message: String },

    #[error("Batch aborted: analysis of '{filename}' failed: {message}")]
    BatchAborted { filename: String, message: String },

    #[error("Text generation failed: {0}")]
    Upstream(#[from] InferenceError),

    #[error("Export failed: {0}")]
    Export(#[from] ExportError),
}

/// Error response body
#[derive(Serialize)]
struct ErrorResponse {
    success: bool,
    error: String,
    code: String,
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let (status, code) = match &self {
            ServerError::InvalidRequest(_) => (StatusCode::BAD_REQUEST, "INVALID_REQUEST"),
            ServerError::PayloadTooLarge => (StatusCode::PAYLOAD_TOO_LARGE, "PAYLOAD_TOO_LARGE"),
            ServerError::AnalysisFailed { .. } => (StatusCode::BAD_GATEWAY, "ANALYSIS_FAILED"),
            ServerError::BatchAborted { .. } => (StatusCode::BAD_GATEWAY, "BATCH_ABORTED"),
            ServerError::Upstream(_) => (StatusCode::BAD_GATEWAY, "UPSTREAM_ERROR"),
            ServerError::Export(_) => (StatusCode::INTERNAL_SERVER_ERROR, "EXPORT_ERROR"),
        };

        if status.is_server_error() {
            error!("{}", self);
        }

        let body = ErrorResponse {
            success: false,
            error: self.to_string(),
            code: code.to_string(),
        };

        (status, Json(body)).into_response()
    }
}

impl From<ParseError> for ServerError {
    fn from(err: ParseError) -> Self {
        ServerError::InvalidRequest(err.to_string())
    }
}

impl From<MultipartError> for ServerError {
    fn from(err: MultipartError) -> Self {
        if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
            ServerError::PayloadTooLarge
        } else {
            ServerError::InvalidRequest(format!("Multipart error: {}", err.body_text()))
        }
    }
}

impl From<PipelineError> for ServerError {
    fn from(err: PipelineError) -> Self {
        match err {
            PipelineError::DocumentFailed { filename, message } => {
                ServerError::BatchAborted { filename, message }
            }
        }
    }
}
