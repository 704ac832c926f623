//! Batch analysis pipeline
//!
//! Documents run concurrently up to a worker limit and each one is bounded
//! by a timeout. Reports come back in upload order whatever the completion
//! order was. Extraction problems are recorded as unreadable documents;
//! analysis failures either stay with their document (best effort) or
//! abort the batch (fail fast).

use std::time::Duration;

use chrono::{DateTime, Utc};
use clause_engine::Prompt;
use futures::stream::{self, StreamExt};
use inference_client::AnalysisRequester;
use serde::Serialize;
use shared_pdf::{ExtractOptions, PdfExtractor};
use shared_types::{
    AnalysisRecord, DocumentOutcome, DocumentReport, ErrorPolicy, Role, UploadedDocument,
    EMPTY_DOCUMENT_RESULT,
};
use thiserror::Error;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

pub const DEFAULT_CONCURRENCY: usize = 4;
pub const DEFAULT_DOCUMENT_TIMEOUT_SECS: u64 = 180;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PipelineConfig {
    /// Documents analyzed at the same time
    pub concurrency: usize,
    /// Upper bound on extraction plus analysis of one document
    pub document_timeout: Duration,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            concurrency: DEFAULT_CONCURRENCY,
            document_timeout: Duration::from_secs(DEFAULT_DOCUMENT_TIMEOUT_SECS),
        }
    }
}

/// Per-request options of a batch
#[derive(Debug, Clone, Copy, Default)]
pub struct BatchOptions {
    pub role: Option<Role>,
    pub extract: ExtractOptions,
    pub policy: ErrorPolicy,
}

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Analysis of '{filename}' failed: {message}")]
    DocumentFailed { filename: String, message: String },
}

/// Outcome of a whole batch, documents in upload order
#[derive(Debug, Clone, Serialize)]
pub struct BatchReport {
    pub batch_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub error_policy: ErrorPolicy,
    pub succeeded: usize,
    pub failed: usize,
    pub documents: Vec<DocumentReport>,
}

impl BatchReport {
    /// Display text of every document, the input of the matrix and exports
    pub fn records(&self) -> Vec<AnalysisRecord> {
        self.documents.iter().map(AnalysisRecord::from).collect()
    }
}

/// Analyze every document and collect the reports in input order.
///
/// # Errors
/// Only under [`ErrorPolicy::FailFast`]: the first document (in input
/// order) whose analysis failed aborts the batch. Work still in flight is
/// dropped.
#[instrument(skip_all, fields(documents = documents.len(), policy = %options.policy))]
pub async fn run_batch(
    requester: &AnalysisRequester,
    config: &PipelineConfig,
    documents: Vec<UploadedDocument>,
    options: &BatchOptions,
) -> Result<BatchReport, PipelineError> {
    let prompt = Prompt::analysis(options.role);
    let total = documents.len();

    let mut reports = stream::iter(
        documents
            .into_iter()
            .map(|doc| analyze_document(requester, config, doc, &prompt, options.extract)),
    )
    .buffered(config.concurrency.max(1));

    let mut documents = Vec::with_capacity(total);
    while let Some(report) = reports.next().await {
        if options.policy == ErrorPolicy::FailFast {
            if let DocumentOutcome::Failed { error } = &report.outcome {
                warn!("Aborting batch on '{}': {}", report.filename, error);
                return Err(PipelineError::DocumentFailed {
                    filename: report.filename,
                    message: error.clone(),
                });
            }
        }
        documents.push(report);
    }

    let failed = documents.iter().filter(|d| d.outcome.is_failed()).count();
    let report = BatchReport {
        batch_id: Uuid::new_v4(),
        created_at: Utc::now(),
        error_policy: options.policy,
        succeeded: documents.len() - failed,
        failed,
        documents,
    };

    info!(
        "Batch {} done: {} succeeded, {} failed",
        report.batch_id, report.succeeded, report.failed
    );
    Ok(report)
}

/// Extract and analyze one document within the configured timeout
pub async fn analyze_document(
    requester: &AnalysisRequester,
    config: &PipelineConfig,
    document: UploadedDocument,
    prompt: &Prompt,
    extract: ExtractOptions,
) -> DocumentReport {
    let filename = document.filename.clone();
    let timeout = config.document_timeout;

    let work = process(requester, document, prompt, extract);
    let outcome = match tokio::time::timeout(timeout, work).await {
        Ok(outcome) => outcome,
        Err(_) => {
            warn!("'{}' timed out after {:?}", filename, timeout);
            DocumentOutcome::Failed {
                error: format!("timed out after {} ms", timeout.as_millis()),
            }
        }
    };

    if let DocumentOutcome::Failed { error } = &outcome {
        warn!("Analysis of '{}' failed: {}", filename, error);
    }

    DocumentReport { filename, outcome }
}

async fn process(
    requester: &AnalysisRequester,
    document: UploadedDocument,
    prompt: &Prompt,
    extract: ExtractOptions,
) -> DocumentOutcome {
    let UploadedDocument { filename, bytes } = document;
    debug!("Extracting '{}' ({} bytes)", filename, bytes.len());

    let extracted =
        tokio::task::spawn_blocking(move || PdfExtractor::extract_document(&bytes, &extract))
            .await;

    let extracted = match extracted {
        Ok(Ok(extracted)) => extracted,
        Ok(Err(e)) => {
            warn!("'{}' is unreadable: {}", filename, e);
            return DocumentOutcome::Unreadable {
                message: e.to_string(),
            };
        }
        Err(e) => {
            warn!("Extraction of '{}' aborted: {}", filename, e);
            return DocumentOutcome::Unreadable {
                message: format!("Extraction aborted: {}", e),
            };
        }
    };

    if extracted.is_blank() {
        debug!("'{}' has no text on {} pages", filename, extracted.page_count);
        return DocumentOutcome::Unreadable {
            message: EMPTY_DOCUMENT_RESULT.to_string(),
        };
    }

    match requester.analyze(&extracted.text, prompt).await {
        Ok(output) => DocumentOutcome::Analyzed {
            analysis: output.text,
            degraded: output.degraded,
            windows: output.windows,
        },
        Err(e) => DocumentOutcome::Failed {
            error: e.to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use inference_client::mock::MockBackend;
    use inference_client::{InferenceError, RequesterConfig};
    use pretty_assertions::assert_eq;
    use shared_pdf::fixtures;
    use std::sync::Arc;

    fn requester(backend: MockBackend) -> (AnalysisRequester, Arc<MockBackend>) {
        let backend = Arc::new(backend);
        (
            AnalysisRequester::new(backend.clone(), RequesterConfig::default()),
            backend,
        )
    }

    /// Fails any document whose text mentions BROKEN
    fn selective_backend() -> MockBackend {
        MockBackend::new(|request| {
            if request.user_content().contains("BROKEN") {
                Err(InferenceError::from_status(500, "upstream down"))
            } else {
                Ok("Parties: Acme".to_string())
            }
        })
    }

    fn doc(name: &str, text: &str) -> UploadedDocument {
        UploadedDocument::new(name, fixtures::text_pdf(&[text]))
    }

    #[tokio::test]
    async fn test_reports_keep_input_order() {
        let (requester, _) = requester(MockBackend::new(|request| {
            Ok(format!("Parties: {}", request.user_content().rsplit("\n\n").next().unwrap_or("")))
        }));
        let config = PipelineConfig {
            concurrency: 3,
            ..PipelineConfig::default()
        };
        let docs: Vec<_> = (0..6)
            .map(|i| doc(&format!("doc{}.pdf", i), &format!("Body{}", i)))
            .collect();

        let report = run_batch(&requester, &config, docs, &BatchOptions::default())
            .await
            .unwrap();

        let names: Vec<_> = report.documents.iter().map(|d| d.filename.as_str()).collect();
        let expected: Vec<String> = (0..6).map(|i| format!("doc{}.pdf", i)).collect();
        assert_eq!(names, expected);
        for (i, record) in report.records().iter().enumerate() {
            assert!(record.analysis.contains(&format!("Body{}", i)));
        }
        assert_eq!((report.succeeded, report.failed), (6, 0));
    }

    #[tokio::test]
    async fn test_best_effort_records_failures() {
        let (requester, _) = requester(selective_backend());
        let docs = vec![doc("ok.pdf", "Fine text"), doc("bad.pdf", "BROKEN text")];

        let report = run_batch(
            &requester,
            &PipelineConfig::default(),
            docs,
            &BatchOptions::default(),
        )
        .await
        .unwrap();

        assert_eq!((report.succeeded, report.failed), (1, 1));
        assert!(report.documents[0].outcome.is_analyzed());
        assert!(report.documents[1].outcome.is_failed());
        assert!(report.records()[1].analysis.starts_with("Analysis failed:"));
    }

    #[tokio::test]
    async fn test_fail_fast_aborts_on_first_failure() {
        let (requester, _) = requester(selective_backend());
        let docs = vec![
            doc("ok.pdf", "Fine text"),
            doc("bad.pdf", "BROKEN text"),
            doc("later.pdf", "BROKEN again"),
        ];
        let options = BatchOptions {
            policy: ErrorPolicy::FailFast,
            ..BatchOptions::default()
        };

        let err = run_batch(&requester, &PipelineConfig::default(), docs, &options)
            .await
            .unwrap_err();
        let PipelineError::DocumentFailed { filename, message } = err;
        assert_eq!(filename, "bad.pdf");
        assert!(message.contains("upstream down"));
    }

    #[tokio::test]
    async fn test_unreadable_documents_never_abort() {
        let (requester, backend) = requester(MockBackend::fixed("Parties: Acme"));
        let docs = vec![
            UploadedDocument::new("garbage.pdf", b"%PDF-1.4 not really".to_vec()),
            UploadedDocument::new("blank.pdf", fixtures::blank_pdf(2)),
            doc("good.pdf", "Agreement"),
        ];
        let options = BatchOptions {
            policy: ErrorPolicy::FailFast,
            ..BatchOptions::default()
        };

        let report = run_batch(&requester, &PipelineConfig::default(), docs, &options)
            .await
            .unwrap();

        assert!(matches!(report.documents[0].outcome, DocumentOutcome::Unreadable { .. }));
        assert_eq!(
            report.documents[1].outcome,
            DocumentOutcome::Unreadable {
                message: EMPTY_DOCUMENT_RESULT.to_string()
            }
        );
        assert!(report.documents[2].outcome.is_analyzed());
        assert_eq!(report.failed, 0);
        assert_eq!(backend.call_count(), 1);
    }

    #[tokio::test]
    async fn test_timeout_becomes_failed_outcome() {
        let (requester, _) =
            requester(MockBackend::fixed("late").with_delay(Duration::from_millis(500)));
        let config = PipelineConfig {
            concurrency: 2,
            document_timeout: Duration::from_millis(50),
        };

        let docs = vec![doc("slow.pdf", "Text")];
        let report = run_batch(&requester, &config, docs, &BatchOptions::default())
            .await
            .unwrap();

        let DocumentOutcome::Failed { error } = &report.documents[0].outcome else {
            panic!("expected timeout failure");
        };
        assert!(error.contains("timed out"));
    }

    #[tokio::test]
    async fn test_role_reaches_system_prompt() {
        let (requester, backend) = requester(MockBackend::fixed("ok"));
        let options = BatchOptions {
            role: Some(Role::Paralegal),
            ..BatchOptions::default()
        };
        run_batch(&requester, &PipelineConfig::default(), vec![doc("a.pdf", "Text")], &options)
            .await
            .unwrap();
        assert!(backend.requests()[0].messages[0].content.contains("Paralegal"));
    }

    #[tokio::test]
    async fn test_empty_batch() {
        let (requester, _) = requester(MockBackend::fixed("unused"));
        let report = run_batch(
            &requester,
            &PipelineConfig::default(),
            Vec::new(),
            &BatchOptions::default(),
        )
        .await
        .unwrap();
        assert!(report.documents.is_empty());
        assert_eq!(report.error_policy, ErrorPolicy::BestEffort);
    }
}
