//! Document analysis on top of a completion backend
//!
//! Every request goes to the primary model first. A capacity error
//! (rate limit or overload) is retried exactly once on the fallback model
//! and the result is marked with a `(Fallback to <model>)` line. Any other
//! error, and a failing fallback, propagates to the caller.

use std::sync::Arc;

use clause_engine::chunking::{needs_chunking, split_windows, DEFAULT_WINDOW_CHARS};
use clause_engine::Prompt;
use shared_types::{Role, EMPTY_DOCUMENT_RESULT};
use tracing::{debug, instrument, warn};

use crate::backend::CompletionBackend;
use crate::error::InferenceError;
use crate::types::ChatCompletionRequest;

pub const DEFAULT_PRIMARY_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_PRIMARY_TEMPERATURE: f32 = 0.2;
pub const DEFAULT_FALLBACK_MODEL: &str = "gpt-3.5-turbo";
pub const DEFAULT_FALLBACK_TEMPERATURE: f32 = 0.3;

#[derive(Debug, Clone, PartialEq)]
pub struct ModelSettings {
    pub model: String,
    pub temperature: f32,
}

impl ModelSettings {
    pub fn new(model: impl Into<String>, temperature: f32) -> Self {
        Self {
            model: model.into(),
            temperature,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RequesterConfig {
    pub primary: ModelSettings,
    pub fallback: ModelSettings,
    /// Window size in characters for oversized documents
    pub window_chars: usize,
    /// Send oversized documents as several windows instead of one request
    pub chunking: bool,
}

impl Default for RequesterConfig {
    fn default() -> Self {
        Self {
            primary: ModelSettings::new(DEFAULT_PRIMARY_MODEL, DEFAULT_PRIMARY_TEMPERATURE),
            fallback: ModelSettings::new(DEFAULT_FALLBACK_MODEL, DEFAULT_FALLBACK_TEMPERATURE),
            window_chars: DEFAULT_WINDOW_CHARS,
            chunking: true,
        }
    }
}

/// Text of one completion and whether the fallback model produced it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Completion {
    pub text: String,
    pub degraded: bool,
}

/// Analysis of one document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisOutput {
    /// Window results joined with `\n` in window order
    pub text: String,
    /// True when any window was answered by the fallback model
    pub degraded: bool,
    /// Number of requests sent, zero for empty input
    pub windows: usize,
}

impl AnalysisOutput {
    fn empty_document() -> Self {
        Self {
            text: EMPTY_DOCUMENT_RESULT.to_string(),
            degraded: false,
            windows: 0,
        }
    }
}

/// Sends documents and questions to a [`CompletionBackend`].
///
/// Built once at startup and shared; holds no per-request state.
#[derive(Clone)]
pub struct AnalysisRequester {
    backend: Arc<dyn CompletionBackend>,
    config: RequesterConfig,
}

impl AnalysisRequester {
    pub fn new(backend: Arc<dyn CompletionBackend>, config: RequesterConfig) -> Self {
        Self { backend, config }
    }

    pub fn config(&self) -> &RequesterConfig {
        &self.config
    }

    /// Analyze extracted document text with `prompt`.
    ///
    /// Blank text returns the empty-document message without contacting
    /// the backend. Text longer than the window size is sent window by
    /// window in order.
    #[instrument(skip_all, fields(chars = text.len()))]
    pub async fn analyze(
        &self,
        text: &str,
        prompt: &Prompt,
    ) -> Result<AnalysisOutput, InferenceError> {
        if text.trim().is_empty() {
            debug!("Blank document, skipping backend call");
            return Ok(AnalysisOutput::empty_document());
        }

        let windows = if self.config.chunking && needs_chunking(text, self.config.window_chars) {
            let windows = split_windows(text, self.config.window_chars);
            debug!(
                "Splitting document into {} windows of {} chars",
                windows.len(),
                self.config.window_chars
            );
            windows
        } else {
            vec![text]
        };

        let mut parts = Vec::with_capacity(windows.len());
        let mut degraded = false;
        for window in &windows {
            let completion = self
                .complete_with_fallback(&prompt.system, &prompt.user_message(window))
                .await?;
            degraded |= completion.degraded;
            parts.push(completion.text);
        }

        Ok(AnalysisOutput {
            text: parts.join("\n"),
            degraded,
            windows: windows.len(),
        })
    }

    /// Answer a free-form question on behalf of `role`
    #[instrument(skip_all, fields(role = %role))]
    pub async fn ask(&self, role: Role, question: &str) -> Result<String, InferenceError> {
        let prompt = Prompt::follow_up(role, question);
        let completion = self
            .complete_with_fallback(&prompt.system, &prompt.instruction)
            .await?;
        Ok(completion.text)
    }

    /// One request on the primary model with a single fallback retry
    pub async fn complete_with_fallback(
        &self,
        system: &str,
        user: &str,
    ) -> Result<Completion, InferenceError> {
        let primary = &self.config.primary;
        let request = ChatCompletionRequest::new(&primary.model, system, user)
            .with_temperature(primary.temperature);

        match self.backend.complete(&request).await {
            Ok(text) => Ok(Completion {
                text: text.trim().to_string(),
                degraded: false,
            }),
            Err(e) if e.is_capacity() => {
                let fallback = &self.config.fallback;
                warn!(
                    "{} unavailable on {} ({}), retrying with {}",
                    primary.model,
                    self.backend.name(),
                    e,
                    fallback.model
                );
                let request = ChatCompletionRequest::new(&fallback.model, system, user)
                    .with_temperature(fallback.temperature);
                let text = self.backend.complete(&request).await?;
                Ok(Completion {
                    text: format!("(Fallback to {})\n{}", fallback.model, text.trim()),
                    degraded: true,
                })
            }
            Err(e) => Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockBackend;
    use pretty_assertions::assert_eq;

    fn requester(backend: Arc<MockBackend>, config: RequesterConfig) -> AnalysisRequester {
        AnalysisRequester::new(backend, config)
    }

    #[tokio::test]
    async fn test_blank_text_skips_backend() {
        let backend = Arc::new(MockBackend::fixed("unused"));
        let requester = requester(backend.clone(), RequesterConfig::default());

        let output = requester.analyze("  \n\t ", &Prompt::analysis(None)).await.unwrap();
        assert_eq!(output.text, EMPTY_DOCUMENT_RESULT);
        assert_eq!(output.windows, 0);
        assert_eq!(backend.call_count(), 0);
    }

    #[tokio::test]
    async fn test_primary_success_is_trimmed() {
        let backend = Arc::new(MockBackend::fixed("  Parties: Acme\n\n"));
        let requester = requester(backend.clone(), RequesterConfig::default());

        let output = requester.analyze("Contract text", &Prompt::analysis(None)).await.unwrap();
        assert_eq!(
            output,
            AnalysisOutput {
                text: "Parties: Acme".to_string(),
                degraded: false,
                windows: 1,
            }
        );

        let requests = backend.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].model, DEFAULT_PRIMARY_MODEL);
        assert_eq!(requests[0].temperature, Some(DEFAULT_PRIMARY_TEMPERATURE));
        assert_eq!(requests[0].messages[0].content, "You are a precise legal document analyzer.");
        assert!(requests[0].user_content().ends_with("\n\nContract text"));
    }

    #[tokio::test]
    async fn test_rate_limit_falls_back_once() {
        let backend = Arc::new(MockBackend::new(|request| {
            if request.model == DEFAULT_PRIMARY_MODEL {
                Err(InferenceError::RateLimited("quota".to_string()))
            } else {
                Ok("Parties: Acme".to_string())
            }
        }));
        let requester = requester(backend.clone(), RequesterConfig::default());

        let output = requester.analyze("Contract", &Prompt::analysis(None)).await.unwrap();
        assert_eq!(output.text, "(Fallback to gpt-3.5-turbo)\nParties: Acme");
        assert!(output.degraded);

        let requests = backend.requests();
        assert_eq!(requests.len(), 2);
        assert_eq!(requests[1].model, DEFAULT_FALLBACK_MODEL);
        assert_eq!(requests[1].temperature, Some(DEFAULT_FALLBACK_TEMPERATURE));
        assert_eq!(requests[0].messages, requests[1].messages);
    }

    #[tokio::test]
    async fn test_overloaded_falls_back() {
        let backend = Arc::new(MockBackend::new(|request| {
            if request.model == DEFAULT_PRIMARY_MODEL {
                Err(InferenceError::Overloaded("busy".to_string()))
            } else {
                Ok("ok".to_string())
            }
        }));
        let output = requester(backend, RequesterConfig::default())
            .analyze("text", &Prompt::analysis(None))
            .await
            .unwrap();
        assert!(output.degraded);
    }

    #[tokio::test]
    async fn test_fallback_failure_propagates() {
        let backend = Arc::new(MockBackend::new(|request| {
            if request.model == DEFAULT_PRIMARY_MODEL {
                Err(InferenceError::RateLimited("quota".to_string()))
            } else {
                Err(InferenceError::from_status(500, "down"))
            }
        }));
        let requester = requester(backend.clone(), RequesterConfig::default());

        let err = requester.analyze("text", &Prompt::analysis(None)).await.unwrap_err();
        assert_eq!(err, InferenceError::from_status(500, "down"));
        assert_eq!(backend.call_count(), 2);
    }

    #[tokio::test]
    async fn test_non_capacity_error_is_not_retried() {
        let backend = Arc::new(MockBackend::new(|_| {
            Err(InferenceError::Authentication("bad key".to_string()))
        }));
        let requester = requester(backend.clone(), RequesterConfig::default());

        let err = requester.analyze("text", &Prompt::analysis(None)).await.unwrap_err();
        assert!(matches!(err, InferenceError::Authentication(_)));
        assert_eq!(backend.call_count(), 1);
    }

    #[tokio::test]
    async fn test_oversized_text_is_sent_in_windows() {
        let backend = Arc::new(MockBackend::new(|request| {
            let user = request.user_content();
            let window = user.rsplit("\n\n").next().unwrap_or_default();
            Ok(format!("window starting with {}", &window[..1]))
        }));
        let config = RequesterConfig {
            window_chars: 8_000,
            ..RequesterConfig::default()
        };
        let requester = requester(backend.clone(), config);

        let text = format!("{}{}{}", "a".repeat(8_000), "b".repeat(8_000), "c".repeat(4_000));
        let output = requester.analyze(&text, &Prompt::analysis(None)).await.unwrap();

        assert_eq!(output.windows, 3);
        assert_eq!(
            output.text,
            "window starting with a\nwindow starting with b\nwindow starting with c"
        );

        let requests = backend.requests();
        let sent: String = requests
            .iter()
            .map(|r| r.user_content().rsplit("\n\n").next().unwrap_or_default().to_string())
            .collect();
        assert_eq!(sent, text);
    }

    #[tokio::test]
    async fn test_chunking_disabled_sends_one_request() {
        let backend = Arc::new(MockBackend::fixed("whole"));
        let config = RequesterConfig {
            window_chars: 10,
            chunking: false,
            ..RequesterConfig::default()
        };
        let output = requester(backend.clone(), config)
            .analyze(&"x".repeat(100), &Prompt::analysis(None))
            .await
            .unwrap();
        assert_eq!(output.windows, 1);
        assert_eq!(backend.call_count(), 1);
    }

    #[tokio::test]
    async fn test_text_of_exactly_one_window_is_not_split() {
        let backend = Arc::new(MockBackend::fixed("single"));
        let config = RequesterConfig {
            window_chars: 50,
            ..RequesterConfig::default()
        };
        let text = "é".repeat(50);
        let output = requester(backend.clone(), config)
            .analyze(&text, &Prompt::analysis(None))
            .await
            .unwrap();
        assert_eq!(output.windows, 1);
        assert_eq!(backend.call_count(), 1);
        assert!(backend.requests()[0].user_content().ends_with(&text));
    }

    #[tokio::test]
    async fn test_one_degraded_window_marks_output() {
        let backend = Arc::new(MockBackend::new(|request| {
            let second_window = request.user_content().ends_with('b');
            if second_window && request.model == DEFAULT_PRIMARY_MODEL {
                Err(InferenceError::RateLimited("quota".to_string()))
            } else {
                Ok("part".to_string())
            }
        }));
        let config = RequesterConfig {
            window_chars: 3,
            ..RequesterConfig::default()
        };
        let output = requester(backend, config)
            .analyze("aaabbb", &Prompt::analysis(None))
            .await
            .unwrap();
        assert!(output.degraded);
        assert_eq!(output.text, "part\n(Fallback to gpt-3.5-turbo)\npart");
    }

    #[tokio::test]
    async fn test_ask_uses_role_prompts() {
        let backend = Arc::new(MockBackend::fixed(" You may sublet with consent. "));
        let requester = requester(backend.clone(), RequesterConfig::default());

        let answer = requester
            .ask(Role::Tenant, "Can I sublet?")
            .await
            .unwrap();
        assert_eq!(answer, "You may sublet with consent.");

        let request = &backend.requests()[0];
        assert_eq!(
            request.messages[0].content,
            "You are a helpful legal assistant for a Tenant."
        );
        assert_eq!(
            request.user_content(),
            "As a Tenant, respond to the following legal question: Can I sublet?"
        );
    }

    #[tokio::test]
    async fn test_role_prompt_changes_system_message() {
        let backend = Arc::new(MockBackend::fixed("ok"));
        requester(backend.clone(), RequesterConfig::default())
            .analyze("text", &Prompt::analysis(Some(Role::Paralegal)))
            .await
            .unwrap();
        assert!(backend.requests()[0].messages[0]
            .content
            .starts_with("You are a legal expert assisting a Paralegal."));
    }
}
