//! Scripted in-memory backend for deterministic tests
//!
//! Enabled for this crate's tests and, through the `mock` feature, for
//! tests of crates that inject an `AnalysisRequester`.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use crate::backend::CompletionBackend;
use crate::error::InferenceError;
use crate::types::ChatCompletionRequest;

type Responder = dyn Fn(&ChatCompletionRequest) -> Result<String, InferenceError> + Send + Sync;

/// Backend that answers with a closure and records every request
pub struct MockBackend {
    responder: Arc<Responder>,
    delay: Option<Duration>,
    requests: Mutex<Vec<ChatCompletionRequest>>,
}

impl MockBackend {
    pub fn new<F>(responder: F) -> Self
    where
        F: Fn(&ChatCompletionRequest) -> Result<String, InferenceError> + Send + Sync + 'static,
    {
        Self {
            responder: Arc::new(responder),
            delay: None,
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Always answer with `text`
    pub fn fixed(text: impl Into<String>) -> Self {
        let text = text.into();
        Self::new(move |_| Ok(text.clone()))
    }

    /// Always fail with `error`
    pub fn failing(error: InferenceError) -> Self {
        Self::new(move |_| Err(error.clone()))
    }

    /// Sleep before answering, for timeout tests
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Requests received so far, in arrival order
    pub fn requests(&self) -> Vec<ChatCompletionRequest> {
        self.requests
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    pub fn call_count(&self) -> usize {
        self.requests
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .len()
    }
}

#[async_trait]
impl CompletionBackend for MockBackend {
    async fn complete(&self, request: &ChatCompletionRequest) -> Result<String, InferenceError> {
        self.requests
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(request.clone());

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        (self.responder)(request)
    }

    fn name(&self) -> &str {
        "mock"
    }
}
