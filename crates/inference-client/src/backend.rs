//! Completion backend abstraction

use async_trait::async_trait;

use crate::error::InferenceError;
use crate::types::ChatCompletionRequest;

/// A service that turns one chat request into assistant text
#[async_trait]
pub trait CompletionBackend: Send + Sync {
    /// Run one completion. The returned text is untrimmed.
    async fn complete(&self, request: &ChatCompletionRequest) -> Result<String, InferenceError>;

    /// Backend name for logging
    fn name(&self) -> &str;
}
