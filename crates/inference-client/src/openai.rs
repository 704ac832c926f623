//! OpenAI-compatible chat completion backend

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, info};

use crate::backend::CompletionBackend;
use crate::error::InferenceError;
use crate::types::{ChatCompletionRequest, ChatCompletionResponse, OpenAIErrorResponse};

/// Default OpenAI API endpoint
pub const DEFAULT_OPENAI_URL: &str = "https://api.openai.com/v1";

/// Default request timeout in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;

#[derive(Debug, Clone)]
pub struct OpenAIConfig {
    /// Base URL, `/chat/completions` is appended
    pub base_url: String,
    pub api_key: Option<String>,
    pub timeout_seconds: u64,
}

impl Default for OpenAIConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_OPENAI_URL.to_string(),
            api_key: None,
            timeout_seconds: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl OpenAIConfig {
    /// Read `OPENAI_API_KEY`, `OPENAI_BASE_URL` and `OPENAI_TIMEOUT`.
    ///
    /// # Errors
    /// A missing or blank `OPENAI_API_KEY` is a configuration error.
    pub fn from_env() -> Result<Self, InferenceError> {
        let api_key = std::env::var("OPENAI_API_KEY")
            .ok()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| InferenceError::Config("OPENAI_API_KEY is not set".to_string()))?;

        Ok(Self {
            base_url: std::env::var("OPENAI_BASE_URL")
                .unwrap_or_else(|_| DEFAULT_OPENAI_URL.to_string()),
            api_key: Some(api_key),
            timeout_seconds: std::env::var("OPENAI_TIMEOUT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(DEFAULT_TIMEOUT_SECS),
        })
    }
}

pub struct OpenAIBackend {
    client: Client,
    config: OpenAIConfig,
}

impl OpenAIBackend {
    pub fn new(config: OpenAIConfig) -> Result<Self, InferenceError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| InferenceError::Config(format!("Failed to create HTTP client: {}", e)))?;

        info!(
            "Initializing OpenAI backend: url={}, timeout={}s",
            config.base_url, config.timeout_seconds
        );

        Ok(Self { client, config })
    }

    pub fn from_env() -> Result<Self, InferenceError> {
        Self::new(OpenAIConfig::from_env()?)
    }

    pub fn config(&self) -> &OpenAIConfig {
        &self.config
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.config.base_url.trim_end_matches('/'))
    }
}

#[async_trait]
impl CompletionBackend for OpenAIBackend {
    async fn complete(&self, request: &ChatCompletionRequest) -> Result<String, InferenceError> {
        debug!(
            "Completion with model {}, user message length: {}",
            request.model,
            request.user_content().len()
        );

        let mut builder = self.client.post(self.endpoint()).json(request);
        if let Some(ref api_key) = self.config.api_key {
            builder = builder.bearer_auth(api_key);
        }

        let response = builder.send().await?;

        let status = response.status();
        if !status.is_success() {
            let message = match response.json::<OpenAIErrorResponse>().await {
                Ok(body) => body.error.message,
                Err(_) => status
                    .canonical_reason()
                    .unwrap_or("Unknown error")
                    .to_string(),
            };
            return Err(InferenceError::from_status(status.as_u16(), message));
        }

        let body: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| InferenceError::InvalidResponse(e.to_string()))?;

        let choice = body
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| InferenceError::InvalidResponse("response has no choices".to_string()))?;

        let content = choice.message.content.unwrap_or_default();
        debug!("Completion done, response length: {}", content.len());
        Ok(content)
    }

    fn name(&self) -> &str {
        "openai"
    }
}
