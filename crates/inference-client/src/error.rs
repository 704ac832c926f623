//! Errors of the completion backends

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InferenceError {
    #[error("Rate limit exceeded: {0}")]
    RateLimited(String),

    #[error("Service overloaded: {0}")]
    Overloaded(String),

    #[error("Authentication failed: {0}")]
    Authentication(String),

    #[error("Model not found: {0}")]
    ModelNotFound(String),

    #[error("Upstream returned {status}: {message}")]
    Upstream { status: u16, message: String },

    #[error("Request failed: {0}")]
    Transport(String),

    #[error("Failed to parse response: {0}")]
    InvalidResponse(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl InferenceError {
    /// Map a non-success HTTP status and the upstream message
    pub fn from_status(status: u16, message: impl Into<String>) -> Self {
        let message = message.into();
        match status {
            401 => Self::Authentication(message),
            404 => Self::ModelNotFound(message),
            429 => Self::RateLimited(message),
            503 => Self::Overloaded(message),
            _ => Self::Upstream { status, message },
        }
    }

    /// Temporary capacity shortage, worth one retry on the fallback model
    pub fn is_capacity(&self) -> bool {
        matches!(self, Self::RateLimited(_) | Self::Overloaded(_))
    }
}

impl From<reqwest::Error> for InferenceError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            Self::InvalidResponse(e.to_string())
        } else {
            Self::Transport(e.to_string())
        }
    }
}
