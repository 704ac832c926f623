//! Text-generation client for legal document analysis
//!
//! - [`CompletionBackend`]: one chat completion against one model
//! - [`OpenAIBackend`]: OpenAI-compatible HTTP implementation
//! - [`AnalysisRequester`]: fallback model on capacity errors, windowed
//!   analysis of oversized documents, follow-up questions

pub mod backend;
pub mod error;
pub mod openai;
pub mod requester;
pub mod types;

#[cfg(any(test, feature = "mock"))]
pub mod mock;

pub use backend::CompletionBackend;
pub use error::InferenceError;
pub use openai::{OpenAIBackend, OpenAIConfig};
pub use requester::{AnalysisOutput, AnalysisRequester, Completion, ModelSettings, RequesterConfig};
pub use types::{ChatCompletionRequest, ChatMessage};
