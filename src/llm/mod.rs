pub mod openai;

pub use openai::OpenAiClient;

use async_trait::async_trait;
use reqwest::StatusCode;
use thiserror::Error;

use crate::prompt::Prompt;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("Failed to call the model API: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Model API returned {status}: {body}")]
    Status { status: StatusCode, body: String },

    #[error("The model did not return a response")]
    EmptyResponse,
}

/// A chat completion backend.
///
/// One call sends the prompt's system and user messages as a single
/// request and returns the text of the first choice.
#[async_trait]
pub trait ChatModel: Send + Sync {
    /// Model identifier, for logging.
    fn name(&self) -> &str;

    async fn complete(&self, prompt: &Prompt) -> Result<String, ModelError>;
}
