use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use super::{ChatModel, ModelError};
use crate::config::{validate_temperature, ConfigError, OpenAiConfig};
use crate::prompt::Prompt;

/// Client for an OpenAI-compatible `/v1/chat/completions` endpoint.
pub struct OpenAiClient {
    http: Client,
    endpoint: String,
    api_key: String,
    model: String,
    temperature: f64,
}

impl OpenAiClient {
    /// Build a client, rejecting an out-of-range temperature or a missing
    /// API key before any request can be made.
    pub fn from_config(config: &OpenAiConfig) -> Result<Self, ConfigError> {
        validate_temperature(config.temperature)?;
        let api_key = config.api_key()?.to_string();
        Ok(Self {
            http: Client::new(),
            endpoint: format!("{}/v1/chat/completions", config.api_url.trim_end_matches('/')),
            api_key,
            model: config.model.clone(),
            temperature: config.temperature,
        })
    }
}

#[derive(Serialize)]
struct ChatReq<'a> {
    model: &'a str,
    temperature: f64,
    messages: [Msg<'a>; 2],
}

#[derive(Serialize)]
struct Msg<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResp {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: Option<ChoiceMsg>,
}

#[derive(Deserialize)]
struct ChoiceMsg {
    content: Option<String>,
}

#[async_trait]
impl ChatModel for OpenAiClient {
    fn name(&self) -> &str {
        &self.model
    }

    #[instrument(skip_all, fields(model = %self.model))]
    async fn complete(&self, prompt: &Prompt) -> Result<String, ModelError> {
        let req = ChatReq {
            model: &self.model,
            temperature: self.temperature,
            messages: [
                Msg {
                    role: "system",
                    content: prompt.system(),
                },
                Msg {
                    role: "user",
                    content: prompt.user(),
                },
            ],
        };

        debug!(prompt_bytes = prompt.user().len(), "sending chat completion request");
        let response = self
            .http
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&req)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ModelError::Status { status, body });
        }

        let resp: ChatResp = response.json().await?;
        let content = resp
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message)
            .and_then(|message| message.content)
            .map(|content| content.trim().to_string())
            .filter(|content| !content.is_empty())
            .ok_or(ModelError::EmptyResponse)?;

        debug!(response_bytes = content.len(), "received chat completion");
        Ok(content)
    }
}
