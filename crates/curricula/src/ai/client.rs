use reqwest::blocking::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::ModelSettings;
use crate::error::GenerationError;

const ANTHROPIC_VERSION: &str = "2023-06-01";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }
}

/// Black-box text generation: prompt in, one text blob out.
///
/// Transport, auth and quota failures surface as [`GenerationError`]; nothing
/// is retried here.
pub trait GenerativeModel: Send + Sync {
    fn invoke(&self, system_prompt: &str, messages: &[Message]) -> Result<String, GenerationError>;
}

#[derive(Debug, Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    system: &'a str,
    messages: &'a [Message],
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    content: Vec<ContentBlock>,
    #[serde(default)]
    usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    block_type: String,
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Usage {
    input_tokens: u32,
    output_tokens: u32,
}

impl MessagesResponse {
    fn text(&self) -> Option<&str> {
        self.content
            .iter()
            .find(|b| b.block_type == "text")
            .and_then(|b| b.text.as_deref())
    }
}

#[derive(Debug, Deserialize)]
struct ApiErrorEnvelope {
    error: ApiErrorBody,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: String,
}

/// Anthropic Messages API over a blocking reqwest client.
pub struct MessagesClient {
    client: Client,
    api_key: SecretString,
    api_url: String,
    model_id: String,
    max_tokens: u32,
}

impl MessagesClient {
    pub fn new(settings: &ModelSettings) -> Result<Self, GenerationError> {
        if settings.api_key.expose_secret().trim().is_empty() {
            return Err(GenerationError::MissingCredentials);
        }

        let client = Client::builder().timeout(settings.timeout).build()?;

        Ok(Self {
            client,
            api_key: settings.api_key.clone(),
            api_url: settings.api_url.clone(),
            model_id: settings.model_id.clone(),
            max_tokens: settings.max_tokens,
        })
    }

    pub fn model_id(&self) -> &str {
        &self.model_id
    }
}

impl GenerativeModel for MessagesClient {
    fn invoke(&self, system_prompt: &str, messages: &[Message]) -> Result<String, GenerationError> {
        let _span = tracing::info_span!("ai.invoke", model = %self.model_id).entered();

        let request_body = MessagesRequest {
            model: &self.model_id,
            max_tokens: self.max_tokens,
            system: system_prompt,
            messages,
        };

        let response = self
            .client
            .post(&self.api_url)
            .header("x-api-key", self.api_key.expose_secret())
            .header("anthropic-version", ANTHROPIC_VERSION)
            .header("content-type", "application/json")
            .json(&request_body)
            .send()?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            let message = serde_json::from_str::<ApiErrorEnvelope>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);
            return Err(GenerationError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let body = response.text()?;
        let parsed: MessagesResponse = serde_json::from_str(&body)
            .map_err(|e| GenerationError::MalformedEnvelope(e.to_string()))?;

        if let Some(usage) = &parsed.usage {
            debug!(
                input_tokens = usage.input_tokens,
                output_tokens = usage.output_tokens,
                "Model call succeeded"
            );
        }

        parsed
            .text()
            .map(str::to_string)
            .ok_or(GenerationError::EmptyContent)
    }
}
