//! OpenAI-compatible chat-completions client.
//!
//! Requests are sent with temperature 0 so identical notes yield
//! identical narratives.

use crate::config::ModelConfig;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

/// System instruction sent with every summarization request.
pub const SYSTEM_INSTRUCTION: &str = "You are a helpful assistant for the team manager. \
Please summarize the following work notes of employee or employees into key contribution areas. \
Only summarize or rephrase existing information and avoid adding extra details not found in the \
original notes. If the notes only include a single sentence, make minimal assumptions about what \
that could mean.";

/// Errors raised by the text-generation collaborator.
///
/// These propagate unchanged; there is no retry. The run treats them
/// as fatal.
#[derive(Debug, Error)]
pub enum LlmError {
    #[error("text-generation request timed out after {0}s")]
    Timeout(u64),

    #[error("cannot connect to text-generation API at {0}")]
    Connect(String),

    #[error("failed to call text-generation API: {0}")]
    Request(#[source] reqwest::Error),

    #[error("text-generation API error ({status}): {body}")]
    Api {
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("failed to parse text-generation response: {0}")]
    Parse(#[source] reqwest::Error),

    #[error("text-generation response contained no choices")]
    Empty,
}

/// Capability to turn a block of work notes into a short narrative.
///
/// Injected into the summary builder so tests can substitute a mock.
#[async_trait]
pub trait NoteSummarizer: Send + Sync {
    async fn summarize(&self, notes: &str) -> Result<String, LlmError>;
}

/// Chat-completions request body.
#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: &'static str,
    content: String,
}

/// Chat-completions response body (the parts we read).
#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: String,
}

/// Client for any OpenAI-compatible `/chat/completions` endpoint.
pub struct OpenAiClient {
    client: reqwest::Client,
    api_url: String,
    api_key: String,
    organization: String,
    project: String,
    model: String,
    timeout_seconds: u64,
}

impl OpenAiClient {
    /// Create a client from the model configuration.
    pub fn new(config: &ModelConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            api_url: config.api_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            organization: config.organization.clone(),
            project: config.project.clone(),
            model: config.name.clone(),
            timeout_seconds: config.timeout_seconds,
        }
    }
}

#[async_trait]
impl NoteSummarizer for OpenAiClient {
    async fn summarize(&self, notes: &str) -> Result<String, LlmError> {
        let url = format!("{}/chat/completions", self.api_url);

        let request = ChatRequest {
            model: self.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: SYSTEM_INSTRUCTION.to_string(),
                },
                ChatMessage {
                    role: "user",
                    content: notes.to_string(),
                },
            ],
            // Deterministic generation is part of the contract.
            temperature: 0.0,
        };

        debug!("Summarizing {} bytes of notes with {}", notes.len(), self.model);

        let mut builder = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&request);

        if !self.organization.is_empty() {
            builder = builder.header("OpenAI-Organization", &self.organization);
        }
        if !self.project.is_empty() {
            builder = builder.header("OpenAI-Project", &self.project);
        }

        let response = builder.send().await.map_err(|e| {
            if e.is_timeout() {
                LlmError::Timeout(self.timeout_seconds)
            } else if e.is_connect() {
                LlmError::Connect(self.api_url.clone())
            } else {
                LlmError::Request(e)
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(LlmError::Api { status, body });
        }

        let body: ChatResponse = response.json().await.map_err(LlmError::Parse)?;

        body.choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or(LlmError::Empty)
    }
}
