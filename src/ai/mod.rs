//! AI module - Language model client and the business flows built on it
//!
//! Handlers only see [`TextGenerator`]: production wires [`GeminiClient`], a missing API key
//! wires [`DisabledGenerator`], tests wire a scripted generator.

pub mod flows;
pub mod gemini;
pub mod prompts;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::error;
use validator::Validate;

pub use flows::{ExpenseInsight, HppAnalysis, PricingStrategy};
pub use gemini::GeminiClient;

#[derive(Debug, Clone, Error)]
pub enum AiError {
    #[error("network error: {0}")]
    Transport(String),
    #[error("timeout")]
    Timeout,
    #[error("http {status}: {body}")]
    Http { status: u16, body: String },
    #[error("rate limited")]
    RateLimited,
    #[error("invalid api key")]
    InvalidApiKey,
    #[error("model returned no text")]
    EmptyResponse,
    #[error("unexpected response shape: {0}")]
    Schema(String),
    #[error("missing api key: GEMINI_API_KEY environment variable not set")]
    MissingApiKey,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    User,
    Model,
}

/// One message of a multi-turn conversation
#[derive(Debug, Clone, PartialEq)]
pub struct Turn {
    pub role: Role,
    pub text: String,
}

impl Turn {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            text: text.into(),
        }
    }

    pub fn model(text: impl Into<String>) -> Self {
        Self {
            role: Role::Model,
            text: text.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    pub system: String,
    /// Earlier turns, oldest first. The prompt is appended as the last user turn.
    pub history: Vec<Turn>,
    pub prompt: String,
    /// Asks the model for a bare JSON document
    pub json_output: bool,
    pub max_output_tokens: u32,
}

impl GenerationRequest {
    pub fn new(system: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            system: system.into(),
            history: Vec::new(),
            prompt: prompt.into(),
            json_output: false,
            max_output_tokens: 1024,
        }
    }

    pub fn with_history(mut self, history: Vec<Turn>) -> Self {
        self.history = history;
        self
    }

    pub fn json(mut self) -> Self {
        self.json_output = true;
        self
    }
}

#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Returns the text of the first candidate
    async fn generate(&self, request: GenerationRequest) -> Result<String, AiError>;
}

/// Stand-in used when no API key is configured, every call fails
#[derive(Debug, Default, Clone)]
pub struct DisabledGenerator;

#[async_trait]
impl TextGenerator for DisabledGenerator {
    async fn generate(&self, _request: GenerationRequest) -> Result<String, AiError> {
        Err(AiError::MissingApiKey)
    }
}

/// The JSON part of a model reply. Gemini answers with plain JSON, a fenced block
/// (` ```json ` or a bare fence), or an object surrounded by prose.
pub(crate) fn extract_json(reply: &str) -> &str {
    let reply = reply.trim();
    let body = fenced_body(reply).unwrap_or(reply);
    if body.starts_with('{') || body.starts_with('[') {
        return body;
    }

    // prose around an object: outermost braces
    match (body.find('{'), body.rfind('}')) {
        (Some(open), Some(close)) if open < close => &body[open..=close],
        _ => body,
    }
}

/// Content of the first fenced block, the info string after the opening fence dropped
fn fenced_body(reply: &str) -> Option<&str> {
    let open = reply.find("```")?;
    let after_fence = &reply[open + 3..];
    let content = after_fence
        .find('\n')
        .map_or(after_fence, |line_end| &after_fence[line_end + 1..]);
    let close = content.find("```")?;
    Some(content[..close].trim())
}

/// Parses a model reply into `T` and runs its validator rules
pub(crate) fn parse_structured<T>(reply: &str) -> Result<T, AiError>
where
    T: DeserializeOwned + Validate,
{
    let json = extract_json(reply);
    if json.is_empty() {
        return Err(AiError::EmptyResponse);
    }

    let value: T = serde_json::from_str(json).map_err(|e| {
        error!(
            json_error = %e,
            preview = %json.chars().take(300).collect::<String>(),
            "Model reply is not the expected JSON"
        );
        AiError::Schema(e.to_string())
    })?;

    value.validate().map_err(|e| {
        error!("Model reply failed validation: {}", e);
        AiError::Schema(e.to_string())
    })?;

    Ok(value)
}
