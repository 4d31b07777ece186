//! Gemini client - `generateContent` over REST

use super::{AiError, GenerationRequest, Role, TextGenerator};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, instrument, warn};

const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/models";
const TEMPERATURE: f32 = 0.7;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest<'a> {
    system_instruction: Content<'a>,
    contents: Vec<Content<'a>>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<&'static str>,
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    max_output_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_mime_type: Option<&'static str>,
}

#[derive(Debug, Deserialize)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: Option<String>,
}

impl GeminiResponse {
    /// Concatenated text parts of the first candidate
    fn text(self) -> Option<String> {
        let parts = self.candidates.into_iter().next()?.content?.parts;
        let text: String = parts.into_iter().filter_map(|part| part.text).collect();
        (!text.trim().is_empty()).then_some(text)
    }
}

#[derive(Debug, Clone)]
pub struct GeminiClient {
    http: Client,
    api_key: String,
    model: String,
}

impl GeminiClient {
    pub fn new(api_key: String, model: String, timeout: Duration) -> Result<Self, AiError> {
        let http = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("genhpp/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| AiError::Transport(e.to_string()))?;

        Ok(Self {
            http,
            api_key,
            model,
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/{}:generateContent", GEMINI_API_BASE, self.model)
    }
}

fn build_body(request: &GenerationRequest) -> GeminiRequest<'_> {
    let mut contents: Vec<Content<'_>> = request
        .history
        .iter()
        .map(|turn| Content {
            role: Some(match turn.role {
                Role::User => "user",
                Role::Model => "model",
            }),
            parts: vec![Part { text: &turn.text }],
        })
        .collect();
    contents.push(Content {
        role: Some("user"),
        parts: vec![Part {
            text: &request.prompt,
        }],
    });

    GeminiRequest {
        system_instruction: Content {
            role: None,
            parts: vec![Part {
                text: &request.system,
            }],
        },
        contents,
        generation_config: GenerationConfig {
            temperature: TEMPERATURE,
            max_output_tokens: request.max_output_tokens,
            response_mime_type: request.json_output.then_some("application/json"),
        },
    }
}

fn map_reqwest_error(e: reqwest::Error) -> AiError {
    if e.is_timeout() {
        AiError::Timeout
    } else {
        AiError::Transport(e.to_string())
    }
}

#[async_trait]
impl TextGenerator for GeminiClient {
    #[instrument(skip(self, request), fields(model = %self.model, json = request.json_output))]
    async fn generate(&self, request: GenerationRequest) -> Result<String, AiError> {
        let body = build_body(&request);

        let res = self
            .http
            .post(self.endpoint())
            .query(&[("key", self.api_key.as_str())])
            .json(&body)
            .send()
            .await
            .map_err(map_reqwest_error)?;

        match res.status() {
            s if s.is_success() => {
                let response = res
                    .json::<GeminiResponse>()
                    .await
                    .map_err(|e| AiError::Schema(e.to_string()))?;
                let text = response.text().ok_or(AiError::EmptyResponse)?;
                debug!("Gemini replied with {} chars", text.len());
                Ok(text)
            }
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(AiError::InvalidApiKey),
            StatusCode::TOO_MANY_REQUESTS => Err(AiError::RateLimited),
            s => {
                let status = s.as_u16();
                let body = res.text().await.unwrap_or_default();
                warn!("Gemini returned http {}", status);
                // an unknown key is reported as a 400
                if body.contains("API_KEY_INVALID") {
                    return Err(AiError::InvalidApiKey);
                }
                Err(AiError::Http { status, body })
            }
        }
    }
}
