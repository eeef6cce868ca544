//! Client for the Gemini `generateContent` REST API.
//!
//! The client sends a single prompt and returns the text of the first
//! candidate. It never retries; every failure is reported to the caller.

use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

use crate::config::AiConfig;

#[derive(Error, Debug)]
pub enum AiError {
    #[error("GEMINI_API_KEY is not configured")]
    MissingApiKey,

    #[error("failed to create HTTP client: {0}")]
    Client(reqwest::Error),

    #[error("request to the generative language API failed: {0}")]
    Transport(reqwest::Error),

    #[error("request to the generative language API timed out after {0:?}")]
    Timeout(Duration),

    #[error("generative language API returned {status}: {body}")]
    Status { status: StatusCode, body: String },

    #[error("failed to decode generative language API response: {0}")]
    Decode(reqwest::Error),

    #[error("prompt was blocked by the generative language API: {0}")]
    Blocked(String),

    #[error("generative language API returned no text")]
    EmptyCompletion,
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    contents: [RequestContent<'a>; 1],
}

#[derive(Serialize)]
struct RequestContent<'a> {
    parts: [RequestPart<'a>; 1],
}

#[derive(Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    block_reason: Option<String>,
}

impl GenerateResponse {
    /// Concatenated text parts of the first candidate.
    fn into_text(self) -> Result<String, AiError> {
        let text: String = self
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .map(|content| {
                content
                    .parts
                    .into_iter()
                    .filter_map(|p| p.text)
                    .collect::<Vec<_>>()
                    .join("")
            })
            .unwrap_or_default();

        if !text.trim().is_empty() {
            return Ok(text);
        }
        match self.prompt_feedback.and_then(|f| f.block_reason) {
            Some(reason) => Err(AiError::Blocked(reason)),
            None => Err(AiError::EmptyCompletion),
        }
    }
}

/// Cheap to clone; the underlying connection pool is shared.
#[derive(Debug, Clone)]
pub struct GeminiClient {
    http: Client,
    base_url: String,
    model: String,
    api_key: Option<String>,
    timeout: Duration,
}

impl GeminiClient {
    pub fn new(config: &AiConfig) -> Result<Self, AiError> {
        let http = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(AiError::Client)?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            api_key: config.api_key.clone(),
            timeout: config.timeout,
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Report an elapsed deadline as [`AiError::Timeout`] and anything else
    /// through `otherwise`.
    fn request_error(
        &self,
        err: reqwest::Error,
        otherwise: fn(reqwest::Error) -> AiError,
    ) -> AiError {
        if err.is_timeout() {
            warn!(timeout = ?self.timeout, "Generative language API request timed out");
            AiError::Timeout(self.timeout)
        } else {
            otherwise(err)
        }
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model
        )
    }

    /// Send `prompt` and return the completion text.
    pub async fn generate(&self, prompt: &str) -> Result<String, AiError> {
        let api_key = self.api_key.as_deref().ok_or(AiError::MissingApiKey)?;

        let request = GenerateRequest {
            contents: [RequestContent {
                parts: [RequestPart { text: prompt }],
            }],
        };

        debug!(model = %self.model, prompt_len = prompt.len(), "Sending generateContent request");

        let response = self
            .http
            .post(self.endpoint())
            .header("x-goog-api-key", api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| self.request_error(e, AiError::Transport))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            warn!(%status, "Generative language API returned an error");
            return Err(AiError::Status { status, body });
        }

        let parsed: GenerateResponse = response
            .json()
            .await
            .map_err(|e| self.request_error(e, AiError::Decode))?;
        let text = parsed.into_text()?;
        debug!(completion_len = text.len(), "Received completion");
        Ok(text)
    }
}
