//! Gemini client. The only place that talks to the generative-AI service.
//!
//! One attempt per question with a bounded timeout. Callers turn any error
//! into the fixed apology text; nothing here retries.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::config::GeminiConfig;

const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com";

#[derive(Debug, Error)]
pub enum AdviceError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("model returned empty content")]
    EmptyContent,
}

/// Opaque text generation: prompt in, raw text out.
#[async_trait]
pub trait AdviceProvider: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String, AdviceError>;
}

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    contents: Vec<Content<'a>>,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
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
    text: Option<String>,
}

impl GenerateResponse {
    /// Concatenated text parts of the first candidate.
    fn text(&self) -> Option<String> {
        let content = self.candidates.first()?.content.as_ref()?;
        let text: String = content
            .parts
            .iter()
            .filter_map(|p| p.text.as_deref())
            .collect();
        (!text.trim().is_empty()).then_some(text)
    }
}

#[derive(Debug, Deserialize)]
struct GeminiError {
    error: GeminiErrorBody,
}

#[derive(Debug, Deserialize)]
struct GeminiErrorBody {
    message: String,
}

#[derive(Clone)]
pub struct GeminiClient {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
}

impl GeminiClient {
    pub fn new(cfg: &GeminiConfig) -> anyhow::Result<Self> {
        Ok(Self {
            client: Client::builder()
                .timeout(Duration::from_secs(cfg.timeout_secs))
                .build()?,
            api_key: cfg.api_key.clone(),
            base_url: GEMINI_API_BASE.to_string(),
            model: cfg.model.clone(),
        })
    }

    fn endpoint(&self) -> String {
        let model = self.model.strip_prefix("models/").unwrap_or(&self.model);
        format!("{}/v1beta/models/{}:generateContent", self.base_url, model)
    }
}

#[async_trait]
impl AdviceProvider for GeminiClient {
    async fn generate(&self, prompt: &str) -> Result<String, AdviceError> {
        let body = GenerateRequest {
            contents: vec![Content {
                parts: vec![Part { text: prompt }],
            }],
        };

        let response = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<GeminiError>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);
            warn!(%status, "gemini returned an error");
            return Err(AdviceError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let parsed: GenerateResponse = response.json().await?;
        let text = parsed.text().ok_or(AdviceError::EmptyContent)?;
        debug!(chars = text.len(), "gemini call succeeded");
        Ok(text)
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    fn client(model: &str) -> GeminiClient {
        GeminiClient::new(&GeminiConfig {
            api_key: "k".into(),
            model: model.into(),
            timeout_secs: 1,
        })
        .unwrap()
    }

    #[test]
    fn endpoint_strips_models_prefix() {
        let expected =
            "https://generativelanguage.googleapis.com/v1beta/models/gemini-pro:generateContent";
        assert_eq!(client("gemini-pro").endpoint(), expected);
        assert_eq!(client("models/gemini-pro").endpoint(), expected);
    }

    #[test]
    fn response_text_joins_parts_of_first_candidate() {
        let raw = serde_json::json!({
            "candidates": [
                { "content": { "parts": [{ "text": "### A\n" }, { "text": "body" }] } },
                { "content": { "parts": [{ "text": "ignored" }] } }
            ]
        });
        let parsed: GenerateResponse = serde_json::from_value(raw).unwrap();
        assert_eq!(parsed.text().as_deref(), Some("### A\nbody"));
    }

    #[test]
    fn response_without_text_is_empty() {
        let parsed: GenerateResponse = serde_json::from_str(r#"{"candidates":[]}"#).unwrap();
        assert!(parsed.text().is_none());
        let blocked: GenerateResponse =
            serde_json::from_str(r#"{"promptFeedback":{"blockReason":"SAFETY"}}"#).unwrap();
        assert!(blocked.text().is_none());
    }
}
