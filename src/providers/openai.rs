//! OpenAI-compatible chat and embeddings client.

use super::error::ProviderError;
use super::{EmbeddingProvider, OpinionResponse, TextGenerator};
use crate::panel::respondent::clamp_intensity;
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

pub const DEFAULT_API_BASE: &str = "https://api.openai.com/v1";
pub const DEFAULT_CHAT_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_EMBEDDING_MODEL: &str = "text-embedding-3-small";

/// Token budget for structured opinion calls.
const OPINION_MAX_TOKENS: u32 = 800;

#[derive(Debug, Clone)]
pub struct OpenAiConfig {
    pub api_base: String,
    pub api_key: String,
    pub chat_model: String,
    pub embedding_model: String,
    /// Sampling temperature for free-form turns.
    pub temperature: f32,
    /// Sampling temperature for structured opinion calls.
    pub structured_temperature: f32,
}

impl OpenAiConfig {
    /// Build from `OPENAI_API_KEY` and optional `OPENAI_API_BASE`.
    pub fn from_env() -> Result<Self, ProviderError> {
        let api_key = std::env::var("OPENAI_API_KEY").map_err(|_| {
            ProviderError::MissingCredentials("OPENAI_API_KEY is not set".to_string())
        })?;
        let api_base =
            std::env::var("OPENAI_API_BASE").unwrap_or_else(|_| DEFAULT_API_BASE.to_string());
        Ok(Self::new(api_base, api_key))
    }

    pub fn new(api_base: String, api_key: String) -> Self {
        Self {
            api_base,
            api_key,
            chat_model: DEFAULT_CHAT_MODEL.to_string(),
            embedding_model: DEFAULT_EMBEDDING_MODEL.to_string(),
            temperature: 1.2,
            structured_temperature: 0.8,
        }
    }
}

/// Client implementing both provider traits against one endpoint.
pub struct OpenAiClient {
    http: reqwest::Client,
    config: OpenAiConfig,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    content: String,
}

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingDatum>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingDatum {
    embedding: Vec<f32>,
}

impl OpenAiClient {
    pub fn new(config: OpenAiConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            config,
        }
    }

    async fn chat(&self, body: serde_json::Value) -> Result<String, ProviderError> {
        let response = self
            .http
            .post(format!("{}/chat/completions", self.config.api_base))
            .bearer_auth(&self.config.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(ProviderError::RequestFailed(format!(
                "chat completion returned {status}: {}",
                truncate(&detail, 200)
            )));
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::Malformed(e.to_string()))?;
        parsed
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or_else(|| ProviderError::Malformed("response contained no choices".to_string()))
    }
}

#[async_trait]
impl TextGenerator for OpenAiClient {
    async fn generate(&self, prompt: &str, max_tokens: u32) -> Result<String, ProviderError> {
        debug!(model = %self.config.chat_model, max_tokens, "free-form generation");
        self.chat(json!({
            "model": self.config.chat_model,
            "messages": [{"role": "system", "content": prompt}],
            "max_tokens": max_tokens,
            "temperature": self.config.temperature,
        }))
        .await
    }

    async fn generate_opinion(&self, prompt: &str) -> Result<OpinionResponse, ProviderError> {
        debug!(model = %self.config.chat_model, "structured opinion generation");
        let content = self
            .chat(json!({
                "model": self.config.chat_model,
                "messages": [{"role": "system", "content": prompt}],
                "max_tokens": OPINION_MAX_TOKENS,
                "temperature": self.config.structured_temperature,
                "response_format": {
                    "type": "json_schema",
                    "json_schema": {
                        "name": "opinion_response",
                        "strict": true,
                        "schema": opinion_schema(),
                    },
                },
            }))
            .await?;

        let mut opinion: OpinionResponse = serde_json::from_str(&content)
            .map_err(|e| ProviderError::Malformed(format!("opinion payload: {e}")))?;
        opinion.intensity = clamp_intensity(opinion.intensity);
        Ok(opinion)
    }
}

#[async_trait]
impl EmbeddingProvider for OpenAiClient {
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, ProviderError> {
        debug!(model = %self.config.embedding_model, count = texts.len(), "embedding batch");
        let response = self
            .http
            .post(format!("{}/embeddings", self.config.api_base))
            .bearer_auth(&self.config.api_key)
            .json(&json!({
                "model": self.config.embedding_model,
                "input": texts,
            }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(ProviderError::RequestFailed(format!(
                "embedding request returned {status}: {}",
                truncate(&detail, 200)
            )));
        }

        let parsed: EmbeddingResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::Malformed(e.to_string()))?;
        if parsed.data.len() != texts.len() {
            return Err(ProviderError::Malformed(format!(
                "expected {} embeddings, got {}",
                texts.len(),
                parsed.data.len()
            )));
        }
        Ok(parsed.data.into_iter().map(|d| d.embedding).collect())
    }
}

fn opinion_schema() -> serde_json::Value {
    json!({
        "type": "object",
        "properties": {
            "response": {
                "type": "string",
                "description": "The respondent's full in-character answer"
            },
            "short_answer": {
                "type": "string",
                "description": "Brief answer, 3-10 words"
            },
            "intensity": {
                "type": "number",
                "description": "How strongly the view is held, 0.0 to 1.0"
            }
        },
        "required": ["response", "short_answer", "intensity"],
        "additionalProperties": false
    })
}

fn truncate(text: &str, limit: usize) -> &str {
    match text.char_indices().nth(limit) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
