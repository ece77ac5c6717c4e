//! External generation and embedding collaborators.
//!
//! The runtime only ever talks to these traits; the bundled
//! [`openai::OpenAiClient`] implements both against any OpenAI-compatible
//! endpoint.

pub mod error;
pub mod openai;

pub use error::ProviderError;
pub use openai::{OpenAiClient, OpenAiConfig};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// A structured answer to a question: the full in-character response, a
/// brief extract, and how strongly the view is held.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpinionResponse {
    pub response: String,
    /// Brief answer, 3-10 words.
    pub short_answer: String,
    /// In [0, 1] once it has crossed the provider boundary.
    pub intensity: f32,
}

/// Free-form and structured text generation.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Generate free-form text for a prompt.
    async fn generate(&self, prompt: &str, max_tokens: u32) -> Result<String, ProviderError>;

    /// Generate a structured opinion for a question-answering prompt.
    async fn generate_opinion(&self, prompt: &str) -> Result<OpinionResponse, ProviderError>;
}

/// Batch text embedding. The call fails as a unit: either every text gets a
/// vector, in input order, or the whole call errors.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, ProviderError>;
}
