// Provider traits and common types for the embedding and chat backends.

pub mod ollama;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub use ollama::OllamaProvider;

/// A single chat message exchanged with the generation backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum EmbeddingError {
    #[error("embedding request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("embedding backend returned status {status}: {body}")]
    Backend { status: u16, body: String },

    #[error("embedding backend returned an empty vector")]
    EmptyVector,
}

#[derive(Debug, thiserror::Error)]
pub enum GenerationError {
    #[error("chat request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("chat backend returned status {status}: {body}")]
    Backend { status: u16, body: String },
}

/// Converts a text string into a fixed-dimension embedding vector.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError>;
}

/// Turns an assembled conversation into a generated reply.
#[async_trait]
pub trait ChatProvider: Send + Sync {
    async fn chat(&self, messages: Vec<ChatMessage>) -> Result<ChatMessage, GenerationError>;
}
