use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::{ChatMessage, ChatProvider, EmbeddingError, EmbeddingProvider, GenerationError};

/// Client for an Ollama-compatible API serving both the embedding and the
/// chat endpoints under one base URL (e.g. `http://127.0.0.1:11434/api`).
#[derive(Debug, Clone)]
pub struct OllamaProvider {
    client: Client,
    base_url: String,
    model: String,
}

#[derive(Debug, Serialize)]
struct EmbeddingsRequest<'a> {
    model: &'a str,
    prompt: &'a str,
}

#[derive(Debug, Deserialize)]
struct EmbeddingsResponse {
    embedding: Vec<f32>,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    stream: bool,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    message: ChatMessage,
    #[serde(default)]
    done: bool,
    #[serde(default)]
    done_reason: Option<String>,
    #[serde(default)]
    total_duration: Option<i64>,
    #[serde(default)]
    eval_count: Option<i64>,
}

impl OllamaProvider {
    /// The timeout bounds every outbound call so a hung backend cannot hold
    /// the index build lock indefinitely.
    pub fn new(base_url: String, model: String, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            model,
        })
    }
}

#[async_trait]
impl EmbeddingProvider for OllamaProvider {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        let url = format!("{}/embeddings", self.base_url);
        let payload = EmbeddingsRequest {
            model: &self.model,
            prompt: text,
        };

        let response = self.client.post(&url).json(&payload).send().await?;
        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await?;
            return Err(EmbeddingError::Backend { status, body });
        }

        let parsed: EmbeddingsResponse = response.json().await?;
        if parsed.embedding.is_empty() {
            return Err(EmbeddingError::EmptyVector);
        }
        Ok(parsed.embedding)
    }
}

#[async_trait]
impl ChatProvider for OllamaProvider {
    async fn chat(&self, messages: Vec<ChatMessage>) -> Result<ChatMessage, GenerationError> {
        let url = format!("{}/chat", self.base_url);
        let payload = ChatRequest {
            model: &self.model,
            messages: &messages,
            stream: false,
        };

        let response = self.client.post(&url).json(&payload).send().await?;
        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await?;
            return Err(GenerationError::Backend { status, body });
        }

        let parsed: ChatResponse = response.json().await?;
        tracing::debug!(
            done = parsed.done,
            done_reason = ?parsed.done_reason,
            total_duration = ?parsed.total_duration,
            eval_count = ?parsed.eval_count,
            "chat response received"
        );
        Ok(parsed.message)
    }
}
