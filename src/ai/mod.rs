// AI backend integration: provider traits and the Ollama client.

pub mod providers;

pub use providers::{ChatMessage, ChatProvider, EmbeddingProvider, OllamaProvider};
