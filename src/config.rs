use clap::Parser;
use std::path::PathBuf;

use crate::rag::DEFAULT_TOP_K;

#[derive(Parser, Debug, Clone)]
#[command(name = "ragserve")]
#[command(about = "Retrieval-augmented chat server backed by an Ollama-compatible API")]
pub struct Config {
    /// Address to bind the HTTP server to
    #[arg(long, default_value = "127.0.0.1")]
    pub address: String,

    /// Port to listen on
    #[arg(long, default_value_t = 8080)]
    pub port: u16,

    /// Base URL of the Ollama-compatible API
    #[arg(long, default_value = "http://127.0.0.1:11434/api")]
    pub ollama_url: String,

    /// Model name used for both embeddings and chat
    #[arg(long, default_value = "llm")]
    pub model: String,

    /// Newline-delimited corpus file, one document per line
    #[arg(long, default_value = "docs.txt")]
    pub corpus_path: PathBuf,

    /// Location of the persisted vector index
    #[arg(long, default_value = "vector.index")]
    pub index_path: PathBuf,

    /// Number of passages retrieved per question
    #[arg(long, default_value_t = DEFAULT_TOP_K)]
    pub top_k: usize,

    /// Timeout for outbound embedding and chat calls, in seconds
    #[arg(long, default_value_t = 120)]
    pub request_timeout_secs: u64,
}
