use anyhow::Context;
use clap::Parser;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

use ragserve::ai::providers::OllamaProvider;
use ragserve::rag::{Corpus, RagService, Retriever};
use ragserve::{server, Config};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let corpus = Arc::new(
        Corpus::load(&config.corpus_path)
            .await
            .with_context(|| format!("failed to load corpus {}", config.corpus_path.display()))?,
    );
    tracing::info!(
        documents = corpus.len(),
        "loaded corpus from {}",
        config.corpus_path.display()
    );

    let provider = Arc::new(
        OllamaProvider::new(
            config.ollama_url.clone(),
            config.model.clone(),
            Duration::from_secs(config.request_timeout_secs),
        )
        .context("failed to build Ollama client")?,
    );

    let retriever = Retriever::new(corpus, provider.clone(), config.index_path.clone());
    let service = Arc::new(RagService::new(retriever, provider, config.top_k));

    server::run(&config, service).await
}
