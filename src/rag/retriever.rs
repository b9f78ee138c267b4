use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Mutex;

use super::index::VectorIndex;
use super::{Corpus, RagError, RagResult};
use crate::ai::providers::EmbeddingProvider;

/// Guarantees a usable vector index exists before every search and maps
/// neighbor keys back to corpus text.
///
/// The index is built lazily on the first request and persisted; existence
/// of the index file is the sole staleness signal, so later corpus edits do
/// not trigger a rebuild. Concurrent cold starts are serialized through a
/// single-flight lock so at most one build runs and is persisted.
pub struct Retriever {
    corpus: Arc<Corpus>,
    embedder: Arc<dyn EmbeddingProvider>,
    index_path: PathBuf,
    build_lock: Mutex<()>,
}

impl Retriever {
    pub fn new(
        corpus: Arc<Corpus>,
        embedder: Arc<dyn EmbeddingProvider>,
        index_path: PathBuf,
    ) -> Self {
        Self {
            corpus,
            embedder,
            index_path,
            build_lock: Mutex::new(()),
        }
    }

    /// Returns the path of a usable persisted index, building it first if
    /// none exists yet.
    pub async fn ensure_index(&self) -> RagResult<PathBuf> {
        if self.index_exists().await {
            return Ok(self.index_path.clone());
        }

        let _guard = self.build_lock.lock().await;
        // Another request may have finished the build while we waited.
        if self.index_exists().await {
            return Ok(self.index_path.clone());
        }

        self.build_index().await?;
        Ok(self.index_path.clone())
    }

    async fn index_exists(&self) -> bool {
        tokio::fs::try_exists(&self.index_path).await.unwrap_or(false)
    }

    /// Embeds the full corpus in position order, builds the index and
    /// persists it atomically. Any failure leaves no index file behind.
    async fn build_index(&self) -> RagResult<()> {
        tracing::info!(
            documents = self.corpus.len(),
            "building vector index over corpus"
        );

        let embed_futures = self.corpus.texts().iter().map(|text| self.embedder.embed(text));
        let results = futures::future::join_all(embed_futures).await;

        let mut vectors = Vec::with_capacity(self.corpus.len());
        for result in results {
            vectors.push(result.map_err(|e| RagError::IndexUnavailable(e.into()))?);
        }

        let index =
            VectorIndex::build(&vectors).map_err(|e| RagError::IndexUnavailable(e.into()))?;
        tracing::info!(
            dimension = index.dimension().unwrap_or(0),
            vectors = index.len(),
            path = %self.index_path.display(),
            "persisting vector index"
        );
        index
            .persist(&self.index_path)
            .await
            .map_err(|e| RagError::IndexUnavailable(e.into()))?;
        // The build-time handle is dropped here, releasing its storage.
        Ok(())
    }

    /// Embeds `query_text`, searches the persisted index at `path` and
    /// returns the matching document texts, ascending by distance. The
    /// loaded handle is owned by this call and released on every exit path.
    pub async fn retrieve(&self, path: &Path, query_text: &str, k: usize) -> RagResult<Vec<String>> {
        let query = self
            .embedder
            .embed(query_text)
            .await
            .map_err(|e| RagError::Retrieval(e.into()))?;

        let mut index = VectorIndex::load(path, query.len())
            .await
            .map_err(|e| RagError::Retrieval(e.into()))?;
        let neighbors = index.search(&query, k).map_err(|e| RagError::Retrieval(e.into()))?;
        index.release();

        let mut texts = Vec::with_capacity(neighbors.len());
        for neighbor in &neighbors {
            tracing::debug!(key = neighbor.key, distance = neighbor.distance, "neighbor hit");
            match self.corpus.get(neighbor.key) {
                Some(text) => texts.push(text.to_string()),
                None => {
                    return Err(RagError::IndexConsistency {
                        key: neighbor.key,
                        corpus_len: self.corpus.len(),
                    })
                }
            }
        }
        Ok(texts)
    }
}
