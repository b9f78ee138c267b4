// Retrieval subsystem: corpus store, vector index engine, retrieval
// coordinator and the per-question orchestrator.

pub mod corpus;
pub mod index;
pub mod retriever;
pub mod service;

use crate::ai::providers::{EmbeddingError, GenerationError};
use index::IndexError;

pub use corpus::Corpus;
pub use index::{Neighbor, VectorIndex};
pub use retriever::Retriever;
pub use service::RagService;

/// Retrieval width used when the caller does not specify one.
pub const DEFAULT_TOP_K: usize = 3;

/// Failure of a single stage inside an index build or a retrieval.
#[derive(Debug, thiserror::Error)]
pub enum StageError {
    #[error("embedding: {0}")]
    Embedding(#[from] EmbeddingError),

    #[error("index: {0}")]
    Index(#[from] IndexError),
}

#[derive(Debug, thiserror::Error)]
pub enum RagError {
    #[error("prompt must not be empty")]
    InvalidQuery,

    #[error("vector index unavailable: {0}")]
    IndexUnavailable(#[source] StageError),

    #[error("retrieval failed: {0}")]
    Retrieval(#[source] StageError),

    /// The persisted index referenced a key outside the corpus. The key
    /// space invariant guarantees this cannot happen for an index built
    /// from this corpus, so it indicates a foreign or corrupted file.
    #[error("index returned key {key} outside corpus of {corpus_len} documents")]
    IndexConsistency { key: usize, corpus_len: usize },

    #[error("answer generation failed: {0}")]
    Generation(#[from] GenerationError),
}

pub type RagResult<T> = Result<T, RagError>;
