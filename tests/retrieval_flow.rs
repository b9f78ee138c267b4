// End-to-end retrieval flow: corpus file on disk, lazy index build on the
// first question, index reuse on the next one.

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tempfile::TempDir;

use ragserve::ai::providers::{
    ChatMessage, ChatProvider, EmbeddingError, EmbeddingProvider, GenerationError,
};
use ragserve::rag::{Corpus, RagService, Retriever};

struct StubEmbedder {
    calls: AtomicUsize,
}

#[async_trait]
impl EmbeddingProvider for StubEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(match text {
            "A" => vec![1.0, 0.0],
            "B" => vec![0.0, 1.0],
            "C" => vec![-1.0, 0.0],
            _ => vec![0.1, 0.9],
        })
    }
}

struct EchoChat;

#[async_trait]
impl ChatProvider for EchoChat {
    async fn chat(&self, messages: Vec<ChatMessage>) -> Result<ChatMessage, GenerationError> {
        // Echo the prompt back so the test can inspect what was assembled.
        Ok(ChatMessage {
            role: "assistant".to_string(),
            content: messages.into_iter().next().map(|m| m.content).unwrap_or_default(),
        })
    }
}

#[tokio::test]
async fn first_question_builds_the_index_and_later_ones_reuse_it() {
    let temp_dir = TempDir::new().unwrap();
    let corpus_path = temp_dir.path().join("docs.txt");
    tokio::fs::write(&corpus_path, "A\nB\nC\n").await.unwrap();

    let corpus = Arc::new(Corpus::load(&corpus_path).await.unwrap());
    let embedder = Arc::new(StubEmbedder {
        calls: AtomicUsize::new(0),
    });
    let index_path = temp_dir.path().join("vector.index");
    let retriever = Retriever::new(corpus, embedder.clone(), index_path.clone());
    let service = RagService::new(retriever, Arc::new(EchoChat), 3);

    let first = service.answer("what is B?").await.unwrap();
    assert!(first.starts_with("what is B?"));
    assert!(first.ends_with("B\nA\nC"), "passages ascending by distance: {first}");
    assert!(index_path.exists());
    // Three corpus documents plus one query embedding.
    assert_eq!(embedder.calls.load(Ordering::SeqCst), 4);

    let second = service.answer("what is B?").await.unwrap();
    assert_eq!(second, first);
    // Only the query was embedded; the persisted index was reused.
    assert_eq!(embedder.calls.load(Ordering::SeqCst), 5);
}
