use std::sync::Arc;

use super::{RagError, RagResult, Retriever};
use crate::ai::providers::{ChatMessage, ChatProvider};

/// Per-question entry point: ensure the index exists, retrieve context,
/// assemble the generation prompt and return the backend's answer verbatim.
/// Failures from any stage surface as a single error; nothing is retried
/// here.
pub struct RagService {
    retriever: Retriever,
    generator: Arc<dyn ChatProvider>,
    top_k: usize,
}

impl RagService {
    pub fn new(retriever: Retriever, generator: Arc<dyn ChatProvider>, top_k: usize) -> Self {
        Self {
            retriever,
            generator,
            top_k,
        }
    }

    pub async fn answer(&self, question: &str) -> RagResult<String> {
        if question.trim().is_empty() {
            return Err(RagError::InvalidQuery);
        }
        tracing::info!("answering question: {question}");

        let index_path = self.retriever.ensure_index().await?;
        let references = self
            .retriever
            .retrieve(&index_path, question, self.top_k)
            .await?;
        tracing::debug!(passages = references.len(), "retrieved context");

        let prompt = build_prompt(question, &references);
        let reply = self.generator.chat(vec![ChatMessage::user(prompt)]).await?;
        Ok(reply.content)
    }
}

fn build_prompt(question: &str, references: &[String]) -> String {
    format!(
        "{question}\n===\nAnswer using the reference material below.\n===\n{}",
        references.join("\n")
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::providers::{
        EmbeddingError, EmbeddingProvider, GenerationError,
    };
    use crate::rag::Corpus;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use tempfile::TempDir;

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

    struct StubChat {
        calls: AtomicUsize,
        last_prompt: Mutex<Option<String>>,
        fail: bool,
    }

    impl StubChat {
        fn new(fail: bool) -> Self {
            Self {
                calls: AtomicUsize::new(0),
                last_prompt: Mutex::new(None),
                fail,
            }
        }
    }

    #[async_trait]
    impl ChatProvider for StubChat {
        async fn chat(&self, messages: Vec<ChatMessage>) -> Result<ChatMessage, GenerationError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(GenerationError::Backend {
                    status: 500,
                    body: "backend down".to_string(),
                });
            }
            *self.last_prompt.lock().unwrap() =
                messages.first().map(|message| message.content.clone());
            Ok(ChatMessage {
                role: "assistant".to_string(),
                content: "the answer".to_string(),
            })
        }
    }

    fn service_at(
        dir: &TempDir,
        embedder: Arc<StubEmbedder>,
        chat: Arc<StubChat>,
    ) -> RagService {
        let corpus = Arc::new(Corpus::from_lines(vec![
            "A".to_string(),
            "B".to_string(),
            "C".to_string(),
        ]));
        let retriever = Retriever::new(corpus, embedder, dir.path().join("vector.index"));
        RagService::new(retriever, chat, 3)
    }

    #[tokio::test]
    async fn blank_question_is_rejected_before_any_collaborator_call() {
        let temp_dir = TempDir::new().unwrap();
        let embedder = Arc::new(StubEmbedder {
            calls: AtomicUsize::new(0),
        });
        let chat = Arc::new(StubChat::new(false));
        let service = service_at(&temp_dir, embedder.clone(), chat.clone());

        let err = service.answer("   ").await.unwrap_err();
        assert!(matches!(err, RagError::InvalidQuery));
        assert_eq!(embedder.calls.load(Ordering::SeqCst), 0);
        assert_eq!(chat.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn answer_feeds_retrieved_context_to_the_generator() {
        let temp_dir = TempDir::new().unwrap();
        let embedder = Arc::new(StubEmbedder {
            calls: AtomicUsize::new(0),
        });
        let chat = Arc::new(StubChat::new(false));
        let service = service_at(&temp_dir, embedder, chat.clone());

        let answer = service.answer("what is B?").await.unwrap();
        assert_eq!(answer, "the answer");

        let prompt = chat.last_prompt.lock().unwrap().clone().unwrap();
        assert!(prompt.starts_with("what is B?"));
        assert!(prompt.contains("B\nA\nC"), "passages ordered by distance: {prompt}");
    }

    #[tokio::test]
    async fn generation_failure_is_propagated() {
        let temp_dir = TempDir::new().unwrap();
        let embedder = Arc::new(StubEmbedder {
            calls: AtomicUsize::new(0),
        });
        let chat = Arc::new(StubChat::new(true));
        let service = service_at(&temp_dir, embedder, chat);

        let err = service.answer("what is B?").await.unwrap_err();
        assert!(matches!(err, RagError::Generation(_)));
    }
}
