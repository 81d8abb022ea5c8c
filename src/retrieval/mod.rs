//! Similarity search over the session index

pub mod index;

pub use index::{cosine_similarity, ScoredPassage, VectorIndex};

use std::sync::Arc;

use crate::error::Result;
use crate::providers::EmbeddingProvider;

/// Embeds a question and runs it against a vector index.
pub struct Retriever {
    embedder: Arc<dyn EmbeddingProvider>,
}

impl Retriever {
    pub fn new(embedder: Arc<dyn EmbeddingProvider>) -> Self {
        Self { embedder }
    }

    /// Return the `top_k` passages most relevant to `question`, best first.
    pub async fn retrieve(
        &self,
        question: &str,
        index: &VectorIndex,
        top_k: usize,
    ) -> Result<Vec<ScoredPassage>> {
        let query = self.embedder.embed(question).await?;
        index.search(&query, top_k)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::testutil::KeywordEmbedder;
    use crate::types::Passage;

    fn passage(index: usize, text: &str) -> Passage {
        Passage {
            index,
            text: text.to_string(),
            char_start: 0,
            char_end: text.chars().count(),
        }
    }

    #[tokio::test]
    async fn retrieves_the_matching_passage_first() {
        let embedder = Arc::new(KeywordEmbedder);
        let passages = vec![
            passage(0, "Cats are mammals."),
            passage(1, "Dogs are mammals."),
        ];
        let vectors = vec![
            embedder.embed("Cats are mammals.").await.unwrap(),
            embedder.embed("Dogs are mammals.").await.unwrap(),
        ];
        let index = VectorIndex::build(passages, vectors, embedder.dimensions()).unwrap();

        let retriever = Retriever::new(embedder);
        let hits = retriever
            .retrieve("Tell me about cats", &index, 2)
            .await
            .unwrap();
        assert_eq!(hits.len(), 2);
        assert!(hits[0].passage.text.contains("Cats"));
        assert!(hits[0].score > hits[1].score);
    }

    #[tokio::test]
    async fn embedding_failures_propagate() {
        let embedder = Arc::new(KeywordEmbedder);
        let index = VectorIndex::build(vec![], vec![], embedder.dimensions()).unwrap();

        let retriever = Retriever::new(embedder);
        let err = retriever.retrieve("", &index, 2).await.unwrap_err();
        assert!(matches!(err, crate::error::Error::Embedding(_)));
    }
}
