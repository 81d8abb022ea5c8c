//! In-memory vector index with brute-force cosine search

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::types::Passage;

/// A passage plus its similarity to the query, as returned by search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredPassage {
    pub passage: Passage,
    pub score: f32,
}

#[derive(Debug, Clone)]
struct IndexEntry {
    passage: Passage,
    vector: Vec<f32>,
}

/// Immutable index over one document's passages.
///
/// Search is an exact scan over every entry. A chat session holds at most a
/// few thousand passages, where a scan beats any approximate structure.
#[derive(Debug, Clone)]
pub struct VectorIndex {
    dimension: usize,
    entries: Vec<IndexEntry>,
}

impl VectorIndex {
    /// Build an index from parallel passage and vector lists.
    ///
    /// The lists must be the same length, and every vector must have exactly
    /// `dimension` finite components.
    pub fn build(passages: Vec<Passage>, vectors: Vec<Vec<f32>>, dimension: usize) -> Result<Self> {
        if passages.len() != vectors.len() {
            return Err(Error::DimensionMismatch {
                expected: passages.len(),
                actual: vectors.len(),
            });
        }
        if dimension == 0 {
            return Err(Error::internal("index dimension must be greater than zero"));
        }

        let mut entries = Vec::with_capacity(passages.len());
        for (passage, vector) in passages.into_iter().zip(vectors) {
            if vector.len() != dimension {
                return Err(Error::DimensionMismatch {
                    expected: dimension,
                    actual: vector.len(),
                });
            }
            if vector.iter().any(|v| !v.is_finite()) {
                return Err(Error::internal(format!(
                    "vector for passage {} contains a non-finite component",
                    passage.index
                )));
            }
            entries.push(IndexEntry { passage, vector });
        }

        Ok(Self { dimension, entries })
    }

    /// Return the `k` entries most similar to `query`, best first.
    ///
    /// Ties break toward the earlier passage so results are deterministic.
    /// Asking for more results than the index holds returns everything.
    pub fn search(&self, query: &[f32], k: usize) -> Result<Vec<ScoredPassage>> {
        if query.len() != self.dimension {
            return Err(Error::DimensionMismatch {
                expected: self.dimension,
                actual: query.len(),
            });
        }
        if self.entries.is_empty() || k == 0 {
            return Ok(Vec::new());
        }

        let mut scored: Vec<ScoredPassage> = self
            .entries
            .iter()
            .map(|entry| ScoredPassage {
                passage: entry.passage.clone(),
                score: cosine_similarity(query, &entry.vector),
            })
            .collect();

        scored.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.passage.index.cmp(&b.passage.index))
        });
        scored.truncate(k);
        Ok(scored)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }
}

/// Cosine similarity of two vectors. Mismatched or zero-norm inputs score
/// 0.0 rather than poisoning the ranking with NaN.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let mut dot = 0.0f32;
    let mut norm_a = 0.0f32;
    let mut norm_b = 0.0f32;
    for (x, y) in a.iter().zip(b) {
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a.sqrt() * norm_b.sqrt())
}
