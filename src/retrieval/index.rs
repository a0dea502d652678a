//! In-memory vector index with cosine similarity ranking

use std::cmp::Ordering;

use crate::ollama::Embedder;

use super::{Chunk, RetrievalError};

/// Inputs per embedding request
const EMBED_BATCH: usize = 16;

/// A search hit
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredChunk {
    pub source: String,
    pub text: String,
    pub score: f32,
}

/// Embedded chunks held in memory
#[derive(Debug, Default)]
pub struct VectorIndex {
    entries: Vec<(Chunk, Vec<f32>)>,
}

impl VectorIndex {
    /// Embed every chunk and keep the vectors alongside the text.
    pub async fn build(chunks: Vec<Chunk>, embedder: &dyn Embedder) -> Result<Self, RetrievalError> {
        let mut entries = Vec::with_capacity(chunks.len());
        for batch in chunks.chunks(EMBED_BATCH) {
            let inputs: Vec<String> = batch.iter().map(|c| c.text.clone()).collect();
            let vectors = embedder.embed(&inputs).await?;
            entries.extend(batch.iter().cloned().zip(vectors));
        }
        Ok(Self { entries })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Top `k` chunks by cosine similarity, best first.
    pub fn search(&self, query: &[f32], k: usize) -> Vec<ScoredChunk> {
        let mut scored: Vec<ScoredChunk> = self
            .entries
            .iter()
            .map(|(chunk, vector)| ScoredChunk {
                source: chunk.source.clone(),
                text: chunk.text.clone(),
                score: cosine_similarity(query, vector),
            })
            .collect();

        scored.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));
        scored.truncate(k);
        scored
    }
}

/// Cosine similarity; 0 for empty, zero-length or mismatched vectors.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.is_empty() || b.is_empty() || a.len() != b.len() {
        return 0.0;
    }

    let dot = a.iter().zip(b).map(|(x, y)| x * y).sum::<f32>();
    let a_norm = a.iter().map(|value| value * value).sum::<f32>().sqrt();
    let b_norm = b.iter().map(|value| value * value).sum::<f32>().sqrt();

    if a_norm == 0.0 || b_norm == 0.0 {
        return 0.0;
    }

    dot / (a_norm * b_norm)
}
