//! Retrieval over a folder of text documents
//!
//! ```text
//! data_dir/*.txt → load_documents → chunk_text → Embedder → VectorIndex
//!                                                               ↓
//!                        query → Embedder → cosine top-k → Vec<String>
//! ```
//!
//! When building the index fails the session keeps running on a
//! [`StubRetriever`], which answers every query with one placeholder chunk.

pub mod documents;
pub mod index;
pub mod seed;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use futures_util::future::BoxFuture;
use tracing::{debug, info, warn};

use crate::ollama::{EmbedError, Embedder};

pub use documents::{chunk_text, load_documents, Chunk, Document};
pub use index::{cosine_similarity, ScoredChunk, VectorIndex};
pub use seed::{seed_example_documents, EXAMPLE_DOCUMENTS};

/// Number of chunks returned per query
pub const DEFAULT_TOP_K: usize = 2;

/// Text returned by the stub retriever
pub const STUB_CHUNK: &str =
    "A real index could not be built; this is a simulated answer from the knowledge base.";

/// Error type for loading and indexing documents
#[derive(Debug, thiserror::Error)]
pub enum RetrievalError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("no readable documents in {0}")]
    NoDocuments(PathBuf),
    #[error("embedding failed: {0}")]
    Embed(#[from] EmbedError),
}

/// Maps a query to relevant text chunks, most relevant first.
pub trait Retriever: Send + Sync {
    fn retrieve<'a>(&'a self, query: &'a str) -> BoxFuture<'a, Result<Vec<String>, RetrievalError>>;

    /// Short label for status output.
    fn kind(&self) -> &'static str;
}

/// Similarity search over an embedded [`VectorIndex`]
pub struct VectorRetriever {
    index: VectorIndex,
    embedder: Arc<dyn Embedder>,
    top_k: usize,
}

impl VectorRetriever {
    pub fn new(index: VectorIndex, embedder: Arc<dyn Embedder>, top_k: usize) -> Self {
        Self {
            index,
            embedder,
            top_k,
        }
    }
}

impl Retriever for VectorRetriever {
    fn retrieve<'a>(&'a self, query: &'a str) -> BoxFuture<'a, Result<Vec<String>, RetrievalError>> {
        Box::pin(async move {
            let input = [query.to_string()];
            let mut vectors = self.embedder.embed(&input).await?;
            let query_vector = vectors.pop().unwrap_or_default();
            let hits = self.index.search(&query_vector, self.top_k);
            for hit in &hits {
                debug!(source = %hit.source, score = hit.score, "Retrieved chunk");
            }
            Ok(hits.into_iter().map(|hit| hit.text).collect())
        })
    }

    fn kind(&self) -> &'static str {
        "vector"
    }
}

/// Fallback used when no real index exists
#[derive(Debug, Default, Clone, Copy)]
pub struct StubRetriever;

impl Retriever for StubRetriever {
    fn retrieve<'a>(&'a self, _query: &'a str) -> BoxFuture<'a, Result<Vec<String>, RetrievalError>> {
        Box::pin(async { Ok(vec![STUB_CHUNK.to_string()]) })
    }

    fn kind(&self) -> &'static str {
        "stub"
    }
}

/// Result of [`build_index`]: always carries a usable retriever.
pub struct IndexOutcome {
    pub retriever: Arc<dyn Retriever>,
    /// `false` when the stub retriever was substituted
    pub built: bool,
    pub documents: usize,
}

async fn try_build(dir: &Path, embedder: Arc<dyn Embedder>) -> Result<(VectorIndex, usize), RetrievalError> {
    let documents = load_documents(dir)?;
    if documents.is_empty() {
        return Err(RetrievalError::NoDocuments(dir.to_path_buf()));
    }
    let chunks: Vec<Chunk> = documents.iter().flat_map(Document::chunks).collect();
    let index = VectorIndex::build(chunks, embedder.as_ref()).await?;
    Ok((index, documents.len()))
}

/// Load, embed and index every document in `dir`.
///
/// Never fails: on any error the failure is reported and a
/// [`StubRetriever`] is returned with `built == false`.
pub async fn build_index(dir: &Path, embedder: Arc<dyn Embedder>, top_k: usize) -> IndexOutcome {
    match try_build(dir, embedder.clone()).await {
        Ok((index, documents)) => {
            info!(documents, chunks = index.len(), "Vector index built");
            println!("✅ Index built from {} documents", documents);
            IndexOutcome {
                retriever: Arc::new(VectorRetriever::new(index, embedder, top_k)),
                built: true,
                documents,
            }
        }
        Err(e) => {
            warn!(error = %e, dir = %dir.display(), "Index build failed, using stub retriever");
            println!("❌ Could not build the index: {}", e);
            IndexOutcome {
                retriever: Arc::new(StubRetriever),
                built: false,
                documents: 0,
            }
        }
    }
}
