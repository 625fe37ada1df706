//! The ranking capability shared by lexical and semantic retrieval.
//!
//! Fusion depends only on [`Ranker`], so any number of ranking sources can be
//! combined. Both implementations are read-only and safe to query concurrently.

use crate::embedding::Embedder;
use crate::error::RagError;
use async_trait::async_trait;
use juridoc_core::{DenseIndex, LexicalRanker, RankedHit};
use std::sync::Arc;

/// Ranks corpus documents for a query.
#[async_trait]
pub trait Ranker: Send + Sync {
    /// Short label for logs and metrics.
    fn name(&self) -> &str;

    /// At most `top_k` hits, best first. `top_k == 0` yields no hits.
    async fn retrieve(&self, query: &str, top_k: usize) -> Result<Vec<RankedHit>, RagError>;
}

#[async_trait]
impl Ranker for LexicalRanker {
    fn name(&self) -> &str {
        "bm25"
    }

    async fn retrieve(&self, query: &str, top_k: usize) -> Result<Vec<RankedHit>, RagError> {
        Ok(LexicalRanker::retrieve(self, query, top_k))
    }
}

/// Dense retrieval: embeds the query, then scans the vector index.
pub struct SemanticRanker {
    index: DenseIndex,
    embedder: Arc<dyn Embedder>,
}

impl std::fmt::Debug for SemanticRanker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SemanticRanker")
            .field("model", &self.index.model())
            .field("dimension", &self.index.dimension())
            .field("documents", &self.index.len())
            .finish()
    }
}

impl SemanticRanker {
    /// Pairs `index` with `embedder` after probing the embedder once.
    ///
    /// Fails when the embedder reports a different model than the index was
    /// built with, cannot be reached, or returns vectors of the wrong size.
    pub async fn new(index: DenseIndex, embedder: Arc<dyn Embedder>) -> Result<Self, RagError> {
        if embedder.model() != index.model() {
            return Err(RagError::Configuration(format!(
                "embedding model mismatch: index built with '{}', embedder serves '{}'",
                index.model(),
                embedder.model()
            )));
        }
        let probe = embedder
            .embed_query("test")
            .await
            .map_err(|e| RagError::Configuration(format!("embedder probe failed: {e}")))?;
        if probe.len() != index.dimension() {
            return Err(RagError::Configuration(format!(
                "embedding dimension mismatch: index expects {}, embedder returned {}",
                index.dimension(),
                probe.len()
            )));
        }
        tracing::info!(
            model = index.model(),
            dimension = index.dimension(),
            documents = index.len(),
            "Semantic ranker ready"
        );
        Ok(Self { index, embedder })
    }

    pub fn index(&self) -> &DenseIndex {
        &self.index
    }
}

#[async_trait]
impl Ranker for SemanticRanker {
    fn name(&self) -> &str {
        "dense"
    }

    async fn retrieve(&self, query: &str, top_k: usize) -> Result<Vec<RankedHit>, RagError> {
        if top_k == 0 || self.index.is_empty() {
            return Ok(Vec::new());
        }
        let vector = self.embedder.embed_query(query).await?;
        Ok(self.index.search(&vector, top_k)?)
    }
}
