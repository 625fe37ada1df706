//! Flat dense vector index.
//!
//! Vectors live in a single contiguous arena (`doc_ids.len() * dimension`
//! floats) with a parallel id array. Search is an exact scan with a bounded
//! min-heap, which is plenty for a legal corpus of a few thousand articles.

use crate::config;
use crate::dense::distance::{dot_product_f32, DistanceMetric};
use crate::error::IndexError;
use crate::search::RankedHit;
use crate::storage::{load_snapshot, save_snapshot, Snapshot};
use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};
use std::cmp::Reverse;
use std::collections::BinaryHeap;
use std::path::Path;

/// Precomputed document embeddings, tagged with the model that produced them.
#[derive(Debug, Serialize, Deserialize)]
pub struct DenseIndex {
    model: String,
    dimension: usize,
    metric: DistanceMetric,
    doc_ids: Vec<String>,
    vectors: Vec<f32>,
}

impl Snapshot for DenseIndex {
    const MAGIC: &'static [u8; 4] = b"JDN1";

    fn validate(&self) -> Result<(), String> {
        if self.dimension == 0 || self.dimension > config::MAX_DIMENSION {
            return Err(format!(
                "dimension {} outside 1..={}",
                self.dimension,
                config::MAX_DIMENSION
            ));
        }
        if self.vectors.len() != self.doc_ids.len() * self.dimension {
            return Err(format!(
                "vectors length {} != doc_count({}) * dimension({})",
                self.vectors.len(),
                self.doc_ids.len(),
                self.dimension
            ));
        }
        if self.model.is_empty() {
            return Err("embedding model name is empty".into());
        }
        Ok(())
    }
}

impl DenseIndex {
    /// Creates an empty index for vectors of `dimension` produced by `model`.
    pub fn new(
        model: impl Into<String>,
        dimension: usize,
        metric: DistanceMetric,
    ) -> Result<Self, IndexError> {
        let index = Self {
            model: model.into(),
            dimension,
            metric,
            doc_ids: Vec::new(),
            vectors: Vec::new(),
        };
        index.validate().map_err(IndexError::Invalid)?;
        Ok(index)
    }

    /// Appends the embedding of document `id`.
    pub fn add(&mut self, id: impl Into<String>, vector: &[f32]) -> Result<(), IndexError> {
        if vector.len() != self.dimension {
            return Err(IndexError::Invalid(format!(
                "vector dimension {} != index dimension {}",
                vector.len(),
                self.dimension
            )));
        }
        self.doc_ids.push(id.into());
        self.vectors.extend_from_slice(vector);
        Ok(())
    }

    /// Rank stored documents by similarity to `query`, best first.
    ///
    /// Returns `min(top_k, len)` hits; equal similarities keep insertion order.
    pub fn search(&self, query: &[f32], top_k: usize) -> Result<Vec<RankedHit>, IndexError> {
        if query.len() != self.dimension {
            return Err(IndexError::Invalid(format!(
                "query dimension {} != index dimension {}",
                query.len(),
                self.dimension
            )));
        }
        let k = top_k.min(config::MAX_K);
        if k == 0 || self.doc_ids.is_empty() {
            return Ok(Vec::new());
        }

        let query_norm_sq = dot_product_f32(query, query);
        let mut heap: BinaryHeap<Reverse<(OrderedFloat<f32>, Reverse<u32>)>> =
            BinaryHeap::with_capacity(k + 1);
        for (id, stored) in self.vectors.chunks_exact(self.dimension).enumerate() {
            let sim = self.metric.similarity_prenorm(query, stored, query_norm_sq);
            if sim.is_nan() {
                continue;
            }
            heap.push(Reverse((OrderedFloat(sim), Reverse(id as u32))));
            if heap.len() > k {
                heap.pop();
            }
        }

        let mut results: Vec<(u32, f32)> = heap
            .into_iter()
            .map(|Reverse((s, Reverse(id)))| (id, s.0))
            .collect();
        results.sort_unstable_by(|a, b| {
            b.1.partial_cmp(&a.1)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(a.0.cmp(&b.0))
        });
        Ok(results
            .into_iter()
            .map(|(id, score)| RankedHit {
                doc_id: self.doc_ids[id as usize].clone(),
                score,
            })
            .collect())
    }

    /// Embedding model the stored vectors were produced with.
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Vector dimension.
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Similarity metric used at query time.
    pub fn metric(&self) -> DistanceMetric {
        self.metric
    }

    /// Number of stored vectors.
    pub fn len(&self) -> usize {
        self.doc_ids.len()
    }

    /// Returns `true` if no vector is stored.
    pub fn is_empty(&self) -> bool {
        self.doc_ids.is_empty()
    }

    /// Persist the index as a checksummed snapshot.
    pub fn save(&self, path: &Path) -> Result<(), IndexError> {
        save_snapshot(self, path)
    }

    /// Load a previously saved index.
    pub fn load(path: &Path) -> Result<Self, IndexError> {
        let index: Self = load_snapshot(path)?;
        tracing::info!(
            "Loaded dense index {:?} ({} vectors, dim={}, model={})",
            path,
            index.doc_ids.len(),
            index.dimension,
            index.model
        );
        Ok(index)
    }
}
