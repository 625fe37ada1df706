//! Dense (embedding) retrieval: similarity metrics and a flat vector index.
//!
//! The index stores vectors in one contiguous arena and answers queries with
//! an exact scan. Query embedding happens outside this crate; this module only
//! ranks precomputed vectors.

/// Similarity metrics: cosine, dot product and euclidean.
pub mod distance;
/// Flat vector index keyed by corpus document id.
pub mod index;

pub use distance::DistanceMetric;
pub use index::DenseIndex;
