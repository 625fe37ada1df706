//! Search primitives: ranked hits, fused results and Reciprocal Rank Fusion.

/// Reciprocal Rank Fusion over any number of ranked lists.
pub mod fusion;
/// Hit, fused result, retrieved document and citation types.
pub mod types;

pub use fusion::rrf_fuse;
pub use types::{ArticleCitation, FusedHit, RankedHit, RetrievedDocument};
