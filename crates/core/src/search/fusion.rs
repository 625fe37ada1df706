//! Reciprocal Rank Fusion.
//!
//! Combines ranked lists from heterogeneous rankers using rank positions only:
//! `score(d) = Σ 1 / (k + rank_i(d) + 1)` with 0-based ranks. Raw ranker scores
//! are ignored, so BM25+ weights and cosine similarities need no normalization.
//! A document absent from a list gets no contribution from it.
//!
//! Equal fused scores keep the order in which ids were first seen while
//! walking the lists in order. That tie-break is deterministic but carries no
//! meaning beyond that.

use crate::search::types::{FusedHit, RankedHit};
use std::collections::HashMap;

/// Fuse ranked lists with RRF and keep the best `top_k`.
pub fn rrf_fuse(rankings: &[Vec<RankedHit>], k: usize, top_k: usize) -> Vec<FusedHit> {
    if top_k == 0 {
        return Vec::new();
    }
    let capacity: usize = rankings.iter().map(Vec::len).sum();
    let mut position: HashMap<&str, usize> = HashMap::with_capacity(capacity);
    let mut fused: Vec<FusedHit> = Vec::with_capacity(capacity);

    for ranking in rankings {
        for (rank, hit) in ranking.iter().enumerate() {
            let contribution = 1.0 / (k as f32 + rank as f32 + 1.0);
            match position.get(hit.doc_id.as_str()) {
                Some(&slot) => fused[slot].score += contribution,
                None => {
                    position.insert(hit.doc_id.as_str(), fused.len());
                    fused.push(FusedHit {
                        doc_id: hit.doc_id.clone(),
                        score: contribution,
                    });
                }
            }
        }
    }

    // Stable: equal scores stay in first-seen order
    fused.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    fused.truncate(top_k);
    fused
}
