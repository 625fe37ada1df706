//! BM25+ scoring engine.
//!
//! `score(d, q) = Σ idf(t) · (δ + tf·(k1+1) / (k1·(1 − b + b·|d|/avgdl) + tf))`
//! with `idf(t) = ln((N + 1) / df(t))`. Every query token occurrence counts,
//! and documents lacking an in-vocabulary term still receive the `δ` floor.
//! Parameters default to [`crate::config`].

use crate::bm25::inverted_index::InvertedIndex;
use crate::bm25::tokenizer::tokenize;
use crate::config;
use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};
use std::cmp::Reverse;
use std::collections::BinaryHeap;

/// BM25+ tuning parameters, persisted alongside the index they were built for.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bm25Params {
    pub k1: f32,
    pub b: f32,
    pub delta: f32,
}

impl Default for Bm25Params {
    fn default() -> Self {
        Self {
            k1: config::BM25_K1,
            b: config::BM25_B,
            delta: config::BM25_DELTA,
        }
    }
}

/// Score every indexed document against `query`.
///
/// Returns one score per internal ID. Empty when the index is empty.
pub fn bm25plus_scores(index: &InvertedIndex, query: &str, params: &Bm25Params) -> Vec<f32> {
    let n = index.doc_count as usize;
    let mut scores = vec![0.0f32; n];
    if n == 0 {
        return scores;
    }

    let avgdl = index.average_doc_length();
    let corpus_size = n as f32;
    let Bm25Params { k1, b, delta } = *params;

    for token in tokenize(query).iter() {
        let Some(postings) = index.index.get(token) else {
            // Out-of-vocabulary terms contribute nothing
            continue;
        };
        let df = postings.len() as f32;
        let idf = ((corpus_size + 1.0) / df).ln();

        // tf = 0 part: every document gets the delta floor
        let floor = idf * delta;
        for s in scores.iter_mut() {
            *s += floor;
        }

        for posting in postings {
            let dl = index.doc_lengths[posting.doc_id as usize] as f32;
            let tf = posting.term_frequency as f32;
            let tf_norm = (tf * (k1 + 1.0)) / (k1 * (1.0 - b + b * dl / avgdl) + tf);
            scores[posting.doc_id as usize] += idf * tf_norm;
        }
    }
    scores
}

/// Top-`k` BM25+ search.
///
/// Returns `(internal_id, score)` sorted by descending score; equal scores keep
/// insertion order (lower internal ID first). Documents whose score is not
/// strictly positive are dropped.
pub fn bm25plus_search(
    index: &InvertedIndex,
    query: &str,
    k: usize,
    params: &Bm25Params,
) -> Vec<(u32, f32)> {
    if k == 0 || index.doc_count == 0 {
        return Vec::new();
    }
    let scores = bm25plus_scores(index, query, params);

    // Partial sort: O(n log k) via min-heap of size k. The heap key ranks a
    // lower internal ID above a higher one at equal score.
    let mut heap: BinaryHeap<Reverse<(OrderedFloat<f32>, Reverse<u32>)>> =
        BinaryHeap::with_capacity(k + 1);
    for (id, &score) in scores.iter().enumerate() {
        if score <= 0.0 || score.is_nan() {
            continue;
        }
        heap.push(Reverse((OrderedFloat(score), Reverse(id as u32))));
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
    results
}
