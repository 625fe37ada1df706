//! Similarity metric implementations for dense retrieval.
//!
//! All metrics report a similarity where **higher is better**, so dense hits
//! sort the same way as lexical hits. Loops are chunked by 8 so the compiler
//! can auto-vectorize them.

use serde::{Deserialize, Serialize};

/// Similarity metric used to compare a query vector with stored vectors.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum DistanceMetric {
    /// Cosine similarity. Range: \[-1, 1\].
    #[default]
    Cosine,
    /// Raw dot product. Equivalent to cosine on L2-normalized embeddings.
    DotProduct,
    /// Negated squared euclidean distance. Range: (-∞, 0\].
    Euclidean,
}

impl DistanceMetric {
    /// Similarity between `query` and a stored vector.
    pub fn similarity(&self, query: &[f32], stored: &[f32]) -> f32 {
        match self {
            DistanceMetric::Cosine => cosine_f32(query, stored),
            DistanceMetric::DotProduct => dot_product_f32(query, stored),
            DistanceMetric::Euclidean => -euclidean_sq_f32(query, stored),
        }
    }

    /// Cosine similarity with a precomputed query norm squared.
    /// Other metrics delegate to [`DistanceMetric::similarity`].
    pub fn similarity_prenorm(&self, query: &[f32], stored: &[f32], query_norm_sq: f32) -> f32 {
        match self {
            DistanceMetric::Cosine => {
                let dot = dot_product_f32(query, stored);
                let stored_norm_sq = dot_product_f32(stored, stored);
                let denom = (query_norm_sq * stored_norm_sq).sqrt();
                if denom == 0.0 {
                    0.0
                } else {
                    dot / denom
                }
            }
            _ => self.similarity(query, stored),
        }
    }
}

/// Dot product between two f32 slices.
#[inline]
pub fn dot_product_f32(a: &[f32], b: &[f32]) -> f32 {
    let len = a.len().min(b.len());
    let (a, b) = (&a[..len], &b[..len]);
    let mut acc = [0.0f32; 8];
    let chunks = len / 8;
    for c in 0..chunks {
        let base = c * 8;
        for lane in 0..8 {
            acc[lane] += a[base + lane] * b[base + lane];
        }
    }
    let mut sum: f32 = acc.iter().sum();
    for i in chunks * 8..len {
        sum += a[i] * b[i];
    }
    sum
}

/// Squared Euclidean distance between two f32 slices.
#[inline]
pub fn euclidean_sq_f32(a: &[f32], b: &[f32]) -> f32 {
    let len = a.len().min(b.len());
    let (a, b) = (&a[..len], &b[..len]);
    let mut acc = [0.0f32; 8];
    let chunks = len / 8;
    for c in 0..chunks {
        let base = c * 8;
        for lane in 0..8 {
            let d = a[base + lane] - b[base + lane];
            acc[lane] += d * d;
        }
    }
    let mut sum: f32 = acc.iter().sum();
    for i in chunks * 8..len {
        let d = a[i] - b[i];
        sum += d * d;
    }
    sum
}

/// Cosine similarity between two f32 slices. Zero vectors have similarity 0.
#[inline]
pub fn cosine_f32(a: &[f32], b: &[f32]) -> f32 {
    let dot = dot_product_f32(a, b);
    let denom = (dot_product_f32(a, a) * dot_product_f32(b, b)).sqrt();
    if denom == 0.0 {
        0.0
    } else {
        dot / denom
    }
}
