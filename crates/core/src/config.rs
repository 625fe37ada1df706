//! Global configuration constants for juridoc.
//!
//! Retrieval tuning, generation budgets and sampling parameters are defined
//! here as compile-time defaults. Runtime overrides come from the hybrid
//! configuration file ([`HybridConfig`]) and from CLI arguments and
//! environment variables in the assistant binary.

use serde::{Deserialize, Serialize};
use std::path::Path;

/// BM25+ term frequency saturation parameter.
pub const BM25_K1: f32 = 1.5;

/// BM25+ document length normalization parameter.
///
/// 0.0 = no normalization, 1.0 = full normalization.
pub const BM25_B: f32 = 0.75;

/// BM25+ lower bound added to every in-vocabulary query term.
///
/// Keeps long documents from being scored below documents that do not
/// contain the term at all.
pub const BM25_DELTA: f32 = 1.0;

/// Reciprocal Rank Fusion damping constant `k`.
///
/// Used in `1 / (k + rank + 1)` with 0-based ranks. Larger values flatten the
/// influence of rank differences; smaller values let top ranks dominate.
pub const RRF_K: usize = 20;

/// Number of fused documents handed to context assembly.
pub const DEFAULT_TOP_K: usize = 3;

/// Candidate pool requested from each individual ranker before fusion.
pub const DEFAULT_PER_RETRIEVER_K: usize = 50;

/// Output token budget for conversational (non-grounded) turns.
pub const CONVERSATIONAL_MAX_TOKENS: u32 = 300;

/// Output token budget for grounded legal turns.
pub const LEGAL_MAX_TOKENS: u32 = 800;

/// Sampling temperature for conversational turns.
pub const CONVERSATIONAL_TEMPERATURE: f32 = 0.7;

/// Sampling temperature for grounded legal turns.
pub const LEGAL_TEMPERATURE: f32 = 0.5;

/// Nucleus sampling mass shared by both profiles.
pub const SAMPLING_TOP_P: f32 = 0.9;

/// Top-k sampling cutoff shared by both profiles.
pub const SAMPLING_TOP_K: u32 = 40;

/// Maximum accepted embedding dimension for dense index artifacts.
pub const MAX_DIMENSION: usize = 4096;

/// Maximum `top_k` accepted by any ranker.
pub const MAX_K: usize = 10_000;

/// Default embedding model the dense index is expected to be built with.
pub const DEFAULT_EMBEDDING_MODEL: &str = "intfloat/multilingual-e5-large";

/// Default instruction prefix for e5-family query embeddings.
pub const DEFAULT_QUERY_INSTRUCTION: &str = "query: ";

/// Default generation model.
pub const DEFAULT_GENERATION_MODEL: &str = "gemini-2.0-flash";

/// Default Gemini REST base URL.
pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Per-request timeout for generator and embedder HTTP calls, in seconds.
pub const REQUEST_TIMEOUT_SECS: u64 = 60;

/// Fusion and truncation parameters for hybrid retrieval.
///
/// Loaded once at startup from a small JSON file; every field is optional and
/// falls back to the constants above.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HybridConfig {
    /// RRF damping constant.
    pub rrf_k: usize,
    /// Number of fused documents kept for context assembly.
    pub top_k: usize,
    /// Candidate pool requested from each ranker.
    pub per_retriever_k: usize,
}

impl Default for HybridConfig {
    fn default() -> Self {
        Self {
            rrf_k: RRF_K,
            top_k: DEFAULT_TOP_K,
            per_retriever_k: DEFAULT_PER_RETRIEVER_K,
        }
    }
}

impl HybridConfig {
    /// Reads the configuration from `path`.
    ///
    /// A missing file yields the defaults. A present but malformed file, or one
    /// whose values are out of range, is an error.
    pub fn load(path: &Path) -> Result<Self, String> {
        if !path.exists() {
            tracing::info!("No hybrid config at {:?}, using defaults", path);
            return Ok(Self::default());
        }
        let raw = std::fs::read_to_string(path)
            .map_err(|e| format!("cannot read hybrid config {:?}: {}", path, e))?;
        let config: HybridConfig = serde_json::from_str(&raw)
            .map_err(|e| format!("invalid hybrid config {:?}: {}", path, e))?;
        config.validate()?;
        Ok(config)
    }

    /// Checks value ranges.
    pub fn validate(&self) -> Result<(), String> {
        if self.top_k == 0 || self.top_k > MAX_K {
            return Err(format!("top_k must be in 1..={MAX_K}, got {}", self.top_k));
        }
        if self.per_retriever_k == 0 || self.per_retriever_k > MAX_K {
            return Err(format!(
                "per_retriever_k must be in 1..={MAX_K}, got {}",
                self.per_retriever_k
            ));
        }
        if self.per_retriever_k < self.top_k {
            tracing::warn!(
                per_retriever_k = self.per_retriever_k,
                top_k = self.top_k,
                "per_retriever_k is smaller than top_k; fusion has little room to reorder"
            );
        }
        Ok(())
    }
}
