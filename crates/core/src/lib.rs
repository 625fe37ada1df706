//! # juridoc-core
//!
//! Hybrid retrieval engine for French-language legal question answering:
//! BM25+ lexical ranking, flat dense-vector ranking, Reciprocal Rank Fusion,
//! keyword-based query routing, citation formatting and prompt construction.
//!
//! This is the core library crate with zero async dependencies. Embedding
//! models and generation backends plug in from the assistant crate.

/// BM25+ lexical ranking: French tokenizer, inverted index, scorer and ranker.
pub mod bm25;
/// Global configuration constants and the hybrid fusion configuration.
pub mod config;
/// Context assembly, reference formatting and citation projection.
pub mod context;
/// Corpus store trait and the JSON-backed corpus.
pub mod corpus;
/// Flat dense-vector index and similarity metrics.
pub mod dense;
/// Core document types: `Document` struct and `MetadataValue` enum.
pub mod document;
/// Errors raised while loading or saving artifacts.
pub mod error;
/// System prompts, user templates and sampling profiles.
pub mod prompt;
/// Generator output cleanup.
pub mod response;
/// Keyword routing between conversational and legal turns.
pub mod routing;
/// Search primitives: ranked hits, fused results and RRF.
pub mod search;
/// Snapshot persistence for index artifacts.
pub mod storage;

pub use bm25::LexicalRanker;
pub use config::HybridConfig;
pub use corpus::{Corpus, CorpusStore};
pub use dense::{DenseIndex, DistanceMetric};
pub use document::{Document, Metadata, MetadataValue};
pub use error::IndexError;
pub use prompt::{Prompt, SamplingConfig};
pub use routing::{QueryClassifier, Route, RoutingConfig};
pub use search::{rrf_fuse, ArticleCitation, FusedHit, RankedHit, RetrievedDocument};
