//! juridoc-assistant: retrieval-augmented answering over the juridoc core.
//!
//! Provides the async ranker, embedder and generator seams, the Gemini and
//! embedding HTTP clients, and the [`Assistant`] orchestrator.
//! Retrieval logic lives in `juridoc-core`.

/// Embedding clients used by the semantic ranker.
pub mod embedding;
/// Error types for startup and per-request failures.
pub mod error;
/// Text generation backends: trait and Gemini client.
pub mod generation;
/// Metrics recording through the `metrics` facade.
pub mod metrics;
/// The orchestrator: routing, hybrid retrieval, prompting and answer events.
pub mod pipeline;
/// Async ranking capability with lexical and semantic variants.
pub mod ranker;
/// Process settings and startup wiring.
pub mod settings;

pub use error::{GenerationFailure, RagError};
pub use pipeline::{Answer, AnswerEvent, AnswerMode, AnswerOutput, Assistant};
