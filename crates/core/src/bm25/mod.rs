//! BM25+ lexical retrieval: French tokenizer, inverted index, scoring and the
//! [`LexicalRanker`] that maps internal ids back to corpus document ids.

/// Inverted index mapping terms to postings lists.
pub mod inverted_index;
/// Lexical ranker over a persisted BM25+ index.
pub mod ranker;
/// BM25+ scoring engine.
pub mod scorer;
/// French tokenizer with stop word removal.
pub mod tokenizer;

pub use inverted_index::InvertedIndex;
pub use ranker::LexicalRanker;
pub use scorer::{bm25plus_search, Bm25Params};
pub use tokenizer::tokenize;
