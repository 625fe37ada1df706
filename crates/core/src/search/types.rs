//! Result types flowing from rankers through fusion to context assembly.

use crate::document::Metadata;
use serde::{Deserialize, Serialize};

/// One ranker's verdict on one document.
///
/// The score is ranker-specific (BM25+ weight, cosine similarity, ...) and is
/// never compared across rankers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedHit {
    pub doc_id: String,
    pub score: f32,
}

impl RankedHit {
    pub fn new(doc_id: impl Into<String>, score: f32) -> Self {
        Self {
            doc_id: doc_id.into(),
            score,
        }
    }
}

/// A document's position in the fused ranking. Higher `score` is better.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FusedHit {
    pub doc_id: String,
    pub score: f32,
}

/// A fused hit joined with its corpus entry.
///
/// Unresolved ids carry empty text and `{"id": <id>}` metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetrievedDocument {
    pub id: String,
    pub text: String,
    pub score: f32,
    pub metadata: Metadata,
}

/// Display-ready citation for one retrieved article.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArticleCitation {
    /// Article number, article id or free-form reference, whichever is set first.
    pub article_number: Option<String>,
    /// Human-readable code name.
    pub code: Option<String>,
    /// Article text.
    pub text: String,
}
