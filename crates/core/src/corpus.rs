//! Corpus store: id → passage text and citation metadata.

use crate::document::{Document, Metadata};
use crate::error::IndexError;
use std::collections::HashMap;
use std::path::Path;

/// Read-only lookup of corpus entries by id.
///
/// Misses return `None`; callers decide how to degrade.
pub trait CorpusStore: Send + Sync {
    fn get_text(&self, id: &str) -> Option<&str>;
    fn get_metadata(&self, id: &str) -> Option<&Metadata>;
}

/// In-memory corpus loaded from a JSON array of documents.
#[derive(Debug, Default)]
pub struct Corpus {
    documents: Vec<Document>,
    by_id: HashMap<String, usize>,
}

impl Corpus {
    /// Builds a corpus, keeping the first document for each duplicated id.
    pub fn from_documents(documents: impl IntoIterator<Item = Document>) -> Self {
        let mut corpus = Corpus::default();
        for doc in documents {
            if corpus.by_id.contains_key(&doc.id) {
                tracing::warn!(id = %doc.id, "Duplicate corpus id, keeping first occurrence");
                continue;
            }
            corpus.by_id.insert(doc.id.clone(), corpus.documents.len());
            corpus.documents.push(doc);
        }
        corpus
    }

    /// Loads `[{"id", "text", "metadata"}, ...]` from `path`.
    pub fn load(path: &Path) -> Result<Self, IndexError> {
        let raw = std::fs::read(path).map_err(|e| IndexError::io(path, e))?;
        let documents: Vec<Document> =
            serde_json::from_slice(&raw).map_err(|e| IndexError::Decode {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?;
        let corpus = Self::from_documents(documents);
        tracing::info!("Loaded corpus with {} documents from {:?}", corpus.len(), path);
        Ok(corpus)
    }

    pub fn get(&self, id: &str) -> Option<&Document> {
        self.by_id.get(id).map(|&i| &self.documents[i])
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}

impl CorpusStore for Corpus {
    fn get_text(&self, id: &str) -> Option<&str> {
        self.get(id).map(|d| d.text.as_str())
    }

    fn get_metadata(&self, id: &str) -> Option<&Metadata> {
        self.get(id).map(|d| &d.metadata)
    }
}
