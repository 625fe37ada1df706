//! Inverted index for BM25+ lexical search.
//!
//! Maps terms to postings lists (document ID + term frequency). Documents are
//! identified by internal u32 IDs assigned in corpus insertion order.

use crate::bm25::tokenizer::tokenize;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A single entry in a term's postings list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Posting {
    /// Internal u32 document ID.
    pub doc_id: u32,
    /// Number of times the term appears in this document.
    pub term_frequency: u32,
}

/// Inverted index mapping terms to postings lists.
///
/// Document lengths are tracked for BM25+ length normalization. Postings
/// within a list are ordered by internal ID.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct InvertedIndex {
    /// term → list of postings
    pub index: HashMap<String, Vec<Posting>>,
    /// internal_id → document length (number of tokens). Indexed by u32 internal ID.
    pub doc_lengths: Vec<u32>,
    /// Total number of documents indexed
    pub doc_count: u32,
    /// Sum of all document lengths (for average calculation)
    pub total_doc_length: u64,
}

impl InvertedIndex {
    /// Creates a new empty inverted index.
    pub fn new() -> Self {
        Self::default()
    }

    /// Index a document's text under the next internal ID and return that ID.
    ///
    /// Documents without any indexable token still count toward the corpus
    /// size and the average length.
    pub fn add_document(&mut self, text: &str) -> u32 {
        let internal_id = self.doc_count;
        let tokens = tokenize(text);
        let doc_len = tokens.len() as u32;

        self.doc_lengths.push(doc_len);
        self.doc_count += 1;
        self.total_doc_length += doc_len as u64;

        // Count term frequencies for this doc
        let mut tf_map: HashMap<&str, u32> = HashMap::new();
        for token in tokens.iter() {
            *tf_map.entry(token).or_insert(0) += 1;
        }

        for (term, tf) in tf_map {
            self.index
                .entry(term.to_string())
                .or_default()
                .push(Posting {
                    doc_id: internal_id,
                    term_frequency: tf,
                });
        }
        internal_id
    }

    /// Returns the average document length across all indexed documents.
    pub fn average_doc_length(&self) -> f32 {
        if self.doc_count == 0 {
            return 0.0;
        }
        self.total_doc_length as f32 / self.doc_count as f32
    }

    /// Validate internal invariants after deserialization.
    pub fn validate(&self) -> Result<(), String> {
        if self.doc_lengths.len() != self.doc_count as usize {
            return Err(format!(
                "doc_lengths length {} != doc_count {}",
                self.doc_lengths.len(),
                self.doc_count
            ));
        }
        let total: u64 = self.doc_lengths.iter().map(|&l| l as u64).sum();
        if total != self.total_doc_length {
            return Err(format!(
                "sum of doc_lengths {} != total_doc_length {}",
                total, self.total_doc_length
            ));
        }
        for (term, postings) in &self.index {
            if let Some(p) = postings.iter().find(|p| p.doc_id >= self.doc_count) {
                return Err(format!(
                    "posting for '{}' references doc {} (doc_count={})",
                    term, p.doc_id, self.doc_count
                ));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_document_updates_index() {
        let mut idx = InvertedIndex::new();
        let id = idx.add_document("le tribunal de première instance");
        assert_eq!(id, 0);
        assert_eq!(idx.doc_count, 1);
        assert!(idx.index.contains_key("tribunal"));
        assert!(idx.index.contains_key("première"));
        assert!(idx.index.contains_key("instance"));
        // "le" and "de" are stop words, should not be indexed
        assert!(!idx.index.contains_key("le"));
        assert!(!idx.index.contains_key("de"));
    }

    #[test]
    fn test_term_frequency() {
        let mut idx = InvertedIndex::new();
        idx.add_document("pension pension pension alimentaire");
        let postings = idx.index.get("pension").unwrap();
        assert_eq!(postings.len(), 1);
        assert_eq!(postings[0].term_frequency, 3);
    }

    #[test]
    fn test_sequential_ids_and_postings() {
        let mut idx = InvertedIndex::new();
        assert_eq!(idx.add_document("contrat de bail"), 0);
        assert_eq!(idx.add_document("contrat de travail"), 1);
        assert_eq!(idx.doc_count, 2);
        assert_eq!(idx.index["contrat"].len(), 2);
        assert_eq!(idx.index["bail"].len(), 1);
        assert!(!idx.index.contains_key("absent"));
    }

    #[test]
    fn test_empty_document_counts() {
        let mut idx = InvertedIndex::new();
        idx.add_document("de la");
        idx.add_document("garde enfant");
        assert_eq!(idx.doc_count, 2);
        assert_eq!(idx.doc_lengths, vec![0, 2]);
        assert_eq!(idx.average_doc_length(), 1.0);
    }

    #[test]
    fn test_average_doc_length_empty() {
        assert_eq!(InvertedIndex::new().average_doc_length(), 0.0);
    }

    #[test]
    fn test_validate_detects_mismatch() {
        let mut idx = InvertedIndex::new();
        idx.add_document("mariage polygamie");
        assert!(idx.validate().is_ok());
        idx.doc_lengths.push(3);
        assert!(idx.validate().is_err());
    }
}
