//! Lexical ranker: a persisted BM25+ index plus the corpus ids it was built over.

use crate::bm25::inverted_index::InvertedIndex;
use crate::bm25::scorer::{bm25plus_search, Bm25Params};
use crate::config;
use crate::error::IndexError;
use crate::search::RankedHit;
use crate::storage::{load_snapshot, save_snapshot, Snapshot};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// BM25+ ranker over corpus passages.
///
/// Internal u32 IDs are positions in `doc_ids`, i.e. corpus insertion order,
/// which is also the tie-break order for equal scores.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct LexicalRanker {
    doc_ids: Vec<String>,
    index: InvertedIndex,
    params: Bm25Params,
}

impl Snapshot for LexicalRanker {
    const MAGIC: &'static [u8; 4] = b"JLX1";

    fn validate(&self) -> Result<(), String> {
        self.index.validate()?;
        if self.doc_ids.len() != self.index.doc_count as usize {
            return Err(format!(
                "doc_ids length {} != doc_count {}",
                self.doc_ids.len(),
                self.index.doc_count
            ));
        }
        Ok(())
    }
}

impl LexicalRanker {
    /// Build an index over `(id, text)` pairs with default parameters.
    pub fn fit<I, S, T>(documents: I) -> Self
    where
        I: IntoIterator<Item = (S, T)>,
        S: Into<String>,
        T: AsRef<str>,
    {
        Self::fit_with_params(documents, Bm25Params::default())
    }

    /// Build an index over `(id, text)` pairs with explicit BM25+ parameters.
    pub fn fit_with_params<I, S, T>(documents: I, params: Bm25Params) -> Self
    where
        I: IntoIterator<Item = (S, T)>,
        S: Into<String>,
        T: AsRef<str>,
    {
        let mut ranker = Self {
            doc_ids: Vec::new(),
            index: InvertedIndex::new(),
            params,
        };
        for (id, text) in documents {
            ranker.index.add_document(text.as_ref());
            ranker.doc_ids.push(id.into());
        }
        tracing::debug!(
            documents = ranker.doc_ids.len(),
            terms = ranker.index.index.len(),
            "Lexical index built"
        );
        ranker
    }

    /// Rank documents for `query`, best first, at most `top_k` hits.
    ///
    /// Never fails: an empty index or `top_k == 0` yields no hits.
    pub fn retrieve(&self, query: &str, top_k: usize) -> Vec<RankedHit> {
        let k = top_k.min(config::MAX_K);
        bm25plus_search(&self.index, query, k, &self.params)
            .into_iter()
            .map(|(internal_id, score)| RankedHit {
                doc_id: self.doc_ids[internal_id as usize].clone(),
                score,
            })
            .collect()
    }

    /// Number of indexed documents.
    pub fn len(&self) -> usize {
        self.doc_ids.len()
    }

    /// Returns `true` if nothing is indexed.
    pub fn is_empty(&self) -> bool {
        self.doc_ids.is_empty()
    }

    /// BM25+ parameters this index scores with.
    pub fn params(&self) -> &Bm25Params {
        &self.params
    }

    /// Persist the index as a checksummed snapshot.
    pub fn save(&self, path: &Path) -> Result<(), IndexError> {
        save_snapshot(self, path)
    }

    /// Load a previously saved index.
    pub fn load(path: &Path) -> Result<Self, IndexError> {
        let ranker: Self = load_snapshot(path)?;
        tracing::info!(
            "Loaded lexical index {:?} ({} documents, {} terms)",
            path,
            ranker.doc_ids.len(),
            ranker.index.index.len()
        );
        Ok(ranker)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn corpus() -> Vec<(&'static str, &'static str)> {
        vec![
            ("cf-53", "Le divorce sous contrôle judiciaire peut être demandé par les époux"),
            ("cf-84", "La pension alimentaire des enfants est due par le père"),
            ("cp-505", "Quiconque soustrait frauduleusement une chose commet le vol"),
            ("ct-41", "Le licenciement abusif donne droit à une indemnité"),
        ]
    }

    #[test]
    fn test_retrieve_maps_ids() {
        let ranker = LexicalRanker::fit(corpus());
        let hits = ranker.retrieve("divorce judiciaire", 2);
        assert_eq!(hits[0].doc_id, "cf-53");
        assert!(hits.len() <= 2);
    }

    #[test]
    fn test_scores_descending() {
        let ranker = LexicalRanker::fit(corpus());
        let hits = ranker.retrieve("pension enfants divorce", 10);
        for pair in hits.windows(2) {
            assert!(pair[0].score >= pair[1].score);
        }
    }

    #[test]
    fn test_document_text_as_query_ranks_itself_first() {
        let ranker = LexicalRanker::fit(corpus());
        for (id, text) in corpus() {
            let hits = ranker.retrieve(text, 1);
            assert_eq!(hits[0].doc_id, id);
        }
    }

    #[test]
    fn test_empty_ranker() {
        let ranker = LexicalRanker::fit(Vec::<(String, String)>::new());
        assert!(ranker.is_empty());
        assert!(ranker.retrieve("divorce", 5).is_empty());
    }

    #[test]
    fn test_zero_top_k() {
        let ranker = LexicalRanker::fit(corpus());
        assert!(ranker.retrieve("divorce", 0).is_empty());
    }

    #[test]
    fn test_save_load_preserves_results() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sparse").join("bm25_plus.idx");
        let ranker = LexicalRanker::fit(corpus());
        ranker.save(&path).unwrap();
        let loaded = LexicalRanker::load(&path).unwrap();
        assert_eq!(loaded.len(), 4);
        assert_eq!(
            ranker.retrieve("vol frauduleusement", 3),
            loaded.retrieve("vol frauduleusement", 3)
        );
    }
}
