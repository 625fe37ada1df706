//! Context assembly: joins fused ids with the corpus and renders the
//! citation-friendly context block handed to the generator.

use crate::corpus::CorpusStore;
use crate::document::{
    placeholder_metadata, Metadata, MetadataValue, META_ARTICLE_ID, META_ARTICLE_NUMBER,
    META_CODE, META_CODE_DISPLAY, META_REFERENCE,
};
use crate::search::{ArticleCitation, FusedHit, RetrievedDocument};

/// Placeholder header for documents without usable citation metadata.
pub const UNKNOWN_REFERENCE: &str = "Unknown Reference";

/// Retrieved documents in fused order plus their rendered context block.
#[derive(Debug, Clone, PartialEq)]
pub struct AssembledContext {
    pub documents: Vec<RetrievedDocument>,
    pub context: String,
    /// Fused ids that did not resolve in the corpus.
    pub misses: usize,
}

/// Resolves fused hits against `corpus` and formats the context block.
///
/// Unresolved ids degrade to empty text and `{"id": <id>}` metadata.
pub fn assemble(fused: &[FusedHit], corpus: &dyn CorpusStore) -> AssembledContext {
    let mut misses = 0;
    let documents: Vec<RetrievedDocument> = fused
        .iter()
        .map(|hit| {
            let text = corpus.get_text(&hit.doc_id);
            let metadata = corpus.get_metadata(&hit.doc_id);
            if text.is_none() || metadata.is_none() {
                misses += 1;
                tracing::warn!(doc_id = %hit.doc_id, "Fused id missing from corpus");
            }
            RetrievedDocument {
                id: hit.doc_id.clone(),
                text: text.unwrap_or_default().to_string(),
                score: hit.score,
                metadata: metadata
                    .cloned()
                    .unwrap_or_else(|| placeholder_metadata(&hit.doc_id)),
            }
        })
        .collect();
    let context = format_context(&documents);
    AssembledContext {
        documents,
        context,
        misses,
    }
}

/// Renders `[Document i] <reference>\n<text>` blocks separated by blank lines.
///
/// Positions are 1-based. An empty slice renders as an empty string.
pub fn format_context(documents: &[RetrievedDocument]) -> String {
    documents
        .iter()
        .enumerate()
        .map(|(i, doc)| {
            format!(
                "[Document {}] {}\n{}",
                i + 1,
                format_article_reference(&doc.metadata),
                doc.text
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Builds the header line for one document.
///
/// Code label: `code_display`, else title-cased `code`. Article label:
/// `Article <article_number>`, else `Article <article_id>`, else `reference`.
/// Labels are joined with `" - "`. Keys count as present even when empty,
/// but a `null` value is treated as absent.
pub fn format_article_reference(metadata: &Metadata) -> String {
    let mut parts = Vec::with_capacity(2);

    if let Some(display) = present(metadata, META_CODE_DISPLAY) {
        parts.push(display.to_string());
    } else if let Some(code) = present(metadata, META_CODE) {
        parts.push(humanize_code(code));
    }

    if let Some(number) = present(metadata, META_ARTICLE_NUMBER) {
        parts.push(format!("Article {number}"));
    } else if let Some(id) = present(metadata, META_ARTICLE_ID) {
        parts.push(format!("Article {id}"));
    } else if let Some(reference) = present(metadata, META_REFERENCE) {
        parts.push(reference.to_string());
    }

    if parts.is_empty() {
        UNKNOWN_REFERENCE.to_string()
    } else {
        parts.join(" - ")
    }
}

impl From<&RetrievedDocument> for ArticleCitation {
    /// Display projection. Empty, zero or false values fall through to the next key.
    fn from(doc: &RetrievedDocument) -> Self {
        let meta = &doc.metadata;
        let article_number = truthy(meta, META_ARTICLE_NUMBER)
            .or_else(|| truthy(meta, META_ARTICLE_ID))
            .or_else(|| truthy(meta, META_REFERENCE))
            .map(ToString::to_string);
        let code = truthy(meta, META_CODE_DISPLAY)
            .map(ToString::to_string)
            .or_else(|| truthy(meta, META_CODE).map(humanize_code));
        ArticleCitation {
            article_number,
            code,
            text: doc.text.clone(),
        }
    }
}

/// Citations for every retrieved document, in order.
pub fn citations(documents: &[RetrievedDocument]) -> Vec<ArticleCitation> {
    documents.iter().map(ArticleCitation::from).collect()
}

/// Set to anything but `null`.
fn present<'a>(metadata: &'a Metadata, key: &str) -> Option<&'a MetadataValue> {
    metadata.get(key).filter(|v| **v != MetadataValue::Null)
}

fn truthy<'a>(metadata: &'a Metadata, key: &str) -> Option<&'a MetadataValue> {
    metadata.get(key).filter(|v| v.is_truthy())
}

fn humanize_code(code: &MetadataValue) -> String {
    title_case(&code.to_string().replace('_', " "))
}

/// Uppercases the first letter of every run of letters and lowercases the rest.
///
/// Any non-letter starts a new word, so `"l'article"` becomes `"L'Article"`.
pub fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut prev_letter = false;
    for c in s.chars() {
        if c.is_alphabetic() {
            if prev_letter {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            prev_letter = true;
        } else {
            out.push(c);
            prev_letter = false;
        }
    }
    out
}
