//! Keyword-frequency relevance scorer.
//!
//! DESIGN
//! ======
//! Not a ranking engine. Each query token longer than one character is
//! counted as a literal, non-overlapping substring of the lower-cased
//! `name + content`, and the per-document sum is the score. Zero-score
//! documents are dropped and the top `MAX_SOURCES` are returned.
//!
//! Ties keep input order: `sort_by` is stable, so documents earlier in the
//! slice win when scores are equal.

#[cfg(test)]
#[path = "retrieval_test.rs"]
mod retrieval_test;

use crate::model::{Document, Source};

/// Maximum number of documents returned by [`score`].
pub const MAX_SOURCES: usize = 3;
/// Excerpt length in characters before the trailing ellipsis.
pub const EXCERPT_CHARS: usize = 150;
const RELEVANCE_BASE: usize = 60;
const RELEVANCE_STEP: usize = 10;
const RELEVANCE_CAP: usize = 95;

/// A document that matched at least one query keyword.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ScoredDocument {
    pub document_id: String,
    pub document_name: String,
    /// Raw keyword hit count.
    pub score: usize,
    pub excerpt: String,
    /// Display relevance in `60..=95`.
    pub relevance: u8,
}

impl ScoredDocument {
    /// Convert into the citation shape stored on chat messages.
    #[must_use]
    pub fn into_source(self) -> Source {
        Source { document_name: self.document_name, excerpt: self.excerpt, relevance: self.relevance }
    }
}

/// Split a query into lower-cased keywords, dropping single-character tokens.
#[must_use]
pub fn keywords(query: &str) -> Vec<String> {
    query
        .split_whitespace()
        .filter(|token| token.chars().count() > 1)
        .map(str::to_lowercase)
        .collect()
}

/// Score and rank `documents` against `query`.
#[must_use]
pub fn score(query: &str, documents: &[Document]) -> Vec<ScoredDocument> {
    let keywords = keywords(query);
    if keywords.is_empty() {
        return Vec::new();
    }

    let mut hits: Vec<(&Document, usize)> = documents
        .iter()
        .map(|doc| {
            let haystack = format!("{} {}", doc.name, doc.text()).to_lowercase();
            let hits = keywords.iter().map(|kw| haystack.matches(kw.as_str()).count()).sum();
            (doc, hits)
        })
        .filter(|(_, hits)| *hits > 0)
        .collect();

    hits.sort_by(|a, b| b.1.cmp(&a.1));

    hits.into_iter()
        .take(MAX_SOURCES)
        .map(|(doc, hits)| ScoredDocument {
            document_id: doc.id.clone(),
            document_name: doc.name.clone(),
            score: hits,
            excerpt: excerpt(doc.text()),
            relevance: relevance(hits),
        })
        .collect()
}

/// First [`EXCERPT_CHARS`] characters followed by `...`.
#[must_use]
pub fn excerpt(content: &str) -> String {
    let mut out: String = content.chars().take(EXCERPT_CHARS).collect();
    out.push_str("...");
    out
}

/// `min(95, 60 + hits * 10)`.
#[must_use]
pub fn relevance(hits: usize) -> u8 {
    let value = RELEVANCE_BASE
        .saturating_add(hits.saturating_mul(RELEVANCE_STEP))
        .min(RELEVANCE_CAP);
    u8::try_from(value).unwrap_or(u8::MAX)
}
