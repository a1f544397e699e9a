//! In-memory ranked text index over a document collection.
//!
//! Both `content` and `filename` are indexed as free-text fields. Scoring
//! is TF-IDF: per-document term frequency normalized by document length,
//! weighted by the inverse document frequency of each query term. Ties are
//! broken by document insertion order, so results are stable across
//! repeated calls on an unchanged index.
//!
//! The index is immutable after construction — a rebuild means discarding
//! it and building a new one. Building from an empty collection succeeds
//! and yields an index that returns no results for any query.

use std::collections::HashMap;

use crate::models::Document;

/// Number of results returned when the caller does not specify `k`.
pub const DEFAULT_NUM_RESULTS: usize = 5;

/// Per-document term statistics.
struct DocTerms {
    /// Term → occurrence count across content and filename.
    counts: HashMap<String, usize>,
    /// Total token count, used for length normalization.
    len: usize,
}

/// Immutable inverted term-frequency index over one document collection.
pub struct TextIndex {
    docs: Vec<DocTerms>,
    /// Term → number of documents containing it.
    doc_freqs: HashMap<String, usize>,
}

impl TextIndex {
    /// Build an index over `documents`. Document identity is the position
    /// in the slice; callers keep the collection alongside the index.
    pub fn build(documents: &[Document]) -> Self {
        let mut docs = Vec::with_capacity(documents.len());
        let mut doc_freqs: HashMap<String, usize> = HashMap::new();

        for doc in documents {
            let mut counts: HashMap<String, usize> = HashMap::new();
            let mut len = 0usize;
            for token in tokenize(&doc.content).chain(tokenize(&doc.filename)) {
                *counts.entry(token).or_insert(0) += 1;
                len += 1;
            }
            for term in counts.keys() {
                *doc_freqs.entry(term.clone()).or_insert(0) += 1;
            }
            docs.push(DocTerms { counts, len });
        }

        Self { docs, doc_freqs }
    }

    /// Number of indexed documents.
    pub fn len(&self) -> usize {
        self.docs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.docs.is_empty()
    }

    /// Return the indices of the top `k` documents for `query`, ranked by
    /// descending TF-IDF score. Documents with no matching term are not
    /// returned. `k <= 0` (here: `k == 0`) yields an empty result.
    pub fn search(&self, query: &str, k: usize) -> Vec<usize> {
        if k == 0 || self.docs.is_empty() {
            return Vec::new();
        }

        let terms: Vec<String> = tokenize(query).collect();
        if terms.is_empty() {
            return Vec::new();
        }

        let total = self.docs.len() as f64;
        let mut scored: Vec<(usize, f64)> = Vec::new();

        for (doc_id, doc) in self.docs.iter().enumerate() {
            if doc.len == 0 {
                continue;
            }
            let mut score = 0.0;
            for term in &terms {
                let tf = match doc.counts.get(term) {
                    Some(&count) => count as f64 / doc.len as f64,
                    None => continue,
                };
                let df = self.doc_freqs.get(term).copied().unwrap_or(0) as f64;
                // Smoothed IDF; stays positive even for terms present in
                // every document.
                let idf = (1.0 + (total / (1.0 + df)).ln()).max(0.0) + f64::EPSILON;
                score += tf * idf;
            }
            if score > 0.0 {
                scored.push((doc_id, score));
            }
        }

        // Descending score; equal scores keep insertion order.
        scored.sort_by(|a, b| {
            b.1.partial_cmp(&a.1)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(a.0.cmp(&b.0))
        });
        scored.truncate(k);
        scored.into_iter().map(|(doc_id, _)| doc_id).collect()
    }
}

/// Lowercased alphanumeric tokens of `text`.
fn tokenize(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(|t| t.to_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(filename: &str, content: &str) -> Document {
        Document::new(filename, content)
    }

    #[test]
    fn empty_collection_builds_and_returns_nothing() {
        let index = TextIndex::build(&[]);
        assert!(index.is_empty());
        assert!(index.search("anything", 5).is_empty());
    }

    #[test]
    fn zero_k_yields_empty_not_error() {
        let index = TextIndex::build(&[doc("a.md", "demo text")]);
        assert!(index.search("demo", 0).is_empty());
    }

    #[test]
    fn empty_query_yields_empty() {
        let index = TextIndex::build(&[doc("a.md", "demo text")]);
        assert!(index.search("", 5).is_empty());
        assert!(index.search("   ", 5).is_empty());
    }

    #[test]
    fn matching_document_ranks_first() {
        let docs = vec![
            doc("other.md", "nothing relevant here"),
            doc("demo.md", "a demo of the demo feature"),
            doc("misc.md", "unrelated words entirely"),
        ];
        let index = TextIndex::build(&docs);
        let hits = index.search("demo", 5);
        assert_eq!(hits.first(), Some(&1));
    }

    #[test]
    fn filename_terms_are_indexed() {
        let docs = vec![
            doc("install.md", "run the setup script"),
            doc("usage.md", "run the binary"),
        ];
        let index = TextIndex::build(&docs);
        let hits = index.search("install", 5);
        assert_eq!(hits, vec![0]);
    }

    #[test]
    fn query_matching_nothing_yields_empty() {
        let index = TextIndex::build(&[doc("a.md", "alpha beta")]);
        assert!(index.search("zeta", 5).is_empty());
    }

    #[test]
    fn results_are_capped_at_k() {
        let docs: Vec<Document> = (0..10)
            .map(|i| doc(&format!("{}.md", i), "common word"))
            .collect();
        let index = TextIndex::build(&docs);
        assert_eq!(index.search("common", 3).len(), 3);
    }

    #[test]
    fn ties_break_by_insertion_order() {
        let docs = vec![
            doc("first.md", "same text"),
            doc("second.md", "same text"),
            doc("third.md", "same text"),
        ];
        let index = TextIndex::build(&docs);
        let hits = index.search("same", 5);
        assert_eq!(hits, vec![0, 1, 2]);
    }

    #[test]
    fn search_is_deterministic_across_calls() {
        let docs = vec![
            doc("a.md", "rust cargo crates"),
            doc("b.md", "rust tokio async"),
            doc("c.md", "rust serde json"),
        ];
        let index = TextIndex::build(&docs);
        let first = index.search("rust", 5);
        let second = index.search("rust", 5);
        assert_eq!(first, second);
    }

    #[test]
    fn term_density_outranks_raw_count() {
        let docs = vec![
            doc("a.md", "deploy deploy deploy guide guide"),
            doc("b.md", "guide"),
            doc("c.md", "deploy notes"),
        ];
        let index = TextIndex::build(&docs);
        // b.md is almost entirely "guide"; length normalization puts it
        // ahead of a.md despite a.md's higher raw count.
        let hits = index.search("guide", 5);
        assert_eq!(hits.first(), Some(&1));
    }

    #[test]
    fn multi_term_query_accumulates_score() {
        let docs = vec![
            doc("a.md", "vector search with embeddings"),
            doc("b.md", "keyword search only"),
        ];
        let index = TextIndex::build(&docs);
        let hits = index.search("vector search", 5);
        assert_eq!(hits.first(), Some(&0));
        assert_eq!(hits.len(), 2);
    }
}
