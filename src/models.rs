//! Core data models used throughout docdex.
//!
//! These types represent the documents that flow from archive extraction
//! through indexing to search results.

use serde::Serialize;

/// One indexable unit of text extracted from a repository archive.
///
/// `filename` is the path relative to the repository root with the
/// archive's synthetic top-level folder stripped (e.g. `docs/intro.md`,
/// never `repo-main/docs/intro.md`). Immutable once extracted.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Document {
    pub filename: String,
    pub content: String,
}

impl Document {
    pub fn new(filename: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            filename: filename.into(),
            content: content.into(),
        }
    }
}
