//! Process-wide cache of built documentation indexes.
//!
//! Maps a repository key (`owner/name/branch`) to its extracted document
//! collection and the [`TextIndex`] built over it. Entries are created
//! lazily on first search and replaced wholesale on forced refresh; there
//! is no eviction (no TTL, no capacity bound).
//!
//! The registry is an explicit value constructed once at startup and
//! passed by handle to every consumer (no ambient global state), so tests
//! can isolate themselves with fresh registries.
//!
//! Concurrent `get_index` calls for the same key under `force = true` may
//! race and perform duplicate downloads and builds; the last write wins.
//! That is acceptable: the operation is idempotent and produces an
//! equivalent index. On any failure mid-pipeline the previous entry is
//! left untouched — there is never a partial entry.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use anyhow::Result;

use crate::extract::extract_documents;
use crate::fetch::ArchiveFetcher;
use crate::index::TextIndex;
use crate::models::Document;
use crate::reference::RepoRef;

/// An immutable built entry: the document collection and its index.
///
/// Rebuilds replace the whole `Arc`; an entry is never mutated in place,
/// so a handle obtained before a refresh stays internally consistent.
pub struct RepoIndex {
    pub documents: Vec<Document>,
    pub index: TextIndex,
}

impl RepoIndex {
    /// Search this entry, returning cloned documents in rank order.
    pub fn search(&self, query: &str, k: usize) -> Vec<Document> {
        self.index
            .search(query, k)
            .into_iter()
            .map(|doc_id| self.documents[doc_id].clone())
            .collect()
    }
}

/// Registry of built indexes, keyed by `owner/name/branch`.
pub struct DocsRegistry {
    fetcher: ArchiveFetcher,
    entries: RwLock<HashMap<String, Arc<RepoIndex>>>,
}

impl DocsRegistry {
    pub fn new(fetcher: ArchiveFetcher) -> Self {
        Self {
            fetcher,
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Get the built index for `repo`, downloading and indexing on the
    /// first call (or whenever `force` is set). Cached calls perform no
    /// I/O and return the same handle.
    pub fn get_index(&self, repo: &RepoRef, force: bool) -> Result<Arc<RepoIndex>> {
        let key = repo.key();

        if !force {
            let entries = self.entries.read().unwrap();
            if let Some(entry) = entries.get(&key) {
                return Ok(entry.clone());
            }
        }

        // Fetch, extract, and build without holding the lock; the entry is
        // only replaced once the whole pipeline has succeeded.
        let archive_path = self.fetcher.fetch(repo, force)?;
        let documents = extract_documents(&archive_path)?;
        println!("Indexed {} documents from {}", documents.len(), key);
        let index = TextIndex::build(&documents);
        let entry = Arc::new(RepoIndex { documents, index });

        let mut entries = self.entries.write().unwrap();
        entries.insert(key, entry.clone());
        Ok(entry)
    }

    /// Resolve `reference`, build or reuse its index, and return the top
    /// `k` documents for `query`.
    pub fn search(&self, reference: &str, query: &str, k: usize) -> Result<Vec<Document>> {
        let repo = RepoRef::parse(reference)?;
        let entry = self.get_index(&repo, false)?;
        Ok(entry.search(query, k))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use zip::write::SimpleFileOptions;

    /// Seed the cache directory with an archive so no network is touched.
    fn seed_archive(cache_dir: &std::path::Path, repo: &RepoRef, entries: &[(&str, &str)]) {
        std::fs::create_dir_all(cache_dir).unwrap();
        let path = cache_dir.join(repo.archive_filename());
        let mut writer = zip::ZipWriter::new(std::fs::File::create(path).unwrap());
        let options = SimpleFileOptions::default();
        for (name, body) in entries {
            writer.start_file(*name, options).unwrap();
            writer.write_all(body.as_bytes()).unwrap();
        }
        writer.finish().unwrap();
    }

    fn registry_with_seed(entries: &[(&str, &str)]) -> (tempfile::TempDir, DocsRegistry, RepoRef) {
        let dir = tempfile::tempdir().unwrap();
        let repo = RepoRef::parse("owner/repo").unwrap();
        seed_archive(dir.path(), &repo, entries);
        // Unroutable host: any accidental network call fails loudly.
        let fetcher = ArchiveFetcher::new(dir.path(), "http://127.0.0.1:1");
        let registry = DocsRegistry::new(fetcher);
        (dir, registry, repo)
    }

    #[test]
    fn first_search_builds_from_cached_archive() {
        let (_dir, registry, _repo) = registry_with_seed(&[
            ("repo-main/README.md", "a quick demo of the tool"),
            ("repo-main/other.md", "nothing of note"),
        ]);

        let results = registry.search("owner/repo", "demo", 5).unwrap();
        assert_eq!(results[0].filename, "README.md");
    }

    #[test]
    fn second_get_returns_same_handle_without_rebuilding() {
        let (_dir, registry, repo) =
            registry_with_seed(&[("repo-main/README.md", "hello world")]);

        let first = registry.get_index(&repo, false).unwrap();
        let second = registry.get_index(&repo, false).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn cached_entry_ignores_changed_archive_until_forced() {
        let (dir, registry, repo) =
            registry_with_seed(&[("repo-main/README.md", "original content")]);

        let first = registry.get_index(&repo, false).unwrap();

        // Remote content changed under us. Without force the in-memory
        // entry is authoritative and no I/O happens. (The force=true
        // re-download path needs a live host; see tests/integration.rs.)
        seed_archive(
            dir.path(),
            &repo,
            &[("repo-main/README.md", "rewritten content")],
        );
        let second = registry.get_index(&repo, false).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert!(second.documents[0].content.contains("original"));
    }

    #[test]
    fn failed_build_leaves_prior_entry_untouched() {
        let (dir, registry, repo) =
            registry_with_seed(&[("repo-main/README.md", "stable content")]);

        let before = registry.get_index(&repo, false).unwrap();

        // Corrupt the cached archive, then force: the fetch itself fails
        // (unroutable host), so the registry entry must survive.
        std::fs::write(dir.path().join(repo.archive_filename()), b"junk").unwrap();
        assert!(registry.get_index(&repo, true).is_err());

        let after = registry.get_index(&repo, false).unwrap();
        assert!(Arc::ptr_eq(&before, &after));
    }

    #[test]
    fn invalid_reference_propagates() {
        let (_dir, registry, _repo) = registry_with_seed(&[]);
        assert!(registry.search("justoneword", "query", 5).is_err());
    }

    #[test]
    fn empty_archive_searches_to_empty() {
        let (_dir, registry, _repo) = registry_with_seed(&[]);
        let results = registry.search("owner/repo", "anything", 5).unwrap();
        assert!(results.is_empty());
    }

    #[test]
    fn distinct_branches_are_distinct_entries() {
        let dir = tempfile::tempdir().unwrap();
        let main = RepoRef::parse("owner/repo").unwrap();
        let dev = RepoRef::parse("https://github.com/owner/repo/tree/dev").unwrap();
        seed_archive(dir.path(), &main, &[("repo-main/a.md", "main branch docs")]);
        seed_archive(dir.path(), &dev, &[("repo-dev/a.md", "dev branch docs")]);

        let registry = DocsRegistry::new(ArchiveFetcher::new(dir.path(), "http://127.0.0.1:1"));
        let main_entry = registry.get_index(&main, false).unwrap();
        let dev_entry = registry.get_index(&dev, false).unwrap();
        assert!(main_entry.documents[0].content.contains("main"));
        assert!(dev_entry.documents[0].content.contains("dev"));
    }
}
