//! Markdown extraction from repository archives.
//!
//! Walks every entry of a downloaded zip archive and yields a [`Document`]
//! for each non-directory `.md`/`.mdx` entry. GitHub archives wrap the
//! repository in a synthetic `name-branch/` top-level folder, which is
//! stripped from each filename. Entries that are not valid UTF-8 are
//! skipped with a warning; one bad entry never fails the batch.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result};

use crate::models::Document;

/// Maximum decompressed bytes to read from a single zip entry
/// (zip-bomb protection).
const MAX_ENTRY_BYTES: u64 = 50 * 1024 * 1024;

/// Extract all markdown documents from the archive at `archive_path`.
///
/// Documents are returned in archive enumeration order. The order is
/// deterministic for a given archive but carries no further meaning.
pub fn extract_documents(archive_path: &Path) -> Result<Vec<Document>> {
    let file = File::open(archive_path)
        .with_context(|| format!("failed to open archive: {}", archive_path.display()))?;
    let mut archive = zip::ZipArchive::new(file)
        .with_context(|| format!("failed to read archive: {}", archive_path.display()))?;

    let mut documents = Vec::new();

    for i in 0..archive.len() {
        let mut entry = archive
            .by_index(i)
            .with_context(|| format!("failed to read archive entry {}", i))?;

        let entry_name = entry.name().to_string();
        if !is_markdown(&entry_name) || entry.is_dir() {
            continue;
        }

        // Read one byte past the cap so an over-limit entry is detected
        // and skipped whole, never indexed truncated.
        let mut bytes = Vec::new();
        if let Err(e) = entry.take(MAX_ENTRY_BYTES + 1).read_to_end(&mut bytes) {
            eprintln!("Warning: skipping {}: {}", entry_name, e);
            continue;
        }
        if bytes.len() as u64 > MAX_ENTRY_BYTES {
            eprintln!(
                "Warning: skipping {}: exceeds {} byte limit",
                entry_name, MAX_ENTRY_BYTES
            );
            continue;
        }

        match String::from_utf8(bytes) {
            Ok(content) => documents.push(Document::new(strip_root(&entry_name), content)),
            Err(e) => {
                eprintln!("Warning: skipping {}: {}", entry_name, e);
            }
        }
    }

    Ok(documents)
}

/// Selection rule: only `.md` and `.mdx` entries are indexable.
fn is_markdown(name: &str) -> bool {
    name.ends_with(".md") || name.ends_with(".mdx")
}

/// Strip the archive's synthetic top-level folder from an entry name.
///
/// `repo-main/docs/intro.md` becomes `docs/intro.md`. A name without a
/// path separator is returned unchanged.
fn strip_root(name: &str) -> &str {
    match name.split_once('/') {
        Some((_, rest)) if !rest.is_empty() => rest,
        _ => name,
    }
}
