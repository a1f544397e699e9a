//! Repository archive download with on-disk caching.
//!
//! Archives are fetched from `<host>/<owner>/<name>/archive/refs/heads/<branch>.zip`
//! and stored under the cache directory as `<owner>-<name>-<branch>.zip`.
//! Presence of a correctly named file is a cache hit — no checksum or
//! freshness validation. Downloads are blocking and are not retried here;
//! callers may retry by issuing the call again.

use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::reference::RepoRef;

/// Error produced when an archive cannot be downloaded or written.
#[derive(Debug)]
pub enum FetchError {
    /// Network-level failure (DNS, connect, timeout).
    Http(String),
    /// Non-2xx response from the archive host (e.g. nonexistent branch).
    Status(u16, String),
    /// Filesystem failure while writing the cache file.
    Io(String),
}

impl std::fmt::Display for FetchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FetchError::Http(e) => write!(f, "archive download failed: {}", e),
            FetchError::Status(code, url) => {
                write!(f, "archive host returned HTTP {} for {}", code, url)
            }
            FetchError::Io(e) => write!(f, "failed to write archive to cache: {}", e),
        }
    }
}

impl std::error::Error for FetchError {}

/// Downloads repository archives and caches them on disk.
///
/// The fetcher owns the cache directory and the archive host base URL.
/// Construct one per process (or per test) and pass it by reference.
pub struct ArchiveFetcher {
    cache_dir: PathBuf,
    host: String,
    timeout: Duration,
}

impl ArchiveFetcher {
    pub fn new(cache_dir: impl Into<PathBuf>, host: impl Into<String>) -> Self {
        Self {
            cache_dir: cache_dir.into(),
            host: host.into(),
            timeout: Duration::from_secs(120),
        }
    }

    /// The local cache path an archive for `repo` would occupy.
    pub fn cache_path(&self, repo: &RepoRef) -> PathBuf {
        self.cache_dir.join(repo.archive_filename())
    }

    /// Fetch the archive for `repo`, returning the local cache path.
    ///
    /// If the cache file already exists and `force` is false, no network
    /// call is made. Otherwise the archive is downloaded and the cache
    /// file overwritten as a whole. Idempotent under repeated calls with
    /// `force = false`.
    pub fn fetch(&self, repo: &RepoRef, force: bool) -> Result<PathBuf, FetchError> {
        std::fs::create_dir_all(&self.cache_dir)
            .map_err(|e| FetchError::Io(format!("{}: {}", self.cache_dir.display(), e)))?;

        let path = self.cache_path(repo);
        if path.exists() && !force {
            println!("Archive already cached at {}", path.display());
            return Ok(path);
        }

        let url = repo.archive_url(&self.host);
        println!(
            "Downloading {}/{} ({}) from {}...",
            repo.owner, repo.name, repo.branch, url
        );

        let body = download(&url, self.timeout)?;

        std::fs::write(&path, &body)
            .map_err(|e| FetchError::Io(format!("{}: {}", path.display(), e)))?;

        println!("Downloaded to {}", path.display());
        Ok(path)
    }
}

/// Perform the blocking HTTP GET and return the response body.
fn download(url: &str, timeout: Duration) -> Result<Vec<u8>, FetchError> {
    let client = reqwest::blocking::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| FetchError::Http(e.to_string()))?;

    let response = client
        .get(url)
        .send()
        .map_err(|e| FetchError::Http(e.to_string()))?;

    let status = response.status();
    if !status.is_success() {
        return Err(FetchError::Status(status.as_u16(), url.to_string()));
    }

    let bytes = response
        .bytes()
        .map_err(|e| FetchError::Http(e.to_string()))?;
    Ok(bytes.to_vec())
}

/// Default cache directory: `downloads/` under the current working directory.
pub fn default_cache_dir() -> &'static Path {
    Path::new("downloads")
}
