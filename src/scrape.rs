//! Web page fetching via the Jina Reader proxy.
//!
//! Jina Reader converts any web page to clean markdown when the page URL
//! is appended to `https://r.jina.ai/`. This is a single-call HTTP helper
//! unrelated to the repository index — it backs the `fetch_page` and
//! `count_word` tools.

use std::time::Duration;

use anyhow::{bail, Context, Result};

const READER_BASE: &str = "https://r.jina.ai";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Fetch `url` as markdown.
pub async fn fetch_page(url: &str) -> Result<String> {
    if url.trim().is_empty() {
        bail!("url must not be empty");
    }

    let client = reqwest::Client::builder()
        .timeout(REQUEST_TIMEOUT)
        .build()?;

    let reader_url = format!("{}/{}", READER_BASE, url);
    let response = client
        .get(&reader_url)
        .send()
        .await
        .with_context(|| format!("failed to fetch {}", reader_url))?;

    let status = response.status();
    if !status.is_success() {
        bail!("page fetch failed with HTTP {} for {}", status, url);
    }

    Ok(response.text().await?)
}

/// Count case-insensitive occurrences of `word` on the page at `url`.
pub async fn count_word(url: &str, word: &str) -> Result<usize> {
    if word.is_empty() {
        bail!("word must not be empty");
    }
    let content = fetch_page(url).await?;
    Ok(count_occurrences(&content, word))
}

/// Non-overlapping, case-insensitive substring count.
fn count_occurrences(haystack: &str, needle: &str) -> usize {
    let haystack = haystack.to_lowercase();
    let needle = needle.to_lowercase();
    haystack.matches(&needle).count()
}
