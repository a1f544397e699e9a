//! TOML configuration parsing.
//!
//! All settings have defaults, so docdex runs without a config file.
//! When `--config` points at an existing file it is parsed and validated;
//! a missing file at the default location falls back to [`Config::default`].

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub github: GithubConfig,
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub chat: ChatConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct CacheConfig {
    /// Directory where downloaded repository archives are stored.
    #[serde(default = "default_cache_dir")]
    pub dir: PathBuf,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            dir: default_cache_dir(),
        }
    }
}

fn default_cache_dir() -> PathBuf {
    crate::fetch::default_cache_dir().to_path_buf()
}

#[derive(Debug, Deserialize, Clone)]
pub struct GithubConfig {
    /// Base URL archives are downloaded from. Overridable for tests and
    /// GitHub Enterprise hosts.
    #[serde(default = "default_github_host")]
    pub host: String,
}

impl Default for GithubConfig {
    fn default() -> Self {
        Self {
            host: default_github_host(),
        }
    }
}

fn default_github_host() -> String {
    "https://github.com".to_string()
}

#[derive(Debug, Deserialize, Clone)]
pub struct SearchConfig {
    /// Results returned when a caller does not specify a count.
    #[serde(default = "default_num_results")]
    pub num_results: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            num_results: default_num_results(),
        }
    }
}

fn default_num_results() -> usize {
    crate::index::DEFAULT_NUM_RESULTS
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
        }
    }
}

fn default_bind() -> String {
    "127.0.0.1:7331".to_string()
}

#[derive(Debug, Deserialize, Clone)]
pub struct ChatConfig {
    /// Chat-completions model used by `docdex chat`.
    #[serde(default = "default_chat_model")]
    pub model: String,
    #[serde(default = "default_chat_timeout")]
    pub timeout_secs: u64,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            model: default_chat_model(),
            timeout_secs: default_chat_timeout(),
        }
    }
}

fn default_chat_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_chat_timeout() -> u64 {
    60
}

/// Load and validate a config file.
pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: Config = toml::from_str(&content).with_context(|| "Failed to parse config file")?;

    if config.search.num_results < 1 {
        anyhow::bail!("search.num_results must be >= 1");
    }

    if !config.github.host.starts_with("http") {
        anyhow::bail!(
            "github.host must be an http(s) URL, got '{}'",
            config.github.host
        );
    }

    Ok(config)
}

/// Load the config at `path` if it exists, otherwise use defaults.
///
/// A file that exists but fails to parse or validate is still an error;
/// only absence falls back silently.
pub fn load_or_default(path: &Path) -> Result<Config> {
    if path.exists() {
        load_config(path)
    } else {
        Ok(Config::default())
    }
}
