//! Tool layer exposed to AI assistants.
//!
//! Every capability an assistant can call is a [`Tool`]: a name, a
//! one-line description, an OpenAI function-calling parameter schema, and
//! an async `execute`. Tools are collected in a [`ToolRegistry`] built at
//! startup; the chat loop, the HTTP server, and the MCP bridge all
//! dispatch through the same table rather than introspecting handlers at
//! call time.
//!
//! The documentation search core is blocking (network download, archive
//! extraction, index build), so [`SearchDocsTool`] offloads it with
//! `spawn_blocking` to keep the async host responsive.

use std::sync::Arc;

use anyhow::{bail, Result};
use async_trait::async_trait;
use serde_json::{json, Value};

use crate::config::Config;
use crate::index::DEFAULT_NUM_RESULTS;
use crate::models::Document;
use crate::registry::DocsRegistry;
use crate::scrape;

/// Longest document content returned through the tool boundary. Longer
/// content is cut and marked with `"..."`; the stored document is never
/// mutated.
pub const PREVIEW_CHARS: usize = 500;

/// A callable tool with a JSON-schema parameter contract.
#[async_trait]
pub trait Tool: Send + Sync {
    /// Lowercase identifier, e.g. `"search_docs"`.
    fn name(&self) -> &str;

    /// One-line description for assistant discovery.
    fn description(&self) -> &str;

    /// OpenAI function-calling JSON Schema for the parameters.
    fn parameters_schema(&self) -> Value;

    /// Execute with a JSON object of arguments.
    async fn execute(&self, params: Value, ctx: &ToolContext) -> Result<Value>;
}

/// Shared state handed to every tool invocation.
#[derive(Clone)]
pub struct ToolContext {
    pub config: Arc<Config>,
    pub docs: Arc<DocsRegistry>,
}

impl ToolContext {
    pub fn new(config: Arc<Config>, docs: Arc<DocsRegistry>) -> Self {
        Self { config, docs }
    }
}

/// Static table of tools, built once at startup.
pub struct ToolRegistry {
    tools: Vec<Box<dyn Tool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self { tools: Vec::new() }
    }

    /// Registry pre-loaded with the built-in tools.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register(Box::new(SearchDocsTool));
        registry.register(Box::new(FetchPageTool));
        registry.register(Box::new(CountWordTool));
        registry
    }

    pub fn register(&mut self, tool: Box<dyn Tool>) {
        self.tools.push(tool);
    }

    pub fn tools(&self) -> &[Box<dyn Tool>] {
        &self.tools
    }

    pub fn find(&self, name: &str) -> Option<&dyn Tool> {
        self.tools
            .iter()
            .find(|t| t.name() == name)
            .map(|t| t.as_ref())
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Truncate document content for presentation at the tool boundary.
pub fn preview(doc: &Document) -> Value {
    let content = if doc.content.chars().count() > PREVIEW_CHARS {
        let cut: String = doc.content.chars().take(PREVIEW_CHARS).collect();
        format!("{}...", cut)
    } else {
        doc.content.clone()
    };
    json!({ "filename": doc.filename, "content": content })
}

// ============ search_docs ============

/// Searches the markdown documentation of a GitHub repository.
pub struct SearchDocsTool;

#[async_trait]
impl Tool for SearchDocsTool {
    fn name(&self) -> &str {
        "search_docs"
    }

    fn description(&self) -> &str {
        "Search documentation in any GitHub repository. Downloads the \
         repository (if not cached), indexes all markdown files, and \
         returns the most relevant ones."
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "repository": {
                    "type": "string",
                    "description": "Repository reference: 'owner/repo' or a GitHub URL, optionally with /tree/<branch>"
                },
                "query": { "type": "string", "description": "Search query" },
                "num_results": {
                    "type": "integer",
                    "description": "Number of results to return",
                    "default": DEFAULT_NUM_RESULTS
                }
            },
            "required": ["repository", "query"]
        })
    }

    async fn execute(&self, params: Value, ctx: &ToolContext) -> Result<Value> {
        let repository = params["repository"].as_str().unwrap_or("").to_string();
        if repository.trim().is_empty() {
            bail!("repository must not be empty");
        }
        let query = params["query"].as_str().unwrap_or("").to_string();
        if query.trim().is_empty() {
            bail!("query must not be empty");
        }
        let k = params["num_results"]
            .as_i64()
            .unwrap_or(ctx.config.search.num_results as i64)
            .max(0) as usize;

        // The core is blocking; keep it off the async worker threads.
        let docs = ctx.docs.clone();
        let results = tokio::task::spawn_blocking(move || docs.search(&repository, &query, k))
            .await??;

        let items: Vec<Value> = results.iter().map(preview).collect();
        Ok(json!({ "results": items }))
    }
}

// ============ fetch_page ============

/// Fetches a web page as markdown via Jina Reader.
pub struct FetchPageTool;

#[async_trait]
impl Tool for FetchPageTool {
    fn name(&self) -> &str {
        "fetch_page"
    }

    fn description(&self) -> &str {
        "Fetch the content of a web page in markdown format"
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "url": { "type": "string", "description": "URL of the page to fetch" }
            },
            "required": ["url"]
        })
    }

    async fn execute(&self, params: Value, _ctx: &ToolContext) -> Result<Value> {
        let url = params["url"].as_str().unwrap_or("");
        let content = scrape::fetch_page(url).await?;
        Ok(Value::String(content))
    }
}

// ============ count_word ============

/// Counts occurrences of a word on a web page.
pub struct CountWordTool;

#[async_trait]
impl Tool for CountWordTool {
    fn name(&self) -> &str {
        "count_word"
    }

    fn description(&self) -> &str {
        "Count how many times a word appears on a web page (case-insensitive)"
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "url": { "type": "string", "description": "URL of the page to analyze" },
                "word": { "type": "string", "description": "Word to count" }
            },
            "required": ["url", "word"]
        })
    }

    async fn execute(&self, params: Value, _ctx: &ToolContext) -> Result<Value> {
        let url = params["url"].as_str().unwrap_or("");
        let word = params["word"].as_str().unwrap_or("");
        let count = scrape::count_word(url, word).await?;
        Ok(json!(count))
    }
}
