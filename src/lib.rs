//! docdex — documentation search for GitHub repositories.
//!
//! Downloads a repository's branch archive, extracts its markdown files,
//! builds an in-memory ranked text index, and exposes search to humans
//! (CLI), to AI assistants (MCP and REST), and to a chat loop.
//!
//! Module map:
//! - [`reference`] — repository reference parsing (`owner/repo`, URLs)
//! - [`fetch`] — archive download with an on-disk cache
//! - [`extract`] — markdown extraction from zip archives
//! - [`index`] — TF-IDF text index over document content and filenames
//! - [`registry`] — process-wide cache of built indexes
//! - [`tools`] — the tool layer shared by chat, REST, and MCP
//! - [`scrape`] — web page fetching via Jina Reader
//! - [`mcp`] / [`server`] — MCP bridge and HTTP server
//! - [`chat`] — interactive REPL with tool calling
//! - [`config`] — TOML configuration

pub mod chat;
pub mod config;
pub mod extract;
pub mod fetch;
pub mod index;
pub mod mcp;
pub mod models;
pub mod reference;
pub mod registry;
pub mod scrape;
pub mod server;
pub mod tools;
