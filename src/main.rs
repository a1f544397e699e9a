use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};

use docdex::config::{load_or_default, Config};
use docdex::fetch::ArchiveFetcher;
use docdex::registry::DocsRegistry;
use docdex::tools::{preview, ToolContext, ToolRegistry};
use docdex::{chat, scrape, server};

#[derive(Parser)]
#[command(name = "docdex", about = "Search the documentation of any GitHub repository")]
struct Cli {
    /// Path to the config file
    #[arg(long, global = true, default_value = "./docdex.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Search a repository's markdown documentation
    Search {
        /// Repository reference: 'owner/repo' or a GitHub URL
        reference: String,
        /// Search query
        query: String,
        /// Number of results to return
        #[arg(long)]
        limit: Option<usize>,
        /// Re-download and re-index even if cached
        #[arg(long)]
        force: bool,
    },
    /// Download and index a repository without searching
    Fetch {
        /// Repository reference: 'owner/repo' or a GitHub URL
        reference: String,
        /// Re-download even if the archive is cached
        #[arg(long)]
        force: bool,
    },
    /// Fetch a web page as markdown
    Page {
        /// URL of the page
        url: String,
        /// Count occurrences of this word instead of printing the page
        #[arg(long)]
        count: Option<String>,
    },
    /// Interactive chat with tool calling (requires OPENAI_API_KEY)
    Chat,
    /// Run the HTTP server (REST + MCP)
    Serve,
}

fn build_registry(config: &Config) -> Arc<DocsRegistry> {
    let fetcher = ArchiveFetcher::new(&config.cache.dir, &config.github.host);
    Arc::new(DocsRegistry::new(fetcher))
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = Arc::new(load_or_default(&cli.config)?);

    match cli.command {
        Commands::Search {
            reference,
            query,
            limit,
            force,
        } => {
            let docs = build_registry(&config);
            let k = limit.unwrap_or(config.search.num_results);

            let results = tokio::task::spawn_blocking(move || {
                let repo = docdex::reference::RepoRef::parse(&reference)?;
                let entry = docs.get_index(&repo, force)?;
                anyhow::Ok(entry.search(&query, k))
            })
            .await??;

            if results.is_empty() {
                println!("No results.");
            }
            for (rank, doc) in results.iter().enumerate() {
                let item = preview(doc);
                println!("{}. {}", rank + 1, doc.filename);
                println!("   {}", item["content"].as_str().unwrap_or(""));
            }
        }
        Commands::Fetch { reference, force } => {
            let docs = build_registry(&config);
            let count = tokio::task::spawn_blocking(move || {
                let repo = docdex::reference::RepoRef::parse(&reference)?;
                let entry = docs.get_index(&repo, force)?;
                anyhow::Ok(entry.documents.len())
            })
            .await??;
            println!("Ready: {} documents indexed", count);
        }
        Commands::Page { url, count } => match count {
            Some(word) => {
                let n = scrape::count_word(&url, &word).await?;
                println!("'{}' appears {} time(s) on {}", word, n, url);
            }
            None => {
                let content = scrape::fetch_page(&url).await?;
                println!("{}", content);
            }
        },
        Commands::Chat => {
            let docs = build_registry(&config);
            let tools = Arc::new(ToolRegistry::with_builtins());
            let ctx = ToolContext::new(config, docs);
            chat::run(tools, ctx).await?;
        }
        Commands::Serve => {
            let docs = build_registry(&config);
            server::serve(config, docs).await?;
        }
    }

    Ok(())
}
