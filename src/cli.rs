//! Command-line interface definitions for Titulares.
//!
//! This module defines the CLI arguments and options using the `clap` crate.
//! Secrets and tunables can also be provided via environment variables (a
//! `.env` file in the working directory is loaded first).

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Command-line arguments for the Titulares application.
///
/// # Examples
///
/// ```sh
/// # Scrape every built-in source and print the feed
/// titulares feed
///
/// # Use a custom registry and write the feed to a file
/// titulares feed --sources sources.yaml --output ./public/feed.json
///
/// # Summarize one article
/// GROQ_API_KEY=... titulares summarize --url https://www.infobae.com/politica/... --title "..."
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Scrape every listing page and emit the aggregated feed as JSON
    Feed(FeedArgs),
    /// Extract one article's body text and summarize it
    Summarize(SummarizeArgs),
}

#[derive(Args, Debug)]
pub struct FeedArgs {
    /// YAML file with the source registry (defaults to the built-in sources)
    #[arg(short, long, env = "TITULARES_SOURCES")]
    pub sources: Option<PathBuf>,

    /// Per-source deadline in seconds
    #[arg(short, long, env = "TITULARES_TIMEOUT_SECS", default_value_t = 10)]
    pub timeout_secs: u64,

    /// Write the feed to this file instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Pretty-print the JSON
    #[arg(long, default_value_t = false)]
    pub pretty: bool,

    /// Override the browser User-Agent sent to every site
    #[arg(long, env = "TITULARES_USER_AGENT")]
    pub user_agent: Option<String>,
}

#[derive(Args, Debug)]
pub struct SummarizeArgs {
    /// Article URL
    #[arg(short, long)]
    pub url: String,

    /// Article title, quoted in the prompt
    #[arg(long, default_value = "")]
    pub title: String,

    /// API key for the chat completions service
    #[arg(long, env = "GROQ_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Chat model name
    #[arg(long, env = "TITULARES_MODEL", default_value = titulares::summarize::DEFAULT_MODEL)]
    pub model: String,

    /// Base URL of an OpenAI-compatible API
    #[arg(long, env = "TITULARES_API_BASE", default_value = titulares::summarize::DEFAULT_BASE_URL)]
    pub base_url: String,

    /// Deadline in seconds for fetching the article
    #[arg(short, long, env = "TITULARES_TIMEOUT_SECS", default_value_t = 10)]
    pub timeout_secs: u64,
}
