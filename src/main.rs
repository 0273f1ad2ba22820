//! # Titulares
//!
//! A headline aggregator for Argentine news sites. It scrapes the listing
//! pages of several outlets concurrently, extracts their teasers with
//! per-source CSS selector rules, and can recover and summarize the body of a
//! single article through an LLM.
//!
//! ## Features
//!
//! - Concurrent scraping of Clarín, La Nación and Infobae sections (General,
//!   Política, Economía, Deportes), or any registry loaded from YAML
//! - Per-source deadlines and failure isolation: a dead site contributes no
//!   items and never fails the feed
//! - Article body recovery through an ordered selector fallback chain,
//!   capped at 3000 characters
//! - Summaries from any OpenAI-compatible chat API (Groq by default)
//!
//! ## Usage
//!
//! ```sh
//! titulares feed --pretty
//! titulares summarize --url https://www.lanacion.com.ar/politica/... --title "..."
//! ```
//!
//! ## Architecture
//!
//! 1. **Registry**: validate and compile every source's selectors
//! 2. **Aggregation**: one task per source fetches and extracts up to 10 items
//! 3. **Output**: the flat feed is written as `{ count, news }` JSON
//!
//! The summary path runs independently: fetch, strip noise, pick the body,
//! check it is long enough, then ask the model.

use clap::Parser;
use std::error::Error;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;
use titulares::aggregate::Aggregator;
use titulares::fetch::HttpFetcher;
use titulares::outputs::json;
use titulares::sources::SourceRegistry;
use titulares::summarize::{ChatConfig, ChatSummarizer, summarize_article};
use tracing::{debug, error, info, instrument};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod cli;

use cli::{Cli, Command, FeedArgs, SummarizeArgs};

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tfmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339());

    match std::env::var("TITULARES_LOG_FORMAT").as_deref() {
        Ok("json") => builder.json().flatten_event(true).init(),
        _ => builder.init(),
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    init_tracing();

    let args = Cli::parse();
    debug!(?args, "Parsed CLI arguments");

    let start_time = std::time::Instant::now();
    let result = match args.command {
        Command::Feed(feed) => run_feed(feed).await,
        Command::Summarize(summary) => run_summarize(summary).await,
    };

    finish(result, start_time.elapsed())
}

/// Report the outcome of a subcommand. A failure is logged here and only here.
fn finish(result: Result<(), Box<dyn Error>>, elapsed: Duration) -> ExitCode {
    match result {
        Ok(()) => {
            info!(?elapsed, "Execution complete");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!(?elapsed, error = %e, "Execution failed");
            ExitCode::FAILURE
        }
    }
}

#[instrument(level = "info", skip_all)]
async fn run_feed(args: FeedArgs) -> Result<(), Box<dyn Error>> {
    let registry = match &args.sources {
        Some(path) => SourceRegistry::from_yaml_file(path).await?,
        None => SourceRegistry::builtin()?,
    };
    info!(sources = registry.len(), "Source registry ready");

    let fetcher = match &args.user_agent {
        Some(ua) => HttpFetcher::with_user_agent(ua)?,
        None => HttpFetcher::new()?,
    };
    let aggregator =
        Aggregator::new(Arc::new(fetcher)).with_timeout(Duration::from_secs(args.timeout_secs));

    let items = aggregator.collect(&registry).await;
    json::write_feed(&items, args.output.as_deref(), args.pretty).await
}

#[instrument(level = "info", skip_all, fields(url = %args.url))]
async fn run_summarize(args: SummarizeArgs) -> Result<(), Box<dyn Error>> {
    let fetcher = HttpFetcher::new()?;
    let summarizer = ChatSummarizer::new(ChatConfig {
        api_key: args.api_key,
        base_url: args.base_url,
        model: args.model,
        ..Default::default()
    })?;

    let summary = summarize_article(
        &fetcher,
        &summarizer,
        &args.url,
        &args.title,
        Duration::from_secs(args.timeout_secs),
    )
    .await?;

    println!("{summary}");
    Ok(())
}
