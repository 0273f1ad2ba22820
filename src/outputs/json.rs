//! JSON output for the listing feed.
//!
//! The envelope mirrors what the dashboard reads: a `count` and the flat
//! `news` list. Writing to a file goes through a writability probe first so
//! a bad path fails before the feed is serialized.

use crate::models::ContentItem;
use crate::utils::ensure_writable_parent;
use serde::Serialize;
use std::error::Error;
use std::path::Path;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{info, instrument};

/// Wire shape of the aggregated feed.
#[derive(Debug, Serialize)]
pub struct FeedEnvelope<'a> {
    pub count: usize,
    pub news: &'a [ContentItem],
}

impl<'a> FeedEnvelope<'a> {
    pub fn new(news: &'a [ContentItem]) -> Self {
        Self {
            count: news.len(),
            news,
        }
    }
}

/// Serialize `items` as a feed envelope.
pub fn render_feed(items: &[ContentItem], pretty: bool) -> Result<String, serde_json::Error> {
    let envelope = FeedEnvelope::new(items);
    if pretty {
        serde_json::to_string_pretty(&envelope)
    } else {
        serde_json::to_string(&envelope)
    }
}

/// Write the feed to `output`, or to stdout when `output` is `None`.
///
/// # Errors
///
/// Returns an error if the destination directory is not writable or the
/// write itself fails.
#[instrument(level = "info", skip_all, fields(count = items.len()))]
pub async fn write_feed(
    items: &[ContentItem],
    output: Option<&Path>,
    pretty: bool,
) -> Result<(), Box<dyn Error>> {
    let json = render_feed(items, pretty)?;

    match output {
        Some(path) => {
            ensure_writable_parent(path).await?;
            fs::write(path, json).await?;
            info!(path = %path.display(), "Wrote feed JSON");
        }
        None => {
            let mut stdout = tokio::io::stdout();
            stdout.write_all(json.as_bytes()).await?;
            stdout.write_all(b"\n").await?;
            stdout.flush().await?;
        }
    }
    Ok(())
}
