//! Turning one listing page into a batch of teasers.
//!
//! For every item container, in document order, the extractor reads the first
//! title match, resolves the link (the container's own href for `self`
//! sources), makes it absolute, and looks for an image under `src` or the
//! common lazy-load attributes. Candidates with no title are skipped without
//! counting toward the cap; extraction stops as soon as the batch is full.

use crate::document::{Document, Node};
use crate::links::normalize_href;
use crate::models::{ContentItem, ExtractionBatch};
use crate::sources::SourceRules;
use chrono::{DateTime, Utc};
use tracing::debug;

/// Image attributes in order of preference.
const IMAGE_ATTRS: [&str; 3] = ["src", "data-src", "data-original"];

/// Extract up to ten items from `document` using `rules`.
///
/// Listing pages carry no reliable publish date, so every item is stamped with
/// `extracted_at`. Zero matches is a normal outcome, not an error.
pub fn extract_listing(
    document: &Document,
    rules: &SourceRules,
    extracted_at: DateTime<Utc>,
) -> ExtractionBatch {
    let mut batch = ExtractionBatch::new();
    let candidates = document.select(&rules.items);
    debug!(
        source = %rules.name(),
        selector = %rules.config.article_selector,
        candidates = candidates.len(),
        "Matched item containers"
    );

    for node in candidates {
        if batch.is_full() {
            break;
        }

        let title = node
            .find_first(&rules.title)
            .map(|t| t.text())
            .unwrap_or_default();
        if title.is_empty() {
            continue;
        }

        let href = match &rules.link {
            None => node.attr("href"),
            Some(selector) => node.find_first(selector).and_then(|a| a.attr("href")),
        }
        .unwrap_or_default();
        let link = normalize_href(href, &rules.origin);

        let image_url = node.find_first(&rules.image).and_then(image_source);

        if let Some(item) = ContentItem::new(&title, &link, extracted_at, &rules.config, image_url) {
            batch.push(item);
        }
    }

    batch
}

fn image_source(img: Node<'_>) -> Option<String> {
    IMAGE_ATTRS
        .iter()
        .find_map(|attr| img.attr(attr))
        .map(str::to_string)
}
