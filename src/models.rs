//! Data models for listing items and article extractions.
//!
//! This module defines the records the engine produces and consumes:
//! - [`SourceConfig`]: one site's selector rules, immutable once loaded
//! - [`LinkSelector`]: where a teaser's href lives
//! - [`ContentItem`]: one scraped teaser, guaranteed to carry a title and link
//! - [`ExtractionBatch`]: the capped set of items produced by one source
//! - [`ArticleExtraction`]: the capped body text of a single article
//!
//! Items serialize with camelCase field names because the dashboard consumes
//! them as `{ title, link, pubDate, source, category, imageUrl, description }`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Maximum number of items a single source may contribute per run.
pub const MAX_ITEMS_PER_SOURCE: usize = 10;

/// Maximum number of characters of article text handed to the summarizer.
pub const MAX_ARTICLE_CHARS: usize = 3000;

/// Selection rule for the link of a teaser.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkSelector {
    /// The item container is itself the anchor.
    ItemItself,
    /// First match of this selector inside the item container.
    Css(String),
}

impl LinkSelector {
    /// Sentinel used in configuration files for [`LinkSelector::ItemItself`].
    pub const SELF_SENTINEL: &'static str = "self";

    pub fn parse(raw: &str) -> Self {
        if raw.trim() == Self::SELF_SENTINEL {
            LinkSelector::ItemItself
        } else {
            LinkSelector::Css(raw.to_string())
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            LinkSelector::ItemItself => Self::SELF_SENTINEL,
            LinkSelector::Css(s) => s,
        }
    }
}

impl fmt::Display for LinkSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for LinkSelector {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for LinkSelector {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(LinkSelector::parse(&raw))
    }
}

/// Extraction rules for one listing page.
///
/// Several entries may share a `name` (one per section of the same site);
/// `url` and `category` tell them apart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Display name of the outlet, copied onto every item.
    pub name: String,
    /// Listing page to fetch. Its origin resolves relative links.
    pub url: String,
    /// Category label, copied onto every item.
    pub category: String,
    /// Selects the repeated teaser containers.
    pub article_selector: String,
    /// Selects the title element inside a container.
    pub title_selector: String,
    /// Selects the link inside a container, or `self`.
    pub link_selector: LinkSelector,
    /// Selects the image element inside a container.
    pub image_selector: String,
}

/// A single teaser scraped from a listing page.
///
/// Only constructible through [`ContentItem::new`], which refuses records
/// without a title or link.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentItem {
    title: String,
    link: String,
    pub_date: DateTime<Utc>,
    source: String,
    category: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    image_url: Option<String>,
    description: String,
}

impl ContentItem {
    /// Build an item, returning `None` when the trimmed title or link is empty.
    pub fn new(
        title: &str,
        link: &str,
        pub_date: DateTime<Utc>,
        source: &SourceConfig,
        image_url: Option<String>,
    ) -> Option<Self> {
        let title = title.trim();
        let link = link.trim();
        if title.is_empty() || link.is_empty() {
            return None;
        }
        Some(Self {
            title: title.to_string(),
            link: link.to_string(),
            pub_date,
            source: source.name.clone(),
            category: source.category.clone(),
            image_url: image_url.filter(|u| !u.trim().is_empty()),
            description: String::new(),
        })
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn link(&self) -> &str {
        &self.link
    }

    pub fn pub_date(&self) -> DateTime<Utc> {
        self.pub_date
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    pub fn image_url(&self) -> Option<&str> {
        self.image_url.as_deref()
    }

    pub fn description(&self) -> &str {
        &self.description
    }
}

/// Items produced by one source in one run, capped at
/// [`MAX_ITEMS_PER_SOURCE`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExtractionBatch {
    items: Vec<ContentItem>,
}

impl ExtractionBatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_full(&self) -> bool {
        self.items.len() >= MAX_ITEMS_PER_SOURCE
    }

    /// Append an item unless the batch is full. Returns whether it was kept.
    pub fn push(&mut self, item: ContentItem) -> bool {
        if self.is_full() {
            return false;
        }
        self.items.push(item);
        true
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn items(&self) -> &[ContentItem] {
        &self.items
    }

    pub fn into_items(self) -> Vec<ContentItem> {
        self.items
    }
}

/// Plain body text of one article, at most [`MAX_ARTICLE_CHARS`] characters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArticleExtraction {
    text: String,
}

impl ArticleExtraction {
    /// Wrap `text`, cutting it to [`MAX_ARTICLE_CHARS`] characters.
    pub fn new(text: &str) -> Self {
        Self {
            text: crate::utils::truncate_chars(text, MAX_ARTICLE_CHARS).to_string(),
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Length in characters, not bytes.
    pub fn char_len(&self) -> usize {
        self.text.chars().count()
    }

    pub fn into_text(self) -> String {
        self.text
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn source() -> SourceConfig {
        SourceConfig {
            name: "Infobae".to_string(),
            url: "https://www.infobae.com/politica/".to_string(),
            category: "Política".to_string(),
            article_selector: "a[class*=\"story-card\"]".to_string(),
            title_selector: "h2, h3".to_string(),
            link_selector: LinkSelector::ItemItself,
            image_selector: "img".to_string(),
        }
    }

    #[test]
    fn test_link_selector_sentinel() {
        assert_eq!(LinkSelector::parse("self"), LinkSelector::ItemItself);
        assert_eq!(LinkSelector::parse(" self "), LinkSelector::ItemItself);
        assert_eq!(LinkSelector::parse("a"), LinkSelector::Css("a".to_string()));
        assert_eq!(LinkSelector::ItemItself.to_string(), "self");
    }

    #[test]
    fn test_content_item_requires_title_and_link() {
        let now = Utc::now();
        assert!(ContentItem::new("  ", "https://x.com/a", now, &source(), None).is_none());
        assert!(ContentItem::new("Title", "   ", now, &source(), None).is_none());

        let item = ContentItem::new(" Title ", " https://x.com/a ", now, &source(), None).unwrap();
        assert_eq!(item.title(), "Title");
        assert_eq!(item.link(), "https://x.com/a");
        assert_eq!(item.source(), "Infobae");
        assert_eq!(item.category(), "Política");
        assert_eq!(item.description(), "");
    }

    #[test]
    fn test_content_item_serializes_camel_case() {
        let item = ContentItem::new(
            "Title",
            "https://x.com/a",
            Utc::now(),
            &source(),
            Some("https://x.com/a.jpg".to_string()),
        )
        .unwrap();
        let json = serde_json::to_value(&item).unwrap();
        assert_eq!(json["imageUrl"], "https://x.com/a.jpg");
        assert!(json["pubDate"].is_string());
        assert_eq!(json["description"], "");
    }

    #[test]
    fn test_blank_image_url_is_dropped() {
        let item =
            ContentItem::new("T", "https://x.com", Utc::now(), &source(), Some(" ".into())).unwrap();
        assert_eq!(item.image_url(), None);
        let json = serde_json::to_value(&item).unwrap();
        assert!(json.get("imageUrl").is_none());
    }

    #[test]
    fn test_batch_caps_at_ten() {
        let mut batch = ExtractionBatch::new();
        for i in 0..15 {
            let item = ContentItem::new(
                &format!("Title {i}"),
                &format!("https://x.com/{i}"),
                Utc::now(),
                &source(),
                None,
            )
            .unwrap();
            batch.push(item);
        }
        assert_eq!(batch.len(), MAX_ITEMS_PER_SOURCE);
        assert!(batch.is_full());
        assert_eq!(batch.items()[9].title(), "Title 9");
    }

    #[test]
    fn test_article_extraction_is_capped() {
        let text = "é".repeat(MAX_ARTICLE_CHARS + 50);
        let extraction = ArticleExtraction::new(&text);
        assert_eq!(extraction.char_len(), MAX_ARTICLE_CHARS);
    }

    #[test]
    fn test_source_config_yaml_roundtrip_keeps_sentinel() {
        let yaml = serde_yaml::to_string(&source()).unwrap();
        assert!(yaml.contains("link_selector: self"));
        let back: SourceConfig = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(back.link_selector, LinkSelector::ItemItself);
    }
}
