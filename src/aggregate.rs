//! Concurrent fetch-and-extract across every registered source.
//!
//! Each source runs as its own task in a [`JoinSet`] under its own deadline.
//! A source that times out, fails to connect or panics while extracting is
//! logged and contributes an empty batch; it never fails the run or delays
//! the others beyond its own deadline. The run returns once every task has
//! settled.

use crate::document::Document;
use crate::error::{FetchError, SourceError};
use crate::fetch::{DEFAULT_TIMEOUT, FetchDocument};
use crate::listing::extract_listing;
use crate::models::{ContentItem, ExtractionBatch};
use crate::sources::{SourceRegistry, SourceRules};
use chrono::Utc;
use futures::FutureExt;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::task::JoinSet;
use tracing::{error, info, instrument, warn};

/// Drives [`FetchDocument`] and [`extract_listing`] over a [`SourceRegistry`].
#[derive(Clone)]
pub struct Aggregator {
    fetcher: Arc<dyn FetchDocument>,
    timeout: Duration,
}

impl Aggregator {
    pub fn new(fetcher: Arc<dyn FetchDocument>) -> Self {
        Self {
            fetcher,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Override the per-source deadline.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Fetch and extract every source concurrently.
    ///
    /// Items come back grouped by source in registry order. Consumers should
    /// still treat the result as an unordered collection.
    #[instrument(level = "info", skip_all, fields(sources = registry.len(), timeout = ?self.timeout))]
    pub async fn collect(&self, registry: &SourceRegistry) -> Vec<ContentItem> {
        let t0 = Instant::now();
        let mut tasks = JoinSet::new();

        for (index, rules) in registry.iter().enumerate() {
            let fetcher = Arc::clone(&self.fetcher);
            let rules = Arc::clone(rules);
            let timeout = self.timeout;
            tasks.spawn(async move {
                let outcome = AssertUnwindSafe(scrape_source(fetcher.as_ref(), &rules, timeout))
                    .catch_unwind()
                    .await
                    .unwrap_or_else(|panic| Err(SourceError::Task(panic_message(panic.as_ref()))));
                (index, rules, outcome)
            });
        }

        let mut batches: Vec<ExtractionBatch> = vec![ExtractionBatch::new(); registry.len()];
        let mut failed = 0usize;

        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((index, rules, Ok(batch))) => {
                    info!(
                        source = %rules.name(),
                        category = %rules.config.category,
                        count = batch.len(),
                        "Scraped source"
                    );
                    batches[index] = batch;
                }
                Ok((_, rules, Err(e))) => {
                    failed += 1;
                    warn!(
                        source = %rules.name(),
                        url = %rules.config.url,
                        error = %e,
                        "Source failed; contributing no items"
                    );
                }
                Err(e) => {
                    failed += 1;
                    error!(error = %e, "Source task did not complete");
                }
            }
        }

        let items: Vec<ContentItem> = batches
            .into_iter()
            .flat_map(ExtractionBatch::into_items)
            .collect();

        info!(
            total = items.len(),
            failed,
            elapsed_ms = t0.elapsed().as_millis() as u64,
            "Aggregation complete"
        );
        items
    }
}

/// Fetch one listing page and extract its batch, all under `timeout`.
async fn scrape_source(
    fetcher: &dyn FetchDocument,
    rules: &SourceRules,
    timeout: Duration,
) -> Result<ExtractionBatch, SourceError> {
    let url = &rules.config.url;
    let html = tokio::time::timeout(timeout, fetcher.fetch(url, timeout))
        .await
        .map_err(|_| FetchError::Timeout {
            url: url.clone(),
            after: timeout,
        })??;
    Ok(extract_from_html(&html, rules))
}

fn extract_from_html(html: &str, rules: &SourceRules) -> ExtractionBatch {
    let document = Document::parse(html);
    extract_listing(&document, rules, Utc::now())
}

fn panic_message(panic: &(dyn std::any::Any + Send)) -> String {
    panic
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| panic.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "panic".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::testing::StaticFetcher;
    use crate::models::{LinkSelector, SourceConfig};
    use async_trait::async_trait;

    /// Misbehaving fetcher: hangs past any deadline or panics for chosen URLs,
    /// serving everything else from `inner`.
    struct UnrulyFetcher {
        hangs: &'static str,
        panics: &'static str,
        inner: StaticFetcher,
    }

    #[async_trait]
    impl FetchDocument for UnrulyFetcher {
        async fn fetch(&self, url: &str, timeout: Duration) -> Result<String, FetchError> {
            if url == self.hangs {
                tokio::time::sleep(Duration::from_secs(3600)).await;
            }
            if url == self.panics {
                panic!("listing parser exploded");
            }
            self.inner.fetch(url, timeout).await
        }
    }

    fn config(name: &str, url: &str) -> SourceConfig {
        SourceConfig {
            name: name.to_string(),
            url: url.to_string(),
            category: "General".to_string(),
            article_selector: "article".to_string(),
            title_selector: "h2".to_string(),
            link_selector: LinkSelector::Css("a".to_string()),
            image_selector: "img".to_string(),
        }
    }

    fn listing(prefix: &str, n: usize) -> String {
        (0..n)
            .map(|i| format!(r#"<article><h2>{prefix} {i}</h2><a href="/{prefix}-{i}">x</a></article>"#))
            .collect()
    }

    #[tokio::test]
    async fn test_slow_source_does_not_block_fast_source() {
        let fetcher = StaticFetcher::new()
            .page("https://rapido.com.ar/", &listing("rapido", 3))
            .slow_page("https://lento.com.ar/", &listing("lento", 3), Duration::from_secs(60));
        let registry = SourceRegistry::new(vec![
            config("Lento", "https://lento.com.ar/"),
            config("Rápido", "https://rapido.com.ar/"),
        ])
        .unwrap();

        let aggregator =
            Aggregator::new(Arc::new(fetcher)).with_timeout(Duration::from_millis(300));
        let t0 = Instant::now();
        let items = aggregator.collect(&registry).await;

        assert!(t0.elapsed() < Duration::from_secs(5));
        assert_eq!(items.len(), 3);
        assert!(items.iter().all(|i| i.source() == "Rápido"));
        assert_eq!(items[0].link(), "https://rapido.com.ar/rapido-0");
    }

    #[tokio::test]
    async fn test_failed_source_contributes_empty_batch() {
        let fetcher = StaticFetcher::new()
            .refused("https://caido.com.ar/")
            .page("https://vivo.com.ar/", &listing("vivo", 2));
        let registry = SourceRegistry::new(vec![
            config("Caído", "https://caido.com.ar/"),
            config("Vivo", "https://vivo.com.ar/"),
        ])
        .unwrap();

        let items = Aggregator::new(Arc::new(fetcher)).collect(&registry).await;
        assert_eq!(items.len(), 2);
        assert!(items.iter().all(|i| i.source() == "Vivo"));
    }

    #[tokio::test]
    async fn test_every_source_capped_and_grouped_in_registry_order() {
        let fetcher = StaticFetcher::new()
            .page("https://a.com/", &listing("a", 15))
            .slow_page("https://b.com/", &listing("b", 4), Duration::from_millis(50))
            .page("https://c.com/", "<html></html>");
        let registry = SourceRegistry::new(vec![
            config("B", "https://b.com/"),
            config("A", "https://a.com/"),
            config("C", "https://c.com/"),
        ])
        .unwrap();

        let items = Aggregator::new(Arc::new(fetcher)).collect(&registry).await;
        let sources: Vec<_> = items.iter().map(|i| i.source()).collect();
        assert_eq!(sources.len(), 14);
        assert!(sources[..4].iter().all(|s| *s == "B"));
        assert!(sources[4..].iter().all(|s| *s == "A"));
    }

    #[tokio::test]
    async fn test_all_sources_failing_still_completes() {
        let registry = SourceRegistry::new(vec![
            config("X", "https://x.com/"),
            config("Y", "https://y.com/"),
        ])
        .unwrap();
        let items = Aggregator::new(Arc::new(StaticFetcher::new()))
            .collect(&registry)
            .await;
        assert!(items.is_empty());
    }

    #[tokio::test]
    async fn test_fetcher_ignoring_deadline_is_cut_off() {
        let fetcher = UnrulyFetcher {
            hangs: "https://colgado.com.ar/",
            panics: "",
            inner: StaticFetcher::new().page("https://sano.com.ar/", &listing("sano", 2)),
        };
        let registry = SourceRegistry::new(vec![
            config("Colgado", "https://colgado.com.ar/"),
            config("Sano", "https://sano.com.ar/"),
        ])
        .unwrap();

        let aggregator =
            Aggregator::new(Arc::new(fetcher)).with_timeout(Duration::from_millis(200));
        let t0 = Instant::now();
        let items = aggregator.collect(&registry).await;

        assert!(t0.elapsed() < Duration::from_secs(5));
        assert_eq!(items.len(), 2);
        assert!(items.iter().all(|i| i.source() == "Sano"));
    }

    #[tokio::test]
    async fn test_panicking_source_is_isolated() {
        let fetcher = UnrulyFetcher {
            hangs: "",
            panics: "https://roto.com.ar/",
            inner: StaticFetcher::new().page("https://sano.com.ar/", &listing("sano", 3)),
        };
        let registry = SourceRegistry::new(vec![
            config("Roto", "https://roto.com.ar/"),
            config("Sano", "https://sano.com.ar/"),
        ])
        .unwrap();

        let aggregator =
            Aggregator::new(Arc::new(fetcher)).with_timeout(Duration::from_millis(200));
        let t0 = Instant::now();
        let items = aggregator.collect(&registry).await;

        assert!(t0.elapsed() < Duration::from_secs(5));
        assert_eq!(items.len(), 3);
        assert!(items.iter().all(|i| i.source() == "Sano"));
        assert_eq!(items[0].link(), "https://sano.com.ar/sano-0");
    }

    #[test]
    fn test_panic_message_extracts_text() {
        let boxed: Box<dyn std::any::Any + Send> = Box::new("boom");
        assert_eq!(panic_message(boxed.as_ref()), "boom");
        let boxed: Box<dyn std::any::Any + Send> = Box::new(String::from("bang"));
        assert_eq!(panic_message(boxed.as_ref()), "bang");
        let boxed: Box<dyn std::any::Any + Send> = Box::new(42u8);
        assert_eq!(panic_message(boxed.as_ref()), "panic");
    }
}
