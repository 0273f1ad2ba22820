//! Registry of listing pages and their selector rules.
//!
//! Per-source behavior is pure data: every outlet/section pair is one
//! [`SourceConfig`] record. The registry validates and compiles those records
//! once, up front, so a bad selector is a configuration error rather than a
//! failure in the middle of an aggregate run.
//!
//! # Built-in sources
//!
//! | Outlet | Sections | Item container | Link |
//! |--------|----------|----------------|------|
//! | Clarín | General, Política, Economía, Deportes | `article, div[class*="content-"]` | first `a` |
//! | La Nación | General, Política, Economía, Deportes | `article` | first `a` |
//! | Infobae | Actualidad, Política, Economía, Deportes | `a[class*="story-card"]` | the card itself |
//!
//! A YAML file holding a list of [`SourceConfig`] records can replace the
//! built-in list (see [`SourceRegistry::from_yaml_file`]).

use crate::document::compile;
use crate::error::RegistryError;
use crate::links::origin_of;
use crate::models::{LinkSelector, SourceConfig};
use scraper::Selector;
use std::path::Path;
use std::sync::Arc;
use tracing::{info, instrument};

const CLARIN_ITEMS: &str = r#"article, div[class*="content-"]"#;
const INFOBAE_ITEMS: &str = r#"a[class*="story-card"]"#;

fn clarin(url: &str, category: &str) -> SourceConfig {
    SourceConfig {
        name: "Clarín".to_string(),
        url: url.to_string(),
        category: category.to_string(),
        article_selector: CLARIN_ITEMS.to_string(),
        title_selector: "h2, h3".to_string(),
        link_selector: LinkSelector::Css("a".to_string()),
        image_selector: "img".to_string(),
    }
}

fn la_nacion(url: &str, category: &str) -> SourceConfig {
    SourceConfig {
        name: "La Nación".to_string(),
        url: url.to_string(),
        category: category.to_string(),
        article_selector: "article".to_string(),
        title_selector: "h2".to_string(),
        link_selector: LinkSelector::Css("a".to_string()),
        image_selector: "img".to_string(),
    }
}

fn infobae(url: &str, category: &str) -> SourceConfig {
    SourceConfig {
        name: "Infobae".to_string(),
        url: url.to_string(),
        category: category.to_string(),
        article_selector: INFOBAE_ITEMS.to_string(),
        title_selector: "h2, h3".to_string(),
        link_selector: LinkSelector::ItemItself,
        image_selector: "img".to_string(),
    }
}

/// The built-in listing pages, grouped by section.
pub fn default_sources() -> Vec<SourceConfig> {
    vec![
        // General / Actualidad
        clarin("https://www.clarin.com/", "General"),
        la_nacion("https://www.lanacion.com.ar/", "General"),
        infobae("https://www.infobae.com/", "Actualidad"),
        // Política
        clarin("https://www.clarin.com/politica/", "Política"),
        la_nacion("https://www.lanacion.com.ar/politica/", "Política"),
        infobae("https://www.infobae.com/politica/", "Política"),
        // Economía
        clarin("https://www.clarin.com/economia/", "Economía"),
        la_nacion("https://www.lanacion.com.ar/economia/", "Economía"),
        infobae("https://www.infobae.com/economia/", "Economía"),
        // Deportes
        clarin("https://www.clarin.com/deportes/", "Deportes"),
        la_nacion("https://www.lanacion.com.ar/deportes/", "Deportes"),
        infobae("https://www.infobae.com/deportes/", "Deportes"),
    ]
}

/// One validated source with its selectors compiled.
#[derive(Debug)]
pub struct SourceRules {
    pub config: SourceConfig,
    /// `scheme://host[:port]` of the listing page.
    pub origin: String,
    pub(crate) items: Selector,
    pub(crate) title: Selector,
    /// `None` when the item container is itself the link.
    pub(crate) link: Option<Selector>,
    pub(crate) image: Selector,
}

impl SourceRules {
    pub fn compile(config: SourceConfig) -> Result<Self, RegistryError> {
        let origin = match origin_of(&config.url) {
            Some(origin) if origin.starts_with("http://") || origin.starts_with("https://") => {
                origin
            }
            _ => {
                return Err(RegistryError::InvalidOrigin {
                    source_name: config.name.clone(),
                    url: config.url.clone(),
                });
            }
        };

        let items = selector(&config, "article", &config.article_selector)?;
        let title = selector(&config, "title", &config.title_selector)?;
        let link = match &config.link_selector {
            LinkSelector::ItemItself => None,
            LinkSelector::Css(raw) => Some(selector(&config, "link", raw)?),
        };
        let image = selector(&config, "image", &config.image_selector)?;

        Ok(Self {
            config,
            origin,
            items,
            title,
            link,
            image,
        })
    }

    pub fn name(&self) -> &str {
        &self.config.name
    }
}

fn selector(config: &SourceConfig, field: &'static str, raw: &str) -> Result<Selector, RegistryError> {
    if raw.trim().is_empty() {
        return Err(RegistryError::EmptySelector {
            source_name: config.name.clone(),
            field,
        });
    }
    compile(raw).map_err(|reason| RegistryError::InvalidSelector {
        source_name: config.name.clone(),
        field,
        selector: raw.to_string(),
        reason,
    })
}

/// Immutable, validated list of sources. Cheap to share between tasks.
#[derive(Debug, Clone)]
pub struct SourceRegistry {
    sources: Vec<Arc<SourceRules>>,
}

impl SourceRegistry {
    /// Validate and compile `configs`. Fails on the first invalid entry.
    pub fn new(configs: Vec<SourceConfig>) -> Result<Self, RegistryError> {
        if configs.is_empty() {
            return Err(RegistryError::Empty);
        }
        let sources = configs
            .into_iter()
            .map(|c| SourceRules::compile(c).map(Arc::new))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { sources })
    }

    /// Registry of the built-in sources.
    pub fn builtin() -> Result<Self, RegistryError> {
        Self::new(default_sources())
    }

    /// Load a YAML list of [`SourceConfig`] records.
    ///
    /// ```yaml
    /// - name: Infobae
    ///   url: https://www.infobae.com/
    ///   category: Actualidad
    ///   article_selector: a[class*="story-card"]
    ///   title_selector: h2, h3
    ///   link_selector: self
    ///   image_selector: img
    /// ```
    #[instrument(level = "info", skip_all, fields(path = %path.display()))]
    pub async fn from_yaml_file(path: &Path) -> Result<Self, RegistryError> {
        let display = path.display().to_string();
        let raw = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| RegistryError::Io {
                path: display.clone(),
                source,
            })?;
        let configs: Vec<SourceConfig> =
            serde_yaml::from_str(&raw).map_err(|source| RegistryError::Yaml {
                path: display,
                source,
            })?;
        let registry = Self::new(configs)?;
        info!(count = registry.len(), "Loaded source registry");
        Ok(registry)
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<SourceRules>> {
        self.sources.iter()
    }
}
