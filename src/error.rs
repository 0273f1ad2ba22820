//! Error taxonomy for the listing and article engines.
//!
//! Transport problems surface as [`FetchError`]. The listing path never lets
//! them escape: the aggregator logs a [`SourceError`] and substitutes an empty
//! batch. The article path wraps them in [`ExtractionError`] and hands them to
//! the caller. Registry problems are the only way the listing call can fail,
//! and they are caught when the registry is built.

use std::time::Duration;
use thiserror::Error;

/// Failure to retrieve a remote document.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The HTTP client itself could not be constructed.
    #[error("could not build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    /// DNS, connect, TLS or body-read failure.
    #[error("request to {url} failed: {source}")]
    Network {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// The deadline elapsed before the body was fully read.
    #[error("request to {url} timed out after {after:?}")]
    Timeout { url: String, after: Duration },
}

impl FetchError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, FetchError::Timeout { .. })
    }

    pub fn url(&self) -> Option<&str> {
        match self {
            FetchError::Client(_) => None,
            FetchError::Network { url, .. } | FetchError::Timeout { url, .. } => Some(url),
        }
    }
}

/// Failure of the single-article body extraction.
///
/// Only transport failures are errors here. Too little text is reported
/// through the returned length and judged by the caller.
#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("could not reach the article: {0}")]
    Fetch(#[from] FetchError),
}

/// Why one source contributed nothing to an aggregate run.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error("source task aborted: {0}")]
    Task(String),
}

/// Invalid source registry configuration.
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("registry contains no sources")]
    Empty,

    #[error("source {source_name:?}: {field} selector is empty")]
    EmptySelector {
        source_name: String,
        field: &'static str,
    },

    #[error("source {source_name:?}: {field} selector {selector:?} does not parse: {reason}")]
    InvalidSelector {
        source_name: String,
        field: &'static str,
        selector: String,
        reason: String,
    },

    #[error("source {source_name:?}: origin {url:?} is not an absolute http(s) URL")]
    InvalidOrigin { source_name: String, url: String },

    #[error("could not read registry file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("could not parse registry file {path}: {source}")]
    Yaml {
        path: String,
        #[source]
        source: serde_yaml::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timeout_is_detected() {
        let err = FetchError::Timeout {
            url: "https://example.com".to_string(),
            after: Duration::from_secs(10),
        };
        assert!(err.is_timeout());
        assert_eq!(err.url(), Some("https://example.com"));
        assert_eq!(
            err.to_string(),
            "request to https://example.com timed out after 10s"
        );
    }

    #[test]
    fn extraction_error_wraps_fetch_error() {
        let err: ExtractionError = FetchError::Timeout {
            url: "https://example.com/a".to_string(),
            after: Duration::from_millis(5),
        }
        .into();
        assert!(err.to_string().starts_with("could not reach the article"));
    }

    #[test]
    fn registry_error_names_the_source() {
        let err = RegistryError::EmptySelector {
            source_name: "Clarín".to_string(),
            field: "title",
        };
        assert_eq!(err.to_string(), "source \"Clarín\": title selector is empty");
    }
}
