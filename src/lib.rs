//! Listing aggregation and article extraction engine behind the `titulares`
//! command.
//!
//! - [`sources`]: validated registry of per-site selector rules
//! - [`fetch`]: deadline-bounded document retrieval with a browser identity
//! - [`document`]: the HTML tree contract both extractors use
//! - [`listing`] and [`links`]: teaser extraction and href resolution
//! - [`aggregate`]: concurrent, fault-isolated fan-out over the registry
//! - [`article`]: body-text recovery through a selector fallback chain
//! - [`summarize`]: the LLM summarization boundary
//! - [`outputs`]: feed serialization

pub mod aggregate;
pub mod article;
pub mod document;
pub mod error;
pub mod fetch;
pub mod links;
pub mod listing;
pub mod models;
pub mod outputs;
pub mod sources;
pub mod summarize;
pub mod utils;
