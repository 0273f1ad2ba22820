//! Output generation for aggregated feeds.
//!
//! # Submodules
//!
//! - [`json`]: Serializes the listing feed as a `{ count, news }` envelope,
//!   to stdout or to a file
//!
//! # Output Structure
//!
//! ```text
//! {
//!   "count": 2,
//!   "news": [
//!     { "title": "...", "link": "https://...", "pubDate": "2026-10-18T09:00:00Z",
//!       "source": "Clarín", "category": "Política", "imageUrl": "https://...",
//!       "description": "" },
//!     ...
//!   ]
//! }
//! ```

pub mod json;
