//! Main-text recovery for a single article page.
//!
//! The page is stripped of everything that never carries prose (scripts,
//! navigation, headers, footers, side columns, comments, related-links boxes,
//! ads). Then an ordered chain of body selectors is tried, most specific
//! first; the first one whose text is longer than [`ACCEPT_FLOOR`] characters
//! wins. If none qualifies, the text of every paragraph on the page is used
//! regardless of length.
//!
//! The floor is measured on the raw text of the matches, trimmed only at the
//! ends, so source indentation counts. Whitespace is collapsed afterwards, on
//! the winning text only, and the result is cut to
//! [`MAX_ARTICLE_CHARS`](crate::models::MAX_ARTICLE_CHARS) characters.

use crate::document::{Document, compile};
use crate::error::ExtractionError;
use crate::fetch::FetchDocument;
use crate::models::ArticleExtraction;
use crate::utils::collapse_whitespace;
use once_cell::sync::Lazy;
use scraper::Selector;
use std::time::Duration;
use tracing::{debug, info, instrument};

/// A body candidate must have strictly more characters than this.
pub const ACCEPT_FLOOR: usize = 200;

const NOISE: &str = "script, style, nav, header, footer, aside, .comments, .related, .advertisement";

const BODY_SELECTORS: [&str; 8] = [
    "article",
    r#"[class*="article-body"]"#,
    r#"[class*="story-body"]"#,
    r#"[class*="content-body"]"#,
    r#"[class*="nota-body"]"#,
    ".cuerpo-nota",
    ".article-content",
    "main p",
];

/// A query paired with the test its result must pass.
pub struct Candidate<Q, T> {
    pub query: Q,
    pub accept: fn(&T) -> bool,
}

/// Evaluate `candidates` in order and return the first one whose result is
/// accepted, together with that result. Later candidates are not evaluated.
pub fn first_satisfying<'c, Q, T>(
    candidates: &'c [Candidate<Q, T>],
    mut eval: impl FnMut(&Q) -> T,
) -> Option<(&'c Candidate<Q, T>, T)> {
    candidates.iter().find_map(|candidate| {
        let value = eval(&candidate.query);
        (candidate.accept)(&value).then_some((candidate, value))
    })
}

/// One body selector of the chain.
pub struct BodyQuery {
    pub css: &'static str,
    selector: Selector,
}

fn clears_floor(text: &String) -> bool {
    text.chars().count() > ACCEPT_FLOOR
}

static NOISE_SELECTOR: Lazy<Selector> = Lazy::new(|| compile(NOISE).unwrap());

static PARAGRAPHS: Lazy<Selector> = Lazy::new(|| compile("p").unwrap());

static BODY_CHAIN: Lazy<Vec<Candidate<BodyQuery, String>>> = Lazy::new(|| {
    BODY_SELECTORS
        .iter()
        .map(|&css| Candidate {
            query: BodyQuery {
                css,
                selector: compile(css).unwrap(),
            },
            accept: clears_floor,
        })
        .collect()
});

/// Strip noise from `document` and recover its body text.
///
/// Never fails: an empty or malformed page produces an empty extraction.
pub fn extract_body(document: &mut Document) -> ArticleExtraction {
    let removed = document.remove(&NOISE_SELECTOR);
    debug!(removed, "Stripped non-prose subtrees");

    let text = match first_satisfying(BODY_CHAIN.as_slice(), |q| document.text_of(&q.selector)) {
        Some((candidate, text)) => {
            debug!(selector = candidate.query.css, chars = text.chars().count(), "Body selector accepted");
            text
        }
        None => {
            let text = document.text_of(&PARAGRAPHS);
            debug!(chars = text.chars().count(), "No body selector accepted; using all paragraphs");
            text
        }
    };

    ArticleExtraction::new(&collapse_whitespace(&text))
}

/// Fetch `url` and extract its body text.
///
/// # Errors
///
/// [`ExtractionError::Fetch`] when the page cannot be retrieved in time.
/// A page with too little text is not an error; check
/// [`ArticleExtraction::char_len`].
#[instrument(level = "info", skip_all, fields(%url))]
pub async fn extract_article(
    fetcher: &dyn FetchDocument,
    url: &str,
    timeout: Duration,
) -> Result<ArticleExtraction, ExtractionError> {
    let html = fetcher.fetch(url, timeout).await?;
    let extraction = parse_and_extract(&html);
    info!(chars = extraction.char_len(), "Extracted article body");
    Ok(extraction)
}

fn parse_and_extract(html: &str) -> ArticleExtraction {
    let mut document = Document::parse(html);
    extract_body(&mut document)
}
