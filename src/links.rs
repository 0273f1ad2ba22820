//! Resolution of teaser hrefs against a source's origin.
//!
//! Listing pages mix absolute links, site-relative paths with and without a
//! leading slash, and the occasional protocol-relative CDN link. Everything
//! that lacks a scheme is joined onto the origin (`scheme://host[:port]`) of
//! the listing page, never onto its path.

use url::Url;

/// Return the origin of `page_url`, e.g. `https://www.clarin.com` for
/// `https://www.clarin.com/politica/`.
///
/// Returns `None` for URLs that don't parse or have an opaque origin.
pub fn origin_of(page_url: &str) -> Option<String> {
    let parsed = Url::parse(page_url).ok()?;
    let origin = parsed.origin();
    origin.is_tuple().then(|| origin.ascii_serialization())
}

/// Make `href` absolute relative to `origin`.
///
/// - hrefs that already carry a scheme are returned unchanged
/// - `//host/path` borrows the origin's scheme
/// - `/path` and `path` both become `{origin}/path`, with exactly one slash
///
/// An empty href stays empty so the caller can drop the item.
pub fn normalize_href(href: &str, origin: &str) -> String {
    let href = href.trim();
    if href.is_empty() || has_scheme(href) {
        return href.to_string();
    }

    let origin = origin.trim_end_matches('/');
    if let Some(rest) = href.strip_prefix("//") {
        let scheme = origin.split_once("://").map_or("https", |(s, _)| s);
        return format!("{scheme}://{rest}");
    }

    format!("{}/{}", origin, href.trim_start_matches('/'))
}

fn has_scheme(href: &str) -> bool {
    let Some((scheme, _)) = href.split_once(':') else {
        return false;
    };
    let mut chars = scheme.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
}
