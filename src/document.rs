//! Queryable HTML tree used by both extractors.
//!
//! A thin layer over [`scraper::Html`] that pins down the four operations the
//! engine relies on: selection in document order, subtree removal, attribute
//! reads and trimmed text. Selection always walks from the root element so
//! detached subtrees are never matched again.

use crate::utils::collapse_whitespace;
use scraper::{ElementRef, Html, Selector};

/// Compile a CSS selector, turning the parser's borrowed error into text.
pub fn compile(raw: &str) -> Result<Selector, String> {
    Selector::parse(raw).map_err(|e| e.to_string())
}

/// A parsed HTML document.
///
/// Parsing never fails: malformed or empty markup yields a tree with an empty
/// `<html>` root, on which every query simply matches nothing.
pub struct Document {
    html: Html,
}

impl Document {
    pub fn parse(markup: &str) -> Self {
        Self {
            html: Html::parse_document(markup),
        }
    }

    /// All elements matching `selector`, in document order.
    pub fn select<'a>(&'a self, selector: &Selector) -> Vec<Node<'a>> {
        self.html
            .root_element()
            .select(selector)
            .map(|element| Node { element })
            .collect()
    }

    /// Detach every subtree matching `selector`. Returns how many were removed.
    pub fn remove(&mut self, selector: &Selector) -> usize {
        let ids: Vec<_> = self
            .html
            .root_element()
            .select(selector)
            .map(|element| element.id())
            .collect();
        let mut removed = 0;
        for id in ids {
            if let Some(mut node) = self.html.tree.get_mut(id) {
                node.detach();
                removed += 1;
            }
        }
        removed
    }

    /// Text of every match of `selector`, concatenated with no separator and
    /// trimmed at both ends. Inner whitespace is kept as written.
    pub fn text_of(&self, selector: &Selector) -> String {
        let joined: String = self
            .html
            .root_element()
            .select(selector)
            .flat_map(|element| element.text())
            .collect();
        joined.trim().to_string()
    }
}

/// One element of a [`Document`].
#[derive(Clone, Copy)]
pub struct Node<'a> {
    element: ElementRef<'a>,
}

impl<'a> Node<'a> {
    /// First descendant matching `selector`. The node itself is not a candidate.
    pub fn find_first(&self, selector: &Selector) -> Option<Node<'a>> {
        self.element
            .select(selector)
            .next()
            .map(|element| Node { element })
    }

    /// Attribute value, treating an empty or blank value as absent.
    pub fn attr(&self, name: &str) -> Option<&'a str> {
        self.element
            .value()
            .attr(name)
            .map(str::trim)
            .filter(|v| !v.is_empty())
    }

    /// Concatenated text of the subtree, whitespace collapsed and trimmed.
    pub fn text(&self) -> String {
        collapse_whitespace(&self.element.text().collect::<String>())
    }

    pub fn tag_name(&self) -> &'a str {
        self.element.value().name()
    }
}
