//! Parse tree wrapper: candidate traversal, node mutation, and serialization.

use std::fmt::Write as _;
use std::sync::LazyLock;

use embed_json_shared::Result;
use scraper::node::{Element, Text};
use scraper::{Html, Node, Selector};

static SCRIPT: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("script").expect("valid selector"));

/// A parsed HTML document that can have script bodies replaced.
pub(crate) struct Document {
    html: Html,
    /// Parsed as a fragment; serialized without the html/head/body skeleton.
    fragment: bool,
}

impl Document {
    /// Parse with browser-grade error recovery; never fails.
    ///
    /// Sources that open with a doctype or an `<html>` tag are parsed as full
    /// documents, anything else as a body fragment.
    pub(crate) fn parse(source: &str) -> Self {
        if is_full_document(source) {
            Self {
                html: Html::parse_document(source),
                fragment: false,
            }
        } else {
            Self {
                html: Html::parse_fragment(source),
                fragment: true,
            }
        }
    }

    /// Visit every element matched by `selector`, in document order.
    ///
    /// `resolve` receives the element's `src` attribute and returns the text
    /// to embed, or `None` to leave the element alone. The first error stops
    /// the walk. Returns the number of elements rewritten.
    pub(crate) fn embed_each<F>(&mut self, selector: &Selector, mut resolve: F) -> Result<usize>
    where
        F: FnMut(Option<&str>) -> Result<Option<String>>,
    {
        let candidates: Vec<_> = self
            .html
            .select(selector)
            .map(|el| (el.id(), el.value().attr("src").map(str::to_string)))
            .collect();

        tracing::debug!(candidates = candidates.len(), "selected script candidates");

        let mut embedded = 0;
        for (id, src) in candidates {
            let Some(text) = resolve(src.as_deref())? else {
                continue;
            };

            let Some(mut node) = self.html.tree.get_mut(id) else {
                continue;
            };

            let rebuilt = match node.value() {
                Node::Element(element) => without_src(element),
                _ => None,
            };
            if let Some(element) = rebuilt {
                *node.value() = Node::Element(element);
            }

            while let Some(mut child) = node.first_child() {
                child.detach();
            }
            node.append(Node::Text(Text { text: text.into() }));

            tracing::trace!(src = src.as_deref().unwrap_or_default(), "embedded script body");
            embedded += 1;
        }

        Ok(embedded)
    }

    /// Serialize the current tree back to HTML.
    pub(crate) fn serialize(&self) -> String {
        if self.fragment {
            self.html.root_element().inner_html()
        } else {
            self.html.html()
        }
    }
}

/// Whether `source` starts (after whitespace and comments) with a doctype or `<html`.
fn is_full_document(source: &str) -> bool {
    let mut rest = source.trim_start();
    while let Some(comment) = rest.strip_prefix("<!--") {
        match comment.find("-->") {
            Some(end) => rest = comment[end + 3..].trim_start(),
            None => return false,
        }
    }

    let head = rest.get(..9).unwrap_or(rest).to_ascii_lowercase();
    head.starts_with("<!doctype") || head.starts_with("<html")
}

/// Rebuild `element` without its `src` attribute, keeping the others in order.
///
/// `scraper` exposes no attribute mutation, so the opening tag is written out
/// again and run back through the parser.
fn without_src(element: &Element) -> Option<Element> {
    let name = element.name();
    let mut tag = format!("<{name}");
    for (attr, value) in element.attrs() {
        if attr == "src" || !is_plain_attr_name(attr) {
            continue;
        }
        let _ = write!(tag, " {attr}=\"{}\"", escape_attr(value));
    }
    let _ = write!(tag, "></{name}>");

    let fragment = Html::parse_fragment(&tag);
    fragment.select(&SCRIPT).next().map(|el| el.value().clone())
}

fn is_plain_attr_name(name: &str) -> bool {
    !name.is_empty()
        && !name
            .chars()
            .any(|c| c.is_whitespace() || matches!(c, '"' | '\'' | '<' | '>' | '/' | '='))
}

fn escape_attr(value: &str) -> String {
    value.replace('&', "&amp;").replace('"', "&quot;")
}
