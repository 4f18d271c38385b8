//! Candidate selection: `<script>` tags with a configured type and a `.json` src.

use embed_json_shared::{EmbedJsonError, Result};
use scraper::Selector;

/// Build one combined selector matching every configured MIME type.
///
/// Returns `None` when there are no MIME types, since nothing can match.
pub(crate) fn build(mime_types: &[String]) -> Result<Option<Selector>> {
    if mime_types.is_empty() {
        return Ok(None);
    }

    let query = selector_source(mime_types);
    tracing::trace!(%query, "built candidate selector");

    Selector::parse(&query)
        .map(Some)
        .map_err(|e| EmbedJsonError::invalid_option("mimeTypes", format!("unusable selector: {e}")))
}

fn selector_source(mime_types: &[String]) -> String {
    mime_types
        .iter()
        .map(|mime| format!(r#"script[type="{}"][src$=".json"]"#, css_string(mime)))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Escape a value for use inside a double-quoted CSS string.
fn css_string(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\a "),
            _ => out.push(c),
        }
    }
    out
}
