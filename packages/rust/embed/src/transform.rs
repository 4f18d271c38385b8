//! JSON minification for embedded file content.

use embed_json_shared::{EmbedJsonError, Result};
use serde_json::Value;

/// Produce the text to embed for `src`.
///
/// With `minify` the content is parsed and re-serialized compactly (key order
/// is kept). Without it the raw text is passed through unvalidated.
pub(crate) fn transform(src: &str, raw: String, minify: bool) -> Result<String> {
    if !minify {
        return Ok(raw);
    }

    let embed_failure = |source| EmbedJsonError::EmbedFailure {
        src: src.to_string(),
        source,
    };

    let value: Value = serde_json::from_str(&raw).map_err(embed_failure)?;
    serde_json::to_string(&value).map_err(embed_failure)
}
