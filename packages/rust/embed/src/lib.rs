//! Inline external JSON `<script>` sources into HTML documents.
//!
//! Scans a document for `<script>` tags whose `type` is one of the configured
//! MIME types and whose `src` ends in `.json`, reads each referenced file
//! relative to the configured root, and replaces the reference with the
//! file's (optionally minified) content. Documents without candidates are
//! returned untouched, byte for byte.

mod document;
pub mod pipeline;
mod selector;
mod source;
mod transform;

use tracing::{debug, instrument};

use embed_json_shared::{EmbedConfig, EmbedOptions, Result};

use crate::document::Document;

pub use pipeline::{Contents, PLUGIN_NAME, PluginError, SourceFile, process_all, process_file};

// ---------------------------------------------------------------------------
// Public types
// ---------------------------------------------------------------------------

/// Outcome of embedding one document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Embedded {
    /// Nothing was embedded; the caller keeps its original input.
    Unchanged,
    /// At least one script was rewritten.
    Rewritten {
        /// The serialized document.
        html: String,
        /// Number of script elements that received inline content.
        embedded: usize,
    },
}

impl Embedded {
    /// The output document, borrowing `original` when nothing changed.
    pub fn output<'a>(&'a self, original: &'a str) -> &'a str {
        match self {
            Self::Unchanged => original,
            Self::Rewritten { html, .. } => html,
        }
    }
}

// ---------------------------------------------------------------------------
// Embedder
// ---------------------------------------------------------------------------

/// Embed referenced JSON files into `document`.
///
/// `options` are merged over the defaults and validated on every call. Any
/// invalid option, bad `src`, read error, or (when minifying) unparsable JSON
/// fails the whole document; no partially rewritten output is produced.
#[instrument(skip_all, fields(len = document.len()))]
pub fn embed(document: &str, options: &EmbedOptions) -> Result<Embedded> {
    if document.is_empty() {
        return Ok(Embedded::Unchanged);
    }

    let config = options.resolve()?;
    embed_with(document, &config)
}

/// Embed with an already validated config.
#[instrument(skip_all, fields(len = document.len(), root = %config.root.display()))]
pub fn embed_with(document: &str, config: &EmbedConfig) -> Result<Embedded> {
    if document.is_empty() {
        return Ok(Embedded::Unchanged);
    }

    let Some(selector) = selector::build(&config.mime_types)? else {
        debug!("no mime types configured");
        return Ok(Embedded::Unchanged);
    };

    let mut doc = Document::parse(document);
    let embedded = doc.embed_each(&selector, |src| {
        let src = src.unwrap_or_default();
        let path = source::resolve(&config.root, src)?;

        let Some(raw) = source::read(&path, &config.encoding)? else {
            debug!(src, "referenced file is empty, leaving script as is");
            return Ok(None);
        };

        transform::transform(src, raw, config.minify).map(Some)
    })?;

    if embedded == 0 {
        return Ok(Embedded::Unchanged);
    }

    debug!(embedded, "embedded json sources");
    Ok(Embedded::Rewritten {
        html: doc.serialize(),
        embedded,
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use embed_json_shared::EmbedJsonError;
    use std::fs;
    use std::path::PathBuf;

    fn fixtures_dir() -> PathBuf {
        std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("../../../fixtures")
    }

    fn load_fixture(name: &str) -> String {
        fs::read_to_string(fixtures_dir().join(name))
            .unwrap_or_else(|e| panic!("failed to read fixture {name}: {e}"))
    }

    fn fixture_opts() -> EmbedOptions {
        EmbedOptions::default().with_root(fixtures_dir())
    }

    fn rewritten(result: Embedded) -> String {
        match result {
            Embedded::Rewritten { html, .. } => html,
            Embedded::Unchanged => panic!("expected the document to be rewritten"),
        }
    }

    // --- Embedding ---

    #[test]
    fn embeds_application_json() {
        let html = load_fixture("html/json.html");
        let out = rewritten(embed(&html, &fixture_opts()).unwrap());

        assert!(out.contains(r#"<script type="application/json">{"foo":"bar"}</script>"#), "{out}");
        assert!(!out.contains("src="));
    }

    #[test]
    fn embeds_application_ld_json() {
        let html = load_fixture("html/ld+json.html");
        let out = rewritten(embed(&html, &fixture_opts()).unwrap());

        assert!(out.contains(
            r#"{"@context":"https://schema.org","@type":"Organization","name":"Example"}"#
        ));
        assert!(!out.contains("src="));
    }

    #[test]
    fn fragment_embeds_exactly() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("data.json"), "{ \"foo\": \"bar\" }").unwrap();
        let html = r#"<script type="application/json" src="data.json"></script>"#;

        let minified = embed(html, &EmbedOptions::default().with_root(dir.path())).unwrap();
        assert_eq!(
            rewritten(minified),
            r#"<script type="application/json">{"foo":"bar"}</script>"#
        );

        let raw = embed(
            html,
            &EmbedOptions::default().with_root(dir.path()).with_minify(false),
        )
        .unwrap();
        assert_eq!(
            rewritten(raw),
            r#"<script type="application/json">{ "foo": "bar" }</script>"#
        );
    }

    #[test]
    fn minify_false_keeps_raw_text() {
        let html = load_fixture("html/json.html");
        let out = rewritten(embed(&html, &fixture_opts().with_minify(false)).unwrap());

        assert!(out.contains(r#"<script type="application/json">{ "foo": "bar" }</script>"#));
    }

    #[test]
    fn reports_embedded_count() {
        let html = load_fixture("html/opt-mime.html");
        let result = embed(
            &html,
            &fixture_opts().with_mime_types(vec!["foo/bar".to_string(), "application/json".to_string()]),
        )
        .unwrap();

        match result {
            Embedded::Rewritten { embedded, .. } => assert_eq!(embedded, 2),
            Embedded::Unchanged => panic!("expected rewrite"),
        }
    }

    #[test]
    fn existing_children_are_replaced() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.json"), "[1, 2]").unwrap();
        let html = r#"<script type="application/json" src="a.json">["old"]</script>"#;

        let out = rewritten(embed(html, &EmbedOptions::default().with_root(dir.path())).unwrap());
        assert!(out.contains(r#"<script type="application/json">[1,2]</script>"#), "{out}");
        assert!(!out.contains("old"));
    }

    // --- Pass-through ---

    #[test]
    fn empty_document_passes_through() {
        assert_eq!(embed("", &fixture_opts()).unwrap(), Embedded::Unchanged);
    }

    #[test]
    fn empty_document_skips_option_validation() {
        let opts = EmbedOptions::default().with_root("./does-not-exist-embed-json");
        assert_eq!(embed("", &opts).unwrap(), Embedded::Unchanged);
    }

    #[test]
    fn document_without_candidates_is_unchanged() {
        let html = load_fixture("html/no-script.html");
        let result = embed(&html, &fixture_opts()).unwrap();

        assert_eq!(result, Embedded::Unchanged);
        assert_eq!(result.output(&html), html);
    }

    #[test]
    fn other_mime_types_are_ignored() {
        let html = load_fixture("html/opt-mime.html");
        let out = rewritten(embed(&html, &fixture_opts()).unwrap());

        assert!(out.contains(r#"type="foo/bar" src="json/data.json""#));
        assert!(out.contains(r#"<script type="application/json">{"foo":"bar"}</script>"#));
    }

    #[test]
    fn empty_file_leaves_script_untouched() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("empty.json"), "").unwrap();
        let html = r#"<script type="application/json" src="empty.json"></script>"#;

        let result = embed(html, &EmbedOptions::default().with_root(dir.path())).unwrap();
        assert_eq!(result, Embedded::Unchanged);
    }

    #[test]
    fn empty_file_does_not_block_siblings() {
        let html = load_fixture("html/empty-src.html");
        let out = rewritten(embed(&html, &fixture_opts()).unwrap());

        assert!(out.contains(r#"src="json/empty.json""#));
        assert!(out.contains(r#"{"foo":"bar"}"#));
    }

    #[test]
    fn running_twice_matches_running_once() {
        let html = load_fixture("html/json.html");
        let once = rewritten(embed(&html, &fixture_opts()).unwrap());
        let twice = embed(&once, &fixture_opts()).unwrap();

        assert_eq!(twice, Embedded::Unchanged);
        assert_eq!(twice.output(&once), once);
    }

    // --- Options ---

    #[test]
    fn single_mime_type_matches_like_a_list() {
        let html = load_fixture("html/opt-mime.html");
        let single = rewritten(embed(&html, &fixture_opts().with_mime_types("foo/bar")).unwrap());
        let list = rewritten(
            embed(&html, &fixture_opts().with_mime_types(vec!["foo/bar".to_string()])).unwrap(),
        );

        assert_eq!(single, list);
        assert!(single.contains(r#"type="foo/bar">{"foo":"bar"}"#));
        assert!(single.contains(r#"type="application/json" src=""#));
    }

    #[test]
    fn root_option_changes_lookup_dir() {
        let html = load_fixture("html/opt-root.html");
        let opts = EmbedOptions::default().with_root(fixtures_dir().join("json"));
        let out = rewritten(embed(&html, &opts).unwrap());

        assert!(out.contains(r#"{"foo":"bar"}"#));
    }

    #[test]
    fn nonexistent_root_fails_before_reading() {
        let html = load_fixture("html/opt-root.html");
        let opts = EmbedOptions::default().with_root(fixtures_dir().join("does-not-exist"));
        let err = embed(&html, &opts).unwrap_err();

        assert!(err.is_invalid_option());
    }

    #[test]
    fn ascii_encoding_embeds() {
        let html = load_fixture("html/opt-encoding.html");
        let out = rewritten(embed(&html, &fixture_opts().with_encoding("ascii")).unwrap());

        assert!(out.contains(r#""foo":"bar""#));
        assert!(!out.contains("src="));
    }

    #[test]
    fn unsupported_encoding_passes_documents_without_candidates() {
        let html = load_fixture("html/no-script.html");
        let result = embed(&html, &fixture_opts().with_encoding("hex")).unwrap();
        assert_eq!(result, Embedded::Unchanged);
    }

    #[test]
    fn unsupported_encoding_fails_on_read() {
        let html = load_fixture("html/json.html");
        let err = embed(&html, &fixture_opts().with_encoding("hex")).unwrap_err();

        assert!(matches!(err, EmbedJsonError::Io { .. }), "{err}");
        assert!(err.to_string().contains("unknown encoding: hex"));
    }

    #[test]
    fn src_through_a_file_is_invalid_source() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("data.json"), "{}").unwrap();
        let html = r#"<script type="application/json" src="data.json/x.json"></script>"#;

        let err = embed(html, &EmbedOptions::default().with_root(dir.path())).unwrap_err();
        assert!(matches!(err, EmbedJsonError::InvalidSource { .. }), "{err}");
    }

    #[test]
    fn empty_mime_list_is_unchanged() {
        let html = load_fixture("html/json.html");
        let result = embed(&html, &fixture_opts().with_mime_types(Vec::<String>::new())).unwrap();
        assert_eq!(result, Embedded::Unchanged);
    }

    // --- Failures ---

    #[test]
    fn nonexistent_src_is_invalid_source() {
        let html = load_fixture("html/nonexistent-src.html");
        let err = embed(&html, &fixture_opts()).unwrap_err();

        assert!(err.to_string().to_lowercase().contains("invalid source"));
    }

    #[test]
    fn empty_src_is_invalid_source() {
        let dir = tempfile::tempdir().unwrap();
        let html = r#"<script type="application/json" src=".json"></script>
                      <script type="application/json" src=""></script>"#;
        let err = embed(html, &EmbedOptions::default().with_root(dir.path())).unwrap_err();

        assert!(matches!(err, EmbedJsonError::InvalidSource { .. }));
    }

    #[test]
    fn invalid_json_fails_when_minifying() {
        let html = load_fixture("html/invalid-json.html");
        let err = embed(&html, &fixture_opts()).unwrap_err();
        assert!(matches!(err, EmbedJsonError::EmbedFailure { .. }));

        let out = rewritten(embed(&html, &fixture_opts().with_minify(false)).unwrap());
        assert!(out.contains("{ \"foo\": }"));
    }

    #[test]
    fn first_failure_aborts_the_document() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("ok.json"), "{}").unwrap();
        let html = r#"<script type="application/json" src="missing.json"></script>
                      <script type="application/json" src="ok.json"></script>"#;

        let err = embed(html, &EmbedOptions::default().with_root(dir.path())).unwrap_err();
        assert_eq!(err.to_string(), "invalid source path: missing.json");
    }
}
