//! Adapter for build hosts that push files through the embedder one at a time.
//!
//! A host hands over a [`SourceFile`] (virtual path + contents) and gets back
//! either the same file, a file with rewritten contents, or a [`PluginError`]
//! scoped to that one file.

use std::path::PathBuf;

use tracing::{debug, instrument};

use embed_json_shared::{EmbedJsonError, EmbedOptions};

use crate::{Embedded, embed};

/// Name used to tag errors reported to the host.
pub const PLUGIN_NAME: &str = "embed-json";

/// Body of a file flowing through the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Contents {
    /// No body (directories, placeholders). Passed through as is.
    Null,
    /// Fully buffered bytes.
    Buffer(Vec<u8>),
    /// A streaming body. Not supported.
    Stream,
}

/// A file as seen by the build host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    /// Virtual path, used only when reporting errors.
    pub path: PathBuf,
    pub contents: Contents,
}

impl SourceFile {
    pub fn buffer(path: impl Into<PathBuf>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            path: path.into(),
            contents: Contents::Buffer(bytes.into()),
        }
    }
}

/// An embed error tagged with the plugin name and the file it belongs to.
#[derive(Debug, thiserror::Error)]
#[error("embed-json: {}: {source}", .path.display())]
pub struct PluginError {
    pub path: PathBuf,
    #[source]
    pub source: EmbedJsonError,
}

/// Run one file through the embedder.
///
/// Untouched files come back with their original buffer; rewritten files get
/// the serialized document as their new buffer.
#[instrument(skip_all, fields(path = %file.path.display()))]
pub fn process_file(
    file: SourceFile,
    options: &EmbedOptions,
) -> std::result::Result<SourceFile, PluginError> {
    let SourceFile { path, contents } = file;
    let bytes = match contents {
        Contents::Buffer(bytes) => bytes,
        Contents::Null => {
            return Ok(SourceFile {
                path,
                contents: Contents::Null,
            });
        }
        Contents::Stream => {
            return Err(PluginError {
                path,
                source: EmbedJsonError::StreamsNotSupported,
            });
        }
    };

    let result = {
        let document = String::from_utf8_lossy(&bytes);
        embed(&document, options)
    };

    let contents = match result {
        Ok(Embedded::Unchanged) => Contents::Buffer(bytes),
        Ok(Embedded::Rewritten { html, embedded }) => {
            debug!(embedded, "rewrote file contents");
            Contents::Buffer(html.into_bytes())
        }
        Err(source) => return Err(PluginError { path, source }),
    };

    Ok(SourceFile { path, contents })
}

/// Run every file through the embedder, in order.
///
/// Each file's failure is reported in its own slot and never stops the rest.
pub fn process_all<I>(
    files: I,
    options: &EmbedOptions,
) -> Vec<std::result::Result<SourceFile, PluginError>>
where
    I: IntoIterator<Item = SourceFile>,
{
    files
        .into_iter()
        .map(|file| process_file(file, options))
        .collect()
}
