//! Resolving `src` attributes against the root and reading the referenced files.

use std::io::{self, ErrorKind};
use std::path::{Component, Path, PathBuf};

use embed_json_shared::{EmbedJsonError, Result, TextEncoding};
use tracing::debug;

/// Resolve `src` under `root` into an absolute, lexically normalized path.
///
/// `src` is always taken relative to `root`, even with a leading slash.
/// Fails with `InvalidSource` if `src` is empty or does not name a regular file.
pub(crate) fn resolve(root: &Path, src: &str) -> Result<PathBuf> {
    if src.is_empty() {
        return Err(EmbedJsonError::invalid_source(src));
    }

    let joined = root.join(src.trim_start_matches(['/', '\\']));
    let absolute = if joined.is_absolute() {
        joined
    } else {
        let cwd = std::env::current_dir().map_err(|e| EmbedJsonError::io(&joined, e))?;
        cwd.join(joined)
    };
    let path = normalize(&absolute);

    // Any stat failure means there is no file to embed, whatever the cause.
    match std::fs::metadata(&path) {
        Ok(meta) if meta.is_file() => Ok(path),
        Ok(_) => Err(EmbedJsonError::invalid_source(src)),
        Err(e) => {
            debug!(src, error = %e, "source path is not readable");
            Err(EmbedJsonError::invalid_source(src))
        }
    }
}

/// Read and decode a resolved file. Returns `None` for zero-length content.
///
/// The encoding name is only checked here, when a file is actually decoded.
pub(crate) fn read(path: &Path, encoding: &str) -> Result<Option<String>> {
    let encoding: TextEncoding = encoding
        .parse()
        .map_err(|e| EmbedJsonError::io(path, io::Error::new(ErrorKind::InvalidInput, e)))?;
    let bytes = std::fs::read(path).map_err(|e| EmbedJsonError::io(path, e))?;
    let text = encoding.decode(&bytes);

    if text.is_empty() {
        return Ok(None);
    }
    Ok(Some(text))
}

/// Collapse `.` and `..` components without touching the filesystem.
fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if matches!(out.components().next_back(), Some(Component::Normal(_))) {
                    out.pop();
                }
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}
