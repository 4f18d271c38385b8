//! Embedder configuration: defaults, caller overrides, and validation.
//!
//! Callers supply a partial [`EmbedOptions`]; it is merged over the
//! process-wide defaults and validated into an [`EmbedConfig`] on every
//! invocation. The CLI can also read options from `embed-json.toml`.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{EmbedJsonError, Result};
use crate::types::MimeTypes;

/// Default config file name looked up in the working directory.
pub const CONFIG_FILE_NAME: &str = "embed-json.toml";

/// Script types embedded when the caller does not say otherwise.
pub const DEFAULT_MIME_TYPES: [&str; 2] = ["application/json", "application/ld+json"];

/// Directory `src` attributes are resolved against by default.
pub const DEFAULT_ROOT: &str = ".";

pub const DEFAULT_MINIFY: bool = true;

pub const DEFAULT_ENCODING: &str = "utf8";

// ---------------------------------------------------------------------------
// Options (partial, caller-supplied)
// ---------------------------------------------------------------------------

/// Caller overrides. Unset fields fall back to the defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmbedOptions {
    /// Base directory for resolving `src` attributes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub root: Option<PathBuf>,

    /// Script `type` values to embed.
    #[serde(default, alias = "mime_types", skip_serializing_if = "Option::is_none")]
    pub mime_types: Option<MimeTypes>,

    /// Re-serialize embedded JSON without insignificant whitespace.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minify: Option<bool>,

    /// Text decoding scheme for referenced files.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub encoding: Option<String>,
}

impl EmbedOptions {
    pub fn with_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.root = Some(root.into());
        self
    }

    pub fn with_mime_types(mut self, mime_types: impl Into<MimeTypes>) -> Self {
        self.mime_types = Some(mime_types.into());
        self
    }

    pub fn with_minify(mut self, minify: bool) -> Self {
        self.minify = Some(minify);
        self
    }

    pub fn with_encoding(mut self, encoding: impl Into<String>) -> Self {
        self.encoding = Some(encoding.into());
        self
    }

    /// Options with every field set to its default value.
    pub fn defaults() -> Self {
        Self {
            root: Some(PathBuf::from(DEFAULT_ROOT)),
            mime_types: Some(MimeTypes::Many(default_mime_types())),
            minify: Some(DEFAULT_MINIFY),
            encoding: Some(DEFAULT_ENCODING.to_string()),
        }
    }

    /// Layer `overrides` on top of `self`; fields set in `overrides` win.
    pub fn merge(self, overrides: EmbedOptions) -> Self {
        Self {
            root: overrides.root.or(self.root),
            mime_types: overrides.mime_types.or(self.mime_types),
            minify: overrides.minify.or(self.minify),
            encoding: overrides.encoding.or(self.encoding),
        }
    }

    /// Build options from a dynamically-typed option map.
    ///
    /// Fields are checked in order `root`, `mimeTypes`, `minify`, `encoding`
    /// and the first bad one is reported. Root existence is checked here too
    /// so a bad root always wins over later fields. Unknown keys are ignored.
    pub fn from_value(value: &Value) -> Result<Self> {
        let map = value
            .as_object()
            .ok_or_else(|| EmbedJsonError::invalid_option("options", "must be an object"))?;

        let root = match map.get("root") {
            None => None,
            Some(Value::String(root)) => {
                let root = PathBuf::from(root);
                check_root(&root)?;
                Some(root)
            }
            Some(_) => {
                return Err(EmbedJsonError::invalid_option("root", "must be a string"));
            }
        };

        let mime_types = match lookup(map, &["mimeTypes", "mime_types"]) {
            None => None,
            Some(Value::String(mime)) => Some(MimeTypes::One(mime.clone())),
            Some(Value::Array(items)) => {
                let mimes = items
                    .iter()
                    .map(|item| item.as_str().map(str::to_string))
                    .collect::<Option<Vec<_>>>()
                    .ok_or_else(mime_types_error)?;
                Some(MimeTypes::Many(mimes))
            }
            Some(_) => return Err(mime_types_error()),
        };

        let minify = match map.get("minify") {
            None => None,
            Some(Value::Bool(minify)) => Some(*minify),
            Some(_) => {
                return Err(EmbedJsonError::invalid_option("minify", "must be a boolean"));
            }
        };

        let encoding = match map.get("encoding") {
            None => None,
            Some(Value::String(encoding)) => Some(encoding.clone()),
            Some(_) => {
                return Err(EmbedJsonError::invalid_option("encoding", "must be a string"));
            }
        };

        Ok(Self {
            root,
            mime_types,
            minify,
            encoding,
        })
    }

    /// Merge over a fresh copy of the defaults and validate.
    pub fn resolve(&self) -> Result<EmbedConfig> {
        let root = self
            .root
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_ROOT));
        check_root(&root)?;

        let mime_types = self
            .mime_types
            .clone()
            .map(MimeTypes::into_vec)
            .unwrap_or_else(default_mime_types);

        let minify = self.minify.unwrap_or(DEFAULT_MINIFY);

        // Checked when a file is decoded, so documents without candidates
        // never fail on the encoding name.
        let encoding = self
            .encoding
            .clone()
            .unwrap_or_else(|| DEFAULT_ENCODING.to_string());

        Ok(EmbedConfig {
            root,
            mime_types,
            minify,
            encoding,
        })
    }
}

fn lookup<'a>(map: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a Value> {
    keys.iter().find_map(|key| map.get(*key))
}

fn mime_types_error() -> EmbedJsonError {
    EmbedJsonError::invalid_option("mimeTypes", "must be a string or an array of strings")
}

fn check_root(root: &Path) -> Result<()> {
    if root.exists() {
        Ok(())
    } else {
        Err(EmbedJsonError::invalid_option(
            "root",
            format!("path {} does not exist", root.display()),
        ))
    }
}

fn default_mime_types() -> Vec<String> {
    DEFAULT_MIME_TYPES.iter().map(|m| m.to_string()).collect()
}

// ---------------------------------------------------------------------------
// Validated config
// ---------------------------------------------------------------------------

/// Normalized, validated configuration for one embed invocation.
#[derive(Debug, Clone, PartialEq)]
pub struct EmbedConfig {
    pub root: PathBuf,
    pub mime_types: Vec<String>,
    pub minify: bool,
    /// Encoding name, parsed into a `TextEncoding` when a file is read.
    pub encoding: String,
}

impl Default for EmbedConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from(DEFAULT_ROOT),
            mime_types: default_mime_types(),
            minify: DEFAULT_MINIFY,
            encoding: DEFAULT_ENCODING.to_string(),
        }
    }
}

impl EmbedConfig {
    /// Validate a dynamically-typed option map into a config.
    pub fn from_value(value: &Value) -> Result<Self> {
        EmbedOptions::from_value(value)?.resolve()
    }
}

// ---------------------------------------------------------------------------
// Config file loading
// ---------------------------------------------------------------------------

/// Path of the default config file in the working directory.
pub fn default_config_path() -> PathBuf {
    PathBuf::from(CONFIG_FILE_NAME)
}

/// Load options from the default config file. Returns empty options if absent.
pub fn load_config() -> Result<EmbedOptions> {
    let path = default_config_path();

    if !path.exists() {
        tracing::debug!(?path, "config file not found, using defaults");
        return Ok(EmbedOptions::default());
    }

    load_config_from(&path)
}

/// Load options from a specific TOML file.
///
/// The file goes through the same field checks as any other option map.
pub fn load_config_from(path: &Path) -> Result<EmbedOptions> {
    let content = std::fs::read_to_string(path).map_err(|e| EmbedJsonError::io(path, e))?;

    let table: toml::Table = toml::from_str(&content).map_err(|e| {
        EmbedJsonError::config(format!("failed to parse {}: {e}", path.display()))
    })?;
    let value = serde_json::to_value(table).map_err(|e| {
        EmbedJsonError::config(format!("failed to read {}: {e}", path.display()))
    })?;

    tracing::debug!(?path, "loaded config file");
    EmbedOptions::from_value(&value)
}

/// Write a config file spelling out every default. Refuses to overwrite.
pub fn init_config(path: &Path) -> Result<()> {
    if path.exists() {
        return Err(EmbedJsonError::config(format!(
            "{} already exists",
            path.display()
        )));
    }

    let content = toml::to_string_pretty(&EmbedOptions::defaults())
        .map_err(|e| EmbedJsonError::config(e.to_string()))?;

    std::fs::write(path, content).map_err(|e| EmbedJsonError::io(path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(())
}
