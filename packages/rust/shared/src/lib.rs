//! Shared error model, option types, and configuration for embed-json.
//!
//! This crate is the foundation depended on by the embedder and the CLI.
//! It provides:
//! - [`EmbedJsonError`]: the unified error type
//! - Option value types ([`MimeTypes`], [`TextEncoding`])
//! - Configuration ([`EmbedOptions`], [`EmbedConfig`], config loading)

pub mod config;
pub mod error;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    CONFIG_FILE_NAME, DEFAULT_ENCODING, DEFAULT_MIME_TYPES, DEFAULT_MINIFY, DEFAULT_ROOT,
    EmbedConfig, EmbedOptions, default_config_path, init_config, load_config, load_config_from,
};
pub use error::{EmbedJsonError, Result};
pub use types::{MimeTypes, TextEncoding, UnknownEncoding};
