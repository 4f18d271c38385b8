//! Option value types shared by the embedder and its hosts.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// MimeTypes
// ---------------------------------------------------------------------------

/// Script `type` values to embed: a single MIME type or a list of them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MimeTypes {
    One(String),
    Many(Vec<String>),
}

impl MimeTypes {
    /// Normalize into a list, promoting a single type to a one-element list.
    pub fn into_vec(self) -> Vec<String> {
        match self {
            Self::One(mime) => vec![mime],
            Self::Many(mimes) => mimes,
        }
    }
}

impl From<&str> for MimeTypes {
    fn from(mime: &str) -> Self {
        Self::One(mime.to_string())
    }
}

impl From<Vec<String>> for MimeTypes {
    fn from(mimes: Vec<String>) -> Self {
        Self::Many(mimes)
    }
}

// ---------------------------------------------------------------------------
// TextEncoding
// ---------------------------------------------------------------------------

/// Text decoding scheme used when reading referenced JSON files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextEncoding {
    #[default]
    Utf8,
    /// 7-bit ASCII; the high bit of every byte is cleared.
    Ascii,
    Latin1,
    Utf16Le,
}

impl TextEncoding {
    /// Decode raw file bytes into text. Malformed sequences become U+FFFD.
    pub fn decode(self, bytes: &[u8]) -> String {
        match self {
            Self::Utf8 => String::from_utf8_lossy(bytes).into_owned(),
            Self::Ascii => bytes.iter().map(|&b| char::from(b & 0x7f)).collect(),
            Self::Latin1 => bytes.iter().map(|&b| char::from(b)).collect(),
            Self::Utf16Le => {
                // A trailing odd byte cannot form a code unit and is dropped.
                let units = bytes
                    .chunks_exact(2)
                    .map(|pair| u16::from_le_bytes([pair[0], pair[1]]));
                char::decode_utf16(units)
                    .map(|c| c.unwrap_or(char::REPLACEMENT_CHARACTER))
                    .collect()
            }
        }
    }

    /// Canonical name of this encoding.
    pub fn name(self) -> &'static str {
        match self {
            Self::Utf8 => "utf8",
            Self::Ascii => "ascii",
            Self::Latin1 => "latin1",
            Self::Utf16Le => "utf16le",
        }
    }
}

impl std::fmt::Display for TextEncoding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Returned when an encoding name is not recognized.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown encoding: {0}")]
pub struct UnknownEncoding(pub String);

impl std::str::FromStr for TextEncoding {
    type Err = UnknownEncoding;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "utf8" | "utf-8" => Ok(Self::Utf8),
            "ascii" => Ok(Self::Ascii),
            "latin1" | "binary" => Ok(Self::Latin1),
            "utf16le" | "utf-16le" | "ucs2" | "ucs-2" => Ok(Self::Utf16Le),
            _ => Err(UnknownEncoding(s.to_string())),
        }
    }
}
