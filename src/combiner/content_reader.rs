use crate::error::{MetaUtilsError, Result};
use encoding_rs::Encoding;
use log::debug;
use std::fs;
use std::path::Path;

/// Returned when none of the configured encodings decode a file.
pub const UNREADABLE_PLACEHOLDER: &str = "Could not read file with any encoding";

const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextEncoding {
    Utf8,
    /// UTF-8 with a leading byte-order mark removed.
    Utf8Sig,
    /// ISO-8859-1: every byte maps to the code point of the same value.
    Latin1,
    Whatwg(&'static Encoding),
}

impl TextEncoding {
    pub fn from_label(label: &str) -> Result<Self> {
        let normalized = label.trim().to_lowercase().replace('_', "-");

        match normalized.as_str() {
            "utf-8" | "utf8" => Ok(TextEncoding::Utf8),
            "utf-8-sig" | "utf8-sig" => Ok(TextEncoding::Utf8Sig),
            // WHATWG folds these into windows-1252, which is not what we want
            "latin-1" | "latin1" | "iso-8859-1" | "l1" => Ok(TextEncoding::Latin1),
            other => Encoding::for_label(other.as_bytes())
                .map(TextEncoding::Whatwg)
                .ok_or_else(|| MetaUtilsError::Config {
                    message: format!("Unknown text encoding: '{}'", label),
                }),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            TextEncoding::Utf8 => "utf-8",
            TextEncoding::Utf8Sig => "utf-8-sig",
            TextEncoding::Latin1 => "latin-1",
            TextEncoding::Whatwg(encoding) => encoding.name(),
        }
    }

    /// Strict decode; `None` on any malformed sequence.
    pub fn decode(&self, bytes: &[u8]) -> Option<String> {
        match self {
            TextEncoding::Utf8 => encoding_rs::UTF_8
                .decode_without_bom_handling_and_without_replacement(bytes)
                .map(|s| s.into_owned()),
            TextEncoding::Utf8Sig => {
                let body = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
                encoding_rs::UTF_8
                    .decode_without_bom_handling_and_without_replacement(body)
                    .map(|s| s.into_owned())
            }
            TextEncoding::Latin1 => Some(bytes.iter().map(|&b| b as char).collect()),
            TextEncoding::Whatwg(encoding) => encoding
                .decode_without_bom_handling_and_without_replacement(bytes)
                .map(|s| s.into_owned()),
        }
    }
}

/// Reads file text, trying each encoding in order. Never fails: problems are
/// reported inline in the returned text.
#[derive(Debug, Clone)]
pub struct ContentReader {
    encodings: Vec<TextEncoding>,
}

impl ContentReader {
    pub fn new(encodings: Vec<TextEncoding>) -> Self {
        Self { encodings }
    }

    pub fn from_labels<S: AsRef<str>>(labels: &[S]) -> Result<Self> {
        let encodings = labels
            .iter()
            .map(|label| TextEncoding::from_label(label.as_ref()))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self::new(encodings))
    }

    pub fn read<P: AsRef<Path>>(&self, path: P) -> String {
        let path = path.as_ref();
        match fs::read(path) {
            Ok(bytes) => self.decode(&bytes),
            Err(e) => {
                debug!("Failed to read {}: {}", path.display(), e);
                format!("Error reading file: {}", e)
            }
        }
    }

    pub fn decode(&self, bytes: &[u8]) -> String {
        for encoding in &self.encodings {
            if let Some(text) = encoding.decode(bytes) {
                return text;
            }
            debug!("Content is not valid {}", encoding.name());
        }

        UNREADABLE_PLACEHOLDER.to_string()
    }
}

impl Default for ContentReader {
    fn default() -> Self {
        Self::new(vec![
            TextEncoding::Utf8,
            TextEncoding::Utf8Sig,
            TextEncoding::Latin1,
            TextEncoding::Whatwg(encoding_rs::WINDOWS_1252),
        ])
    }
}
