//! File body references: request bodies loaded from external files.
//!
//! Three directive forms are supported in the body region of a request:
//!
//! ```text
//! < ./payload.json            raw bytes, no variable processing
//! <@ ./payload.json           variables processed, read as UTF-8
//! <@latin1 ./payload.txt      variables processed, read as ISO-8859-1
//! ```

use serde::{Deserialize, Serialize};

/// Text encodings a file body can be read with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TextEncoding {
    Utf8,
    Utf16Le,
    Utf16Be,
    Ascii,
    /// ISO-8859-1
    Latin1,
    Windows1252,
}

impl TextEncoding {
    /// Resolves an encoding label such as `utf-8`, `latin1` or `cp1252`.
    ///
    /// Labels are matched case-insensitively. Returns `None` for labels
    /// that name no supported encoding.
    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim().to_ascii_lowercase().as_str() {
            "utf8" | "utf-8" => Some(TextEncoding::Utf8),
            "utf16" | "utf-16" | "utf16le" | "utf-16le" | "unicode" => Some(TextEncoding::Utf16Le),
            "utf16be" | "utf-16be" | "bigendianunicode" => Some(TextEncoding::Utf16Be),
            "ascii" | "us-ascii" => Some(TextEncoding::Ascii),
            "latin1" | "latin-1" | "l1" | "iso-8859-1" | "iso8859-1" | "iso88591" => {
                Some(TextEncoding::Latin1)
            }
            "windows-1252" | "windows1252" | "cp1252" => Some(TextEncoding::Windows1252),
            _ => None,
        }
    }

    /// Resolves an encoding label, falling back to UTF-8 for unknown labels.
    pub fn from_label_or_utf8(label: &str) -> Self {
        Self::from_label(label).unwrap_or(TextEncoding::Utf8)
    }

    /// Canonical (IANA) name of the encoding.
    pub fn name(&self) -> &'static str {
        match self {
            TextEncoding::Utf8 => "UTF-8",
            TextEncoding::Utf16Le => "UTF-16LE",
            TextEncoding::Utf16Be => "UTF-16BE",
            TextEncoding::Ascii => "US-ASCII",
            TextEncoding::Latin1 => "ISO-8859-1",
            TextEncoding::Windows1252 => "windows-1252",
        }
    }
}

impl std::fmt::Display for TextEncoding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// A directive loading the request body from a file at execution time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileBodyReference {
    /// Path as written, trimmed at the outer edges only.
    pub file_path: String,

    /// Whether the loaded content goes through variable substitution.
    pub process_variables: bool,

    /// Encoding used to decode the file. `None` for the raw `<` form.
    pub encoding: Option<TextEncoding>,
}

impl FileBodyReference {
    /// `< path`
    pub fn raw(file_path: impl Into<String>) -> Self {
        Self {
            file_path: file_path.into(),
            process_variables: false,
            encoding: None,
        }
    }

    /// `<@ path` or `<@encoding path`
    pub fn with_variables(file_path: impl Into<String>, encoding: TextEncoding) -> Self {
        Self {
            file_path: file_path.into(),
            process_variables: true,
            encoding: Some(encoding),
        }
    }
}
