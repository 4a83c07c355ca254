//! Error types for `.http` parsing.
//!
//! Tokenizing never fails, and most irregularities in a partially written file
//! are absorbed. Parsing only fails on invalid options, on duplicate request
//! names (when name validation is on), on validation errors in strict mode,
//! and on unreadable input files.

use crate::validation::ValidationError;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while parsing an `.http` file.
#[derive(Debug, Error)]
pub enum ParseError {
    /// Two requests share a name.
    #[error("Duplicate request name '{name}' at line {line} (first defined at line {first_line})")]
    DuplicateRequestName {
        /// The conflicting name
        name: String,
        /// Line of the later occurrence (1-based)
        line: usize,
        /// Line of the first occurrence (1-based)
        first_line: usize,
    },

    /// Strict mode validation found errors.
    #[error("Validation failed with {} error(s): {}", .errors.len(), summarize(.errors))]
    Validation {
        /// Every validation error, in document order
        errors: Vec<ValidationError>,
    },

    /// The parser options failed [`ParserOptions::validate`](crate::ParserOptions::validate).
    #[error("Invalid parser options: {0}")]
    InvalidOptions(String),

    /// A file entry point was called with an empty path.
    #[error("No file path given")]
    EmptyPath,

    /// The input file could not be read.
    #[error("Failed to read '{}': {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ParseError {
    /// Returns the line number most relevant to this error, if any.
    ///
    /// For validation failures this is the line of the first error.
    pub fn line(&self) -> Option<usize> {
        match self {
            ParseError::DuplicateRequestName { line, .. } => Some(*line),
            ParseError::Validation { errors } => errors.first().map(|e| e.line),
            ParseError::InvalidOptions(_) | ParseError::EmptyPath | ParseError::Io { .. } => None,
        }
    }
}

fn summarize(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(|e| format!("line {}: {}", e.line, e.message))
        .collect::<Vec<_>>()
        .join("; ")
}
