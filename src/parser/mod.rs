//! HTTP request file parser.
//!
//! This module turns the content of `.http` and `.rest` files into an
//! [`HttpDocument`]. Parsing runs in two stages:
//!
//! 1. [`tokenizer`] classifies every line into a [`Token`](tokenizer::Token),
//!    tracking line numbers. It never fails.
//! 2. [`assembly`] folds the tokens into requests, settles request names and
//!    checks for duplicates (and, in strict mode, runs the validator).
//!
//! Placeholders are never resolved here; see [`crate::variables`].

pub mod assembly;
pub mod error;
pub mod metadata;
pub mod tokenizer;

use crate::config::ParserOptions;
use crate::models::HttpDocument;
use error::ParseError;
use log::debug;
use std::path::Path;
use tokenizer::{tokenize_with_options, LocatedToken};

/// Parses `.http` content with default options.
///
/// # Examples
///
/// ```
/// use httpfile::parser::parse;
///
/// let content = r#"
/// @base = https://api.example.com
///
/// ## @name listUsers
/// GET {{base}}/users
///
/// ###
///
/// POST {{base}}/users
/// Content-Type: application/json
///
/// {"name": "John"}
/// "#;
///
/// let document = parse(content).unwrap();
/// assert_eq!(document.len(), 2);
/// assert_eq!(document.requests()[0].name, "listUsers");
/// assert_eq!(document.requests()[1].name, "request-1");
/// ```
pub fn parse(content: &str) -> Result<HttpDocument, ParseError> {
    parse_with_options(content, &ParserOptions::default())
}

/// Parses `.http` content.
pub fn parse_with_options(
    content: &str,
    options: &ParserOptions,
) -> Result<HttpDocument, ParseError> {
    let tokens = tokenize_with_options(content, options.normalize_line_endings);
    parse_tokens(&tokens, options)
}

/// Assembles an already tokenized file into a document.
///
/// The options are validated first.
pub fn parse_tokens(
    tokens: &[LocatedToken],
    options: &ParserOptions,
) -> Result<HttpDocument, ParseError> {
    options.validate().map_err(ParseError::InvalidOptions)?;

    let document = assembly::assemble(tokens, options)?;
    debug!(
        requests = document.len(),
        variables = document.variables().len();
        "Parsed http document"
    );
    Ok(document)
}

/// Reads and parses an `.http` file.
pub fn parse_file(path: impl AsRef<Path>, options: &ParserOptions) -> Result<HttpDocument, ParseError> {
    let path = path.as_ref();
    if path.as_os_str().is_empty() {
        return Err(ParseError::EmptyPath);
    }

    let content = std::fs::read_to_string(path).map_err(|source| ParseError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    parse_with_options(&content, options)
}

/// Reads an `.http` file asynchronously, then parses it.
///
/// Only the read is asynchronous; parsing itself does not block. Wrap the
/// future in a timeout to bound the read.
#[cfg(feature = "async")]
pub async fn parse_file_async(
    path: impl AsRef<Path>,
    options: &ParserOptions,
) -> Result<HttpDocument, ParseError> {
    let path = path.as_ref();
    if path.as_os_str().is_empty() {
        return Err(ParseError::EmptyPath);
    }

    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| ParseError::Io {
            path: path.to_path_buf(),
            source,
        })?;

    parse_with_options(&content, options)
}

/// A reusable parser holding its options.
///
/// The parser keeps no state between calls and can be shared freely across
/// threads.
#[derive(Debug, Clone, Default)]
pub struct HttpFileParser {
    options: ParserOptions,
}

impl HttpFileParser {
    pub fn new(options: ParserOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &ParserOptions {
        &self.options
    }

    pub fn parse(&self, content: &str) -> Result<HttpDocument, ParseError> {
        parse_with_options(content, &self.options)
    }

    pub fn parse_file(&self, path: impl AsRef<Path>) -> Result<HttpDocument, ParseError> {
        parse_file(path, &self.options)
    }
}
