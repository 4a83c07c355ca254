//! Interpretation of `# @key value` metadata comments.
//!
//! ```text
//! # @name login
//! # @expect status 200
//! # @expect header Content-Type: application/json
//! # @expect max-time 500ms
//! ```

use crate::models::{Expectation, ExpectationKind};

/// A metadata comment after interpretation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MetadataDirective {
    /// `@name <id>`
    Name(String),
    /// `@expect <kind> <value>` with a recognized kind.
    Expect(Expectation),
    /// Any other directive, or an `@expect` with an unknown kind.
    Unknown { key: String, value: String },
}

/// Interprets the key and payload of a metadata comment.
pub fn parse_directive(key: &str, value: &str) -> MetadataDirective {
    match key.to_ascii_lowercase().as_str() {
        "name" => MetadataDirective::Name(value.trim().to_string()),
        "expect" => match parse_expectation(value) {
            Some(expectation) => MetadataDirective::Expect(expectation),
            None => MetadataDirective::Unknown {
                key: key.to_string(),
                value: value.to_string(),
            },
        },
        _ => MetadataDirective::Unknown {
            key: key.to_string(),
            value: value.to_string(),
        },
    }
}

/// Splits an `@expect` payload into its kind keyword and raw value.
///
/// Returns `None` when the payload is empty or the keyword is unknown. The
/// value is not checked here; the validator does that.
pub fn parse_expectation(payload: &str) -> Option<Expectation> {
    let payload = payload.trim();
    let (keyword, rest) = match payload.split_once(char::is_whitespace) {
        Some((keyword, rest)) => (keyword, rest.trim()),
        None => (payload, ""),
    };

    let kind = ExpectationKind::from_keyword(keyword)?;
    Some(Expectation::new(kind, rest))
}
