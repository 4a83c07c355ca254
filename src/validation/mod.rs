//! Structural validation of parsed documents.
//!
//! The validator lints a [`HttpDocument`] against the conventions of the
//! format:
//! - request names (presence, charset, length, uniqueness)
//! - URLs and HTTP methods
//! - headers
//! - `@expect` payloads
//! - file variables, including reference cycles
//!
//! Problems are returned as data in a [`ValidationResult`]. Only the strict
//! parse path turns errors into a failure.

pub mod diagnostics;

pub use diagnostics::{
    ValidationError, ValidationErrorKind, ValidationResult, ValidationWarning,
    ValidationWarningKind,
};

use crate::models::{Expectation, ExpectationKind, HttpDocument, HttpMethod, HttpRequest};
use crate::variables::detect_circular_references;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;

static MAX_TIME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d+)ms$").expect("Failed to compile max-time regex"));

/// Returns true for characters allowed in request names: `[A-Za-z0-9_-]`.
pub fn is_valid_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '-'
}

/// Options controlling the validator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatorOptions {
    /// Maximum request name length, in characters
    pub max_request_name_length: usize,
    /// Accept POST/PUT/PATCH requests without a body
    pub allow_empty_bodies: bool,
    /// Report file variables that reference themselves
    pub check_variable_cycles: bool,
}

impl Default for ValidatorOptions {
    fn default() -> Self {
        Self {
            max_request_name_length: 50,
            allow_empty_bodies: true,
            check_variable_cycles: true,
        }
    }
}

/// Validates documents. Holds only its options, so one instance can be
/// shared and reused.
#[derive(Debug, Clone, Default)]
pub struct Validator {
    options: ValidatorOptions,
}

impl Validator {
    pub fn new(options: ValidatorOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &ValidatorOptions {
        &self.options
    }

    /// Runs every check over every request and file variable.
    ///
    /// # Examples
    ///
    /// ```
    /// use httpfile::parser::parse;
    /// use httpfile::validation::Validator;
    ///
    /// let document = parse("# @expect status 700\nGET https://example.com").unwrap();
    /// let result = Validator::default().validate(&document);
    ///
    /// assert!(!result.is_valid());
    /// assert!(result.errors[0].message.contains("between 100 and 599"));
    /// ```
    pub fn validate(&self, document: &HttpDocument) -> ValidationResult {
        let mut result = ValidationResult::default();

        for request in document.requests() {
            self.check_name(request, &mut result);
            check_url(request, &mut result);
            check_method(request, &mut result);
            check_headers(request, &mut result);
            self.check_body(request, &mut result);
            for expectation in &request.metadata.expectations {
                check_expectation(expectation, request.source_line, &mut result);
            }
        }

        check_duplicate_names(document, &mut result);
        self.check_variables(document, &mut result);

        result
    }

    fn check_name(&self, request: &HttpRequest, result: &mut ValidationResult) {
        let line = request.source_line;
        let name = request.name.as_str();

        if name.trim().is_empty() {
            result.error(
                ValidationErrorKind::MissingRequestName,
                line,
                "Request has no name",
            );
            return;
        }

        if !name.chars().all(is_valid_name_char) {
            result.error(
                ValidationErrorKind::InvalidRequestName,
                line,
                format!(
                    "Request name '{}' contains invalid characters (allowed: letters, digits, '_' and '-')",
                    name
                ),
            );
        }

        let length = name.chars().count();
        if length > self.options.max_request_name_length {
            result.error(
                ValidationErrorKind::RequestNameTooLong,
                line,
                format!(
                    "Request name '{}' is {} characters long (maximum {})",
                    name, length, self.options.max_request_name_length
                ),
            );
        }
    }

    fn check_body(&self, request: &HttpRequest, result: &mut ValidationResult) {
        if self.options.allow_empty_bodies {
            return;
        }

        let expects_body = request.http_method().is_some_and(|m| m.expects_body());
        if expects_body && !request.has_body() && request.file_body.is_none() {
            result.warning(
                ValidationWarningKind::EmptyBody,
                request.source_line,
                format!("{} request has no body", request.effective_method()),
            );
        }
    }

    fn check_variables(&self, document: &HttpDocument, result: &mut ValidationResult) {
        for name in document.variables().keys() {
            let line = document.variable_line(name).unwrap_or(0);

            if name.trim().is_empty() {
                result.error(
                    ValidationErrorKind::EmptyVariableName,
                    line,
                    "File variable has an empty name",
                );
            } else if name.chars().any(char::is_whitespace) {
                result.warning(
                    ValidationWarningKind::VariableNameWhitespace,
                    line,
                    format!("File variable name '{}' contains whitespace", name),
                );
            }
        }

        if !self.options.check_variable_cycles {
            return;
        }

        let cyclic = detect_circular_references(document.variables());
        for name in document.variables().keys().filter(|n| cyclic.contains(*n)) {
            result.error(
                ValidationErrorKind::CircularVariableReference,
                document.variable_line(name).unwrap_or(0),
                format!("File variable '{}' has a circular reference", name),
            );
        }
    }
}

fn check_url(request: &HttpRequest, result: &mut ValidationResult) {
    if request.url.trim().is_empty() {
        result.error(
            ValidationErrorKind::EmptyUrl,
            request.source_line,
            "Request URL is empty",
        );
    }
}

fn check_method(request: &HttpRequest, result: &mut ValidationResult) {
    let line = request.source_line;
    let method = request.method.trim();

    if method.is_empty() {
        result.warning(
            ValidationWarningKind::MissingMethod,
            line,
            "No HTTP method given, defaulting to GET",
        );
    } else if HttpMethod::from_exact(method).is_none() {
        match HttpMethod::from_str(method) {
            Some(standard) => result.warning(
                ValidationWarningKind::UnconventionalMethod,
                line,
                format!("HTTP method '{}' should be written as '{}'", method, standard),
            ),
            None => result.warning(
                ValidationWarningKind::NonStandardMethod,
                line,
                format!("Non-standard HTTP method '{}'", method),
            ),
        }
    }
}

fn check_headers(request: &HttpRequest, result: &mut ValidationResult) {
    for (name, value) in &request.headers {
        let line = request.header_line(name).unwrap_or(request.source_line);
        let trimmed = name.trim();

        if trimmed.is_empty() {
            result.error(
                ValidationErrorKind::EmptyHeaderName,
                line,
                "Header name is empty",
            );
            continue;
        }

        if name.chars().any(char::is_whitespace) {
            result.warning(
                ValidationWarningKind::HeaderNameWhitespace,
                line,
                format!("Header name '{}' contains whitespace", name),
            );
        }

        let is_required_value =
            trimmed.eq_ignore_ascii_case("content-type") || trimmed.eq_ignore_ascii_case("authorization");
        if is_required_value && value.trim().is_empty() {
            result.warning(
                ValidationWarningKind::EmptyHeaderValue,
                line,
                format!("Header '{}' has an empty value", trimmed),
            );
        }

        if trimmed.eq_ignore_ascii_case("content-length") {
            result.warning(
                ValidationWarningKind::ContentLengthIgnored,
                line,
                "Content-Length is computed from the body, the written value is ignored",
            );
        }
    }
}

fn check_expectation(expectation: &Expectation, line: usize, result: &mut ValidationResult) {
    let value = expectation.value.trim();

    match expectation.kind {
        ExpectationKind::StatusCode => {
            let in_range = value
                .parse::<u16>()
                .is_ok_and(|code| (100..=599).contains(&code));
            if !in_range {
                result.error(
                    ValidationErrorKind::InvalidExpectation,
                    line,
                    format!(
                        "Expected status '{}' must be an integer between 100 and 599",
                        value
                    ),
                );
            }
        }
        ExpectationKind::MaxTime => {
            let positive = MAX_TIME
                .captures(value)
                .and_then(|caps| caps[1].parse::<u64>().ok())
                .is_some_and(|ms| ms > 0);
            if !positive {
                result.error(
                    ValidationErrorKind::InvalidExpectation,
                    line,
                    format!(
                        "Max time '{}' must be a positive number of milliseconds, e.g. '500ms'",
                        value
                    ),
                );
            }
        }
        ExpectationKind::BodyPath | ExpectationKind::Schema | ExpectationKind::Header => {
            if value.is_empty() {
                result.error(
                    ValidationErrorKind::InvalidExpectation,
                    line,
                    format!("Expectation '{}' needs a value", expectation.kind.keyword()),
                );
            }
        }
        ExpectationKind::BodyContains => {}
    }
}

/// Reports every repeated name at the line of the later occurrence.
fn check_duplicate_names(document: &HttpDocument, result: &mut ValidationResult) {
    let mut seen: HashMap<&str, usize> = HashMap::new();

    for request in document.requests() {
        let name = request.name.as_str();
        if name.trim().is_empty() {
            continue;
        }

        match seen.get(name) {
            Some(&first_line) => result.error(
                ValidationErrorKind::DuplicateRequestName,
                request.source_line,
                format!(
                    "Duplicate request name '{}' (first defined at line {})",
                    name, first_line
                ),
            ),
            None => {
                seen.insert(name, request.source_line);
            }
        }
    }
}
