//! Diagnostic records produced by the validator.

use serde::Serialize;
use std::fmt;

/// Categories of validation errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ValidationErrorKind {
    /// Request has no name
    MissingRequestName,
    /// Request name contains characters outside `[A-Za-z0-9_-]`
    InvalidRequestName,
    /// Request name exceeds the configured maximum length
    RequestNameTooLong,
    /// Two requests share a name
    DuplicateRequestName,
    /// Request URL is empty
    EmptyUrl,
    /// Header with an empty name
    EmptyHeaderName,
    /// `@expect` payload that cannot be checked
    InvalidExpectation,
    /// File variable with an empty name
    EmptyVariableName,
    /// File variable that can reach itself through its references
    CircularVariableReference,
}

/// Categories of validation warnings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ValidationWarningKind {
    /// No method given; GET is assumed
    MissingMethod,
    /// Method that is not a standard HTTP verb
    NonStandardMethod,
    /// Standard verb not written in upper case
    UnconventionalMethod,
    HeaderNameWhitespace,
    /// Blank `Content-Type` or `Authorization` value
    EmptyHeaderValue,
    /// `Content-Length` is computed when the request is sent
    ContentLengthIgnored,
    /// POST/PUT/PATCH without any body
    EmptyBody,
    VariableNameWhitespace,
}

/// A validation error. Errors make a document invalid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationError {
    pub kind: ValidationErrorKind,
    /// 1-based source line
    pub line: usize,
    pub message: String,
}

impl ValidationError {
    pub fn new(kind: ValidationErrorKind, line: usize, message: impl Into<String>) -> Self {
        Self {
            kind,
            line,
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "error at line {}: {}", self.line, self.message)
    }
}

/// A validation warning. Warnings never affect validity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationWarning {
    pub kind: ValidationWarningKind,
    /// 1-based source line
    pub line: usize,
    pub message: String,
}

impl ValidationWarning {
    pub fn new(kind: ValidationWarningKind, line: usize, message: impl Into<String>) -> Self {
        Self {
            kind,
            line,
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "warning at line {}: {}", self.line, self.message)
    }
}

/// Outcome of validating a document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationResult {
    pub errors: Vec<ValidationError>,
    pub warnings: Vec<ValidationWarning>,
}

impl ValidationResult {
    /// A document is valid when there are no errors.
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    /// One-line count of errors and warnings, e.g. `"2 error(s), 1 warning(s)"`.
    pub fn summary(&self) -> String {
        format!(
            "{} error(s), {} warning(s)",
            self.errors.len(),
            self.warnings.len()
        )
    }

    /// Errors reported for the given kind.
    pub fn errors_of(&self, kind: ValidationErrorKind) -> impl Iterator<Item = &ValidationError> {
        self.errors.iter().filter(move |e| e.kind == kind)
    }

    /// Warnings reported for the given kind.
    pub fn warnings_of(
        &self,
        kind: ValidationWarningKind,
    ) -> impl Iterator<Item = &ValidationWarning> {
        self.warnings.iter().filter(move |w| w.kind == kind)
    }

    pub(crate) fn error(&mut self, kind: ValidationErrorKind, line: usize, message: impl Into<String>) {
        self.errors.push(ValidationError::new(kind, line, message));
    }

    pub(crate) fn warning(
        &mut self,
        kind: ValidationWarningKind,
        line: usize,
        message: impl Into<String>,
    ) {
        self.warnings.push(ValidationWarning::new(kind, line, message));
    }
}
