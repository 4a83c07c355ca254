//! The parsed representation of a whole `.http` file.

use super::request::HttpRequest;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Root of a parsed `.http` file: file variables and requests, both in
/// source order.
///
/// A document is never mutated after parsing. [`HttpDocument::with_variable`]
/// returns a modified copy instead.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HttpDocument {
    requests: Vec<HttpRequest>,
    variables: IndexMap<String, String>,
    #[serde(default)]
    variable_lines: IndexMap<String, usize>,
}

impl HttpDocument {
    /// Builds a document from requests and file variables.
    ///
    /// Variables built this way have no recorded source line.
    pub fn new(requests: Vec<HttpRequest>, variables: IndexMap<String, String>) -> Self {
        Self {
            requests,
            variables,
            variable_lines: IndexMap::new(),
        }
    }

    pub(crate) fn from_parsed(
        requests: Vec<HttpRequest>,
        variables: IndexMap<String, String>,
        variable_lines: IndexMap<String, usize>,
    ) -> Self {
        Self {
            requests,
            variables,
            variable_lines,
        }
    }

    /// Requests in source order.
    pub fn requests(&self) -> &[HttpRequest] {
        &self.requests
    }

    /// File variables (`@name = value`) in declaration order.
    pub fn variables(&self) -> &IndexMap<String, String> {
        &self.variables
    }

    /// Number of requests.
    pub fn len(&self) -> usize {
        self.requests.len()
    }

    pub fn is_empty(&self) -> bool {
        self.requests.is_empty()
    }

    /// Finds a request by name. With duplicate names the first one wins.
    pub fn request(&self, name: &str) -> Option<&HttpRequest> {
        self.requests.iter().find(|r| r.name == name)
    }

    /// Finds the request whose block contains `line`: the last request
    /// starting at or before it.
    pub fn request_at_line(&self, line: usize) -> Option<&HttpRequest> {
        self.requests
            .iter()
            .take_while(|r| r.source_line <= line)
            .last()
    }

    /// 1-based line where a file variable was declared, if known.
    pub fn variable_line(&self, name: &str) -> Option<usize> {
        self.variable_lines.get(name).copied()
    }

    /// Returns a copy of this document with a file variable added or overridden.
    pub fn with_variable(&self, name: impl Into<String>, value: impl Into<String>) -> Self {
        let mut copy = self.clone();
        copy.variables.insert(name.into(), value.into());
        copy
    }
}
