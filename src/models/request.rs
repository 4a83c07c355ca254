//! HTTP request data models.
//!
//! This module defines the structures for a single request parsed from an
//! `.http` file: the method, URL, ordered headers, body, file body reference
//! and the metadata attached through `# @name` / `# @expect` comments.

use super::expectation::Expectation;
use super::file_body::FileBodyReference;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// HTTP request method.
///
/// Represents the standard HTTP methods as defined in RFC 7231 and RFC 5789.
/// Requests keep their method as written (see [`HttpRequest::method`]); this
/// enum is used to recognize conventional verbs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HttpMethod {
    /// HTTP GET method - retrieve a resource
    GET,
    /// HTTP POST method - submit data to create a resource
    POST,
    /// HTTP PUT method - replace a resource
    PUT,
    /// HTTP DELETE method - remove a resource
    DELETE,
    /// HTTP PATCH method - partially modify a resource
    PATCH,
    /// HTTP OPTIONS method - describe communication options
    OPTIONS,
    /// HTTP HEAD method - retrieve headers only
    HEAD,
    /// HTTP TRACE method - perform a message loop-back test
    TRACE,
    /// HTTP CONNECT method - establish a tunnel to the server
    CONNECT,
}

impl HttpMethod {
    /// All standard methods, in declaration order.
    pub const ALL: [HttpMethod; 9] = [
        HttpMethod::GET,
        HttpMethod::POST,
        HttpMethod::PUT,
        HttpMethod::DELETE,
        HttpMethod::PATCH,
        HttpMethod::OPTIONS,
        HttpMethod::HEAD,
        HttpMethod::TRACE,
        HttpMethod::CONNECT,
    ];

    /// Returns the string representation of the HTTP method.
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::GET => "GET",
            HttpMethod::POST => "POST",
            HttpMethod::PUT => "PUT",
            HttpMethod::DELETE => "DELETE",
            HttpMethod::PATCH => "PATCH",
            HttpMethod::OPTIONS => "OPTIONS",
            HttpMethod::HEAD => "HEAD",
            HttpMethod::TRACE => "TRACE",
            HttpMethod::CONNECT => "CONNECT",
        }
    }

    /// Parses a string into an HttpMethod, ignoring case.
    ///
    /// # Returns
    ///
    /// `Some(HttpMethod)` if the string is a standard HTTP method, `None` otherwise.
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "GET" => Some(HttpMethod::GET),
            "POST" => Some(HttpMethod::POST),
            "PUT" => Some(HttpMethod::PUT),
            "DELETE" => Some(HttpMethod::DELETE),
            "PATCH" => Some(HttpMethod::PATCH),
            "OPTIONS" => Some(HttpMethod::OPTIONS),
            "HEAD" => Some(HttpMethod::HEAD),
            "TRACE" => Some(HttpMethod::TRACE),
            "CONNECT" => Some(HttpMethod::CONNECT),
            _ => None,
        }
    }

    /// Parses a method spelled exactly as the standard upper-case verb.
    pub fn from_exact(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|m| m.as_str() == s)
    }

    /// Whether requests with this method conventionally carry a body.
    pub fn expects_body(&self) -> bool {
        matches!(self, HttpMethod::POST | HttpMethod::PUT | HttpMethod::PATCH)
    }
}

impl std::fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Metadata attached to a request through comment directives.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestMetadata {
    /// Mirror of the request's final name.
    pub name: String,

    /// `@expect` assertions in source order.
    pub expectations: Vec<Expectation>,

    /// Unrecognized `# @key value` directives, kept only when the parser
    /// is told not to ignore unknown metadata.
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub directives: IndexMap<String, String>,
}

/// Represents an HTTP request parsed from a `.http` or `.rest` file.
///
/// URL, header values and body are stored exactly as written, placeholders
/// included. Resolution happens later through the variable and response
/// resolvers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HttpRequest {
    /// Request name, from `# @name`, a legacy `### name` separator, or
    /// synthesized as `request-N`.
    pub name: String,

    /// HTTP method as written. Empty when the request line has no method,
    /// in which case the request is sent as GET.
    pub method: String,

    /// Target URL, possibly containing `{{...}}` placeholders.
    pub url: String,

    /// Optional HTTP version from the request line, e.g. "HTTP/1.1".
    pub http_version: Option<String>,

    /// Request headers in source order. Names are stored as written.
    pub headers: IndexMap<String, String>,

    /// 1-based source line of each header, keyed like `headers`.
    ///
    /// Empty for requests built in code.
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub header_lines: IndexMap<String, usize>,

    /// Literal request body.
    pub body: Option<String>,

    /// External file the body is loaded from at execution time.
    ///
    /// Independent from `body`: when both are present the executing
    /// harness decides which one wins.
    pub file_body: Option<FileBodyReference>,

    /// Name mirror and expectations.
    pub metadata: RequestMetadata,

    /// 1-based line number of the request line.
    pub source_line: usize,
}

impl HttpRequest {
    /// Creates a new HttpRequest with the given method and URL.
    ///
    /// All optional fields are empty and the name is blank.
    pub fn new(method: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: String::new(),
            method: method.into(),
            url: url.into(),
            http_version: None,
            headers: IndexMap::new(),
            header_lines: IndexMap::new(),
            body: None,
            file_body: None,
            metadata: RequestMetadata::default(),
            source_line: 0,
        }
    }

    /// Returns the method the request is sent with: the written method,
    /// or GET when none was written.
    pub fn effective_method(&self) -> &str {
        if self.method.trim().is_empty() {
            HttpMethod::GET.as_str()
        } else {
            self.method.as_str()
        }
    }

    /// Returns the standard method for this request, if the written method is one.
    pub fn http_method(&self) -> Option<HttpMethod> {
        HttpMethod::from_str(self.effective_method())
    }

    /// Adds a header to the request, keeping the position of an earlier
    /// header with the same name.
    pub fn add_header(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.headers.insert(name.into(), value.into());
    }

    /// 1-based line a header was written on, when parsed from source.
    pub fn header_line(&self, name: &str) -> Option<usize> {
        self.header_lines.get(name).copied()
    }

    /// Sets the request body.
    pub fn set_body(&mut self, body: impl Into<String>) {
        self.body = Some(body.into());
    }

    /// Checks if the request has a non-empty literal body.
    pub fn has_body(&self) -> bool {
        self.body.as_ref().is_some_and(|b| !b.is_empty())
    }

    /// Looks up a header value by case-insensitive name.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Gets the Content-Type header value if present.
    pub fn content_type(&self) -> Option<&str> {
        self.header("content-type")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_method_as_str() {
        assert_eq!(HttpMethod::GET.as_str(), "GET");
        assert_eq!(HttpMethod::POST.as_str(), "POST");
        assert_eq!(HttpMethod::DELETE.as_str(), "DELETE");
    }

    #[test]
    fn test_http_method_from_str() {
        assert_eq!(HttpMethod::from_str("GET"), Some(HttpMethod::GET));
        assert_eq!(HttpMethod::from_str("get"), Some(HttpMethod::GET));
        assert_eq!(HttpMethod::from_str("Post"), Some(HttpMethod::POST));
        assert_eq!(HttpMethod::from_str("INVALID"), None);
    }

    #[test]
    fn test_http_method_from_exact() {
        assert_eq!(HttpMethod::from_exact("PATCH"), Some(HttpMethod::PATCH));
        assert_eq!(HttpMethod::from_exact("patch"), None);
    }

    #[test]
    fn test_effective_method_defaults_to_get() {
        let request = HttpRequest::new("", "https://example.com");
        assert_eq!(request.effective_method(), "GET");
        assert_eq!(request.http_method(), Some(HttpMethod::GET));

        let request = HttpRequest::new("PURGE", "https://example.com");
        assert_eq!(request.effective_method(), "PURGE");
        assert_eq!(request.http_method(), None);
    }

    #[test]
    fn test_headers_keep_insertion_order() {
        let mut request = HttpRequest::new("POST", "https://example.com");
        request.add_header("X-First", "1");
        request.add_header("Accept", "*/*");
        request.add_header("Content-Type", "application/json");

        let names: Vec<&str> = request.headers.keys().map(String::as_str).collect();
        assert_eq!(names, vec!["X-First", "Accept", "Content-Type"]);
    }

    #[test]
    fn test_http_request_content_type() {
        let mut request = HttpRequest::new("POST", "https://example.com");
        assert_eq!(request.content_type(), None);

        request.add_header("content-type", "text/plain");
        assert_eq!(request.content_type(), Some("text/plain"));
    }

    #[test]
    fn test_http_request_set_body() {
        let mut request = HttpRequest::new("POST", "https://example.com");
        assert!(!request.has_body());

        request.set_body(r#"{"key": "value"}"#);
        assert!(request.has_body());
    }

    #[test]
    fn test_serialization() {
        let mut request = HttpRequest::new("GET", "https://api.example.com/data");
        request.name = "get-data".to_string();

        let json = serde_json::to_string(&request).unwrap();
        assert!(json.contains("get-data"));

        let deserialized: HttpRequest = serde_json::from_str(&json).unwrap();
        assert_eq!(deserialized, request);
    }
}
