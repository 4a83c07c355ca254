//! Captured response snapshots.
//!
//! A [`ResponseSnapshot`] is what an execution harness records after running a
//! named request, so later requests can reference it through
//! `{{name.response.*}}` placeholders.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Represents a response captured for response chaining.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseSnapshot {
    /// HTTP status code (e.g., 200, 404, 500).
    pub status_code: u16,

    /// HTTP status text (e.g., "OK", "Not Found").
    pub status_text: String,

    /// Response headers in the order they were received.
    ///
    /// A list rather than a map: servers may repeat a header, and lookups
    /// return the first match.
    pub headers: Vec<(String, String)>,

    /// Explicit content type. When `None`, the `Content-Type` header is used.
    pub content_type: Option<String>,

    /// Elapsed time in milliseconds, with whatever precision the harness measured.
    pub response_time_ms: f64,

    /// Raw body text.
    pub body: String,
}

impl ResponseSnapshot {
    /// Creates a new snapshot with the given status code and text.
    pub fn new(status_code: u16, status_text: impl Into<String>) -> Self {
        Self {
            status_code,
            status_text: status_text.into(),
            headers: Vec::new(),
            content_type: None,
            response_time_ms: 0.0,
            body: String::new(),
        }
    }

    /// Checks if the response status indicates success (2xx).
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status_code)
    }

    /// Adds a header to the response.
    pub fn add_header(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.headers.push((name.into(), value.into()));
    }

    /// Sets the response body.
    pub fn set_body(&mut self, body: impl Into<String>) {
        self.body = body.into();
    }

    /// Sets the elapsed time from a measured duration.
    pub fn set_elapsed(&mut self, elapsed: Duration) {
        self.response_time_ms = elapsed.as_nanos() as f64 / 1_000_000.0;
    }

    /// First header value matching `name`, compared case-insensitively.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Gets the content type: the explicit value, else the Content-Type header.
    pub fn content_type(&self) -> Option<&str> {
        self.content_type
            .as_deref()
            .or_else(|| self.header("content-type"))
    }

    /// Formats the elapsed time, printing whole milliseconds without a
    /// fractional part and keeping the stored precision otherwise.
    pub fn response_time_display(&self) -> String {
        let ms = self.response_time_ms;
        if ms.fract() == 0.0 && ms.abs() < i64::MAX as f64 {
            format!("{}", ms as i64)
        } else {
            format!("{}", ms)
        }
    }
}
