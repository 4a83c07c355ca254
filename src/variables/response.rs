//! Response chaining.
//!
//! Resolves `{{name.response.<part>}}` placeholders against responses
//! captured from earlier requests. Supported parts:
//!
//! | Part | Value |
//! |------|-------|
//! | `body` | raw body text |
//! | `body.$`, `body.$.path` | JSON value at the path (see [`super::json_path`]) |
//! | `status` | status code |
//! | `statusText` | status reason phrase |
//! | `header.Name`, `headers.Name` | first header with that name, case-insensitive |
//! | `contentType` | content type |
//! | `responseTime` | elapsed milliseconds |
//!
//! Anything that cannot be resolved (unknown request, unknown part, missing
//! header, non-JSON body, missing path) is left in place verbatim.
//!
//! Escaped braces (`\{{`, `\}}`) are never matched and are kept as written.
//! Run this resolver before [`super::resolve_variables`], which turns the
//! escapes into literal braces:
//!
//! ```
//! use httpfile::models::ResponseSnapshot;
//! use httpfile::variables::{resolve_response_variables, ResponseContext, VariableContext};
//!
//! let mut responses = ResponseContext::new();
//! responses.insert("login", ResponseSnapshot::new(200, "OK"));
//! let variables = VariableContext::new();
//!
//! let text = r"{{login.response.status}} \{{login.response.status\}}";
//! let sent = variables.resolve(&resolve_response_variables(text, &responses));
//! assert_eq!(sent, "200 {{login.response.status}}");
//! ```

use super::json_path;
use super::substitution::{mask_escapes, restore_escapes};
use crate::models::ResponseSnapshot;
use log::trace;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::{BTreeSet, HashMap};

static RESPONSE_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\{\{\s*([A-Za-z0-9_-]+)\.response\.([^{}]+?)\s*\}\}")
        .expect("Failed to compile response reference regex")
});

/// Responses captured so far, by request name.
///
/// Owned and filled by whoever executes the requests. Resolution only reads
/// from it.
#[derive(Debug, Clone, Default)]
pub struct ResponseContext {
    responses: HashMap<String, ResponseSnapshot>,
}

impl ResponseContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores the response for a request, replacing any earlier one.
    pub fn insert(&mut self, request_name: impl Into<String>, response: ResponseSnapshot) {
        self.responses.insert(request_name.into(), response);
    }

    pub fn get(&self, request_name: &str) -> Option<&ResponseSnapshot> {
        self.responses.get(request_name)
    }

    pub fn contains(&self, request_name: &str) -> bool {
        self.responses.contains_key(request_name)
    }

    pub fn remove(&mut self, request_name: &str) -> Option<ResponseSnapshot> {
        self.responses.remove(request_name)
    }

    pub fn len(&self) -> usize {
        self.responses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.responses.is_empty()
    }

    pub fn clear(&mut self) {
        self.responses.clear();
    }
}

/// Resolves response references in `text`.
///
/// # Examples
///
/// ```
/// use httpfile::models::ResponseSnapshot;
/// use httpfile::variables::{resolve_response_variables, ResponseContext};
///
/// let mut login = ResponseSnapshot::new(200, "OK");
/// login.set_body(r#"{"token":"abc123"}"#);
///
/// let mut context = ResponseContext::new();
/// context.insert("login", login);
///
/// let header = resolve_response_variables("Bearer {{login.response.body.$.token}}", &context);
/// assert_eq!(header, "Bearer abc123");
/// ```
pub fn resolve_response_variables(text: &str, context: &ResponseContext) -> String {
    if !text.contains(".response.") {
        return text.to_string();
    }

    let masked = mask_escapes(text);
    let resolved = RESPONSE_REGEX.replace_all(&masked, |caps: &regex::Captures| {
        let request_name = &caps[1];
        let part = caps[2].trim();

        let value = context
            .get(request_name)
            .and_then(|response| extract_part(response, part));

        match value {
            Some(value) => value,
            None => {
                trace!(request = request_name, part = part; "Response reference left unresolved");
                caps[0].to_string()
            }
        }
    });

    restore_escapes(&resolved)
}

/// Whether `text` contains any response reference.
pub fn contains_response_variables(text: &str) -> bool {
    RESPONSE_REGEX.is_match(&mask_escapes(text))
}

/// Names of the requests whose responses `text` refers to.
///
/// # Examples
///
/// ```
/// use httpfile::variables::extract_referenced_requests;
///
/// let names = extract_referenced_requests(
///     "{{login.response.body.$.token}} {{profile.response.header.ETag}} {{login.response.status}}",
/// );
/// assert_eq!(names.into_iter().collect::<Vec<_>>(), vec!["login", "profile"]);
/// ```
pub fn extract_referenced_requests(text: &str) -> BTreeSet<String> {
    RESPONSE_REGEX
        .captures_iter(&mask_escapes(text))
        .map(|caps| caps[1].to_string())
        .collect()
}

fn extract_part(response: &ResponseSnapshot, part: &str) -> Option<String> {
    match part {
        "body" => return Some(response.body.clone()),
        "status" => return Some(response.status_code.to_string()),
        "statusText" => return Some(response.status_text.clone()),
        "contentType" => return response.content_type().map(str::to_string),
        "responseTime" => return Some(response.response_time_display()),
        _ => {}
    }

    if let Some(path) = part.strip_prefix("body.") {
        if !path.starts_with('$') {
            return None;
        }
        return json_path::extract_from_body(&response.body, path);
    }

    let header_name = part
        .strip_prefix("headers.")
        .or_else(|| part.strip_prefix("header."))?;
    response.header(header_name.trim()).map(str::to_string)
}
