//! Assembly of a token stream into an [`HttpDocument`].
//!
//! A single forward pass keeps a "current request" accumulator. Request
//! lines open a new accumulator and close the previous one, metadata
//! comments collect onto the upcoming request, and body lines and file body
//! directives fill the open one. Names are settled in a second pass over
//! the finished requests, and duplicates are detected with a name-to-line
//! map in source order.

use super::error::ParseError;
use super::metadata::{parse_directive, MetadataDirective};
use super::tokenizer::{LocatedToken, Token};
use crate::config::ParserOptions;
use crate::models::{Expectation, FileBodyReference, HttpDocument, HttpRequest, TextEncoding};
use crate::validation::{is_valid_name_char, Validator};
use indexmap::IndexMap;
use log::{debug, trace};
use std::collections::HashMap;

/// Metadata seen before the request it belongs to.
#[derive(Debug, Default)]
struct PendingMetadata {
    name: Option<String>,
    expectations: Vec<Expectation>,
    directives: IndexMap<String, String>,
}

struct RequestBuilder {
    request: HttpRequest,
    body_lines: Vec<String>,
    name_candidate: Option<String>,
}

impl RequestBuilder {
    fn finish(self) -> (HttpRequest, Option<String>) {
        let mut request = self.request;
        request.body = join_body(&self.body_lines);
        (request, self.name_candidate)
    }
}

struct Assembler<'a> {
    options: &'a ParserOptions,
    finished: Vec<(HttpRequest, Option<String>)>,
    variables: IndexMap<String, String>,
    variable_lines: IndexMap<String, usize>,
    current: Option<RequestBuilder>,
    pending: PendingMetadata,
    inline_name: Option<String>,
}

impl<'a> Assembler<'a> {
    fn new(options: &'a ParserOptions) -> Self {
        Self {
            options,
            finished: Vec::new(),
            variables: IndexMap::new(),
            variable_lines: IndexMap::new(),
            current: None,
            pending: PendingMetadata::default(),
            inline_name: None,
        }
    }

    fn close_current(&mut self) {
        if let Some(builder) = self.current.take() {
            self.finished.push(builder.finish());
        }
    }

    fn open_request(
        &mut self,
        method: &str,
        url: &str,
        http_version: &Option<String>,
        line: usize,
    ) {
        self.close_current();

        let pending = std::mem::take(&mut self.pending);
        let mut request = HttpRequest::new(method, url);
        request.http_version = http_version.clone();
        request.source_line = line;
        request.metadata.expectations = pending.expectations;
        request.metadata.directives = pending.directives;

        let name_candidate = pending.name.or_else(|| self.inline_name.take());
        self.inline_name = None;

        self.current = Some(RequestBuilder {
            request,
            body_lines: Vec::new(),
            name_candidate,
        });
    }

    fn current_request(&mut self, line: usize, what: &str) -> Option<&mut RequestBuilder> {
        if self.current.is_none() {
            debug!(line = line; "Ignoring {} outside of a request", what);
        }
        self.current.as_mut()
    }

    fn apply_metadata(&mut self, key: &str, value: &str, line: usize) {
        match parse_directive(key, value) {
            MetadataDirective::Name(name) => self.pending.name = Some(name),
            MetadataDirective::Expect(expectation) => {
                if self.options.parse_expectations {
                    self.pending.expectations.push(expectation);
                } else {
                    trace!(line = line; "Expectation parsing disabled, skipping directive");
                }
            }
            MetadataDirective::Unknown { key, value } => {
                if self.options.ignore_unknown_metadata {
                    debug!(line = line, key = key.as_str(); "Ignoring unknown metadata directive");
                } else {
                    self.pending.directives.insert(key, value);
                }
            }
        }
    }

    fn set_file_body(&mut self, reference: FileBodyReference, line: usize) {
        if let Some(builder) = self.current_request(line, "file body directive") {
            builder.request.file_body = Some(reference);
        }
    }

    fn consume(&mut self, located: &LocatedToken) {
        let line = located.line;

        match &located.token {
            Token::Comment(_) => {}
            Token::FileVariable { name, value } => {
                self.variables.insert(name.clone(), value.clone());
                self.variable_lines.insert(name.clone(), line);
            }
            Token::RequestSeparator(name) => {
                self.close_current();
                self.inline_name = name.clone();
            }
            Token::MetadataComment { key, value } => self.apply_metadata(key, value, line),
            Token::RequestLine {
                method,
                url,
                http_version,
            } => self.open_request(method, url, http_version, line),
            Token::QueryContinuation(fragment) => {
                if let Some(builder) = self.current_request(line, "query continuation") {
                    builder.request.url.push_str(fragment);
                }
            }
            Token::Header { name, value } => {
                if let Some(builder) = self.current_request(line, "header") {
                    builder.request.add_header(name.clone(), value.clone());
                    builder.request.header_lines.insert(name.clone(), line);
                }
            }
            Token::BodyLine(text) => {
                if let Some(builder) = self.current_request(line, "body line") {
                    builder.body_lines.push(text.clone());
                }
            }
            Token::FileBody(path) => self.set_file_body(FileBodyReference::raw(path.clone()), line),
            Token::FileBodyWithVariables(path) => {
                let mut reference = FileBodyReference::with_variables(path.clone(), TextEncoding::Utf8);
                reference.process_variables = self.options.process_variables;
                self.set_file_body(reference, line);
            }
            Token::FileBodyWithEncoding { encoding, path } => {
                let resolved = TextEncoding::from_label(encoding).unwrap_or_else(|| {
                    debug!(line = line, encoding = encoding.as_str(); "Unknown encoding, using UTF-8");
                    TextEncoding::Utf8
                });
                let mut reference = FileBodyReference::with_variables(path.clone(), resolved);
                reference.process_variables = self.options.process_variables;
                self.set_file_body(reference, line);
            }
            Token::Unrecognized(text) => {
                debug!(line = line, text = text.as_str(); "Skipping unrecognized line");
            }
        }
    }

    fn finish(mut self) -> Result<HttpDocument, ParseError> {
        self.close_current();

        let requests = assign_names(self.finished, self.options);

        if self.options.validate_request_names {
            check_duplicate_names(&requests)?;
        }

        let document = HttpDocument::from_parsed(requests, self.variables, self.variable_lines);

        if self.options.strict_mode {
            let result = Validator::new(self.options.validator_options()).validate(&document);
            if !result.is_valid() {
                return Err(ParseError::Validation {
                    errors: result.errors,
                });
            }
        }

        Ok(document)
    }
}

/// Assembles tokens into a document.
pub fn assemble(tokens: &[LocatedToken], options: &ParserOptions) -> Result<HttpDocument, ParseError> {
    let mut assembler = Assembler::new(options);
    for token in tokens {
        assembler.consume(token);
    }
    assembler.finish()
}

/// Settles the final name of every request.
///
/// Requests without a name get `request-N`, N counting only unnamed
/// requests, when names are required. Outside strict mode, names with
/// characters outside `[A-Za-z0-9_-]` are slugified.
fn assign_names(
    finished: Vec<(HttpRequest, Option<String>)>,
    options: &ParserOptions,
) -> Vec<HttpRequest> {
    let mut unnamed = 0;

    finished
        .into_iter()
        .map(|(mut request, candidate)| {
            let written = candidate.unwrap_or_default();
            let written = written.trim();

            let mut name = if written.chars().all(is_valid_name_char) || options.strict_mode {
                written.to_string()
            } else {
                let slug = slugify(written);
                debug!(line = request.source_line, slug = slug.as_str(); "Slugified request name");
                slug
            };

            if name.is_empty() && options.require_request_names {
                unnamed += 1;
                name = format!("request-{}", unnamed);
            }

            request.metadata.name = name.clone();
            request.name = name;
            request
        })
        .collect()
}

fn check_duplicate_names(requests: &[HttpRequest]) -> Result<(), ParseError> {
    let mut seen: HashMap<&str, usize> = HashMap::new();

    for request in requests.iter().filter(|r| !r.name.is_empty()) {
        if let Some(&first_line) = seen.get(request.name.as_str()) {
            return Err(ParseError::DuplicateRequestName {
                name: request.name.clone(),
                line: request.source_line,
                first_line,
            });
        }
        seen.insert(&request.name, request.source_line);
    }

    Ok(())
}

/// Turns a free-form name into `[A-Za-z0-9_-]`: whitespace runs become a
/// hyphen, other characters are dropped.
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut pending_hyphen = false;

    for ch in name.trim().chars() {
        if ch.is_whitespace() {
            pending_hyphen = true;
        } else if is_valid_name_char(ch) {
            if pending_hyphen && !slug.is_empty() {
                slug.push('-');
            }
            pending_hyphen = false;
            slug.push(ch);
        }
    }

    slug
}

/// Joins body lines, dropping blank lines at both ends. A body made only of
/// blank lines is no body.
fn join_body(lines: &[String]) -> Option<String> {
    let is_blank = |l: &String| l.trim().is_empty();
    let start = lines.iter().position(|l| !is_blank(l))?;
    let end = lines.iter().rposition(|l| !is_blank(l))?;
    Some(lines[start..=end].join("\n"))
}
