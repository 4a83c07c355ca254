//! Line tokenizer for `.http` files.
//!
//! The tokenizer walks the input one line at a time and classifies each line
//! by its content *and* its position within the current request block:
//!
//! ```text
//! @baseUrl = https://api.example.com      FileVariable       (preamble)
//! ### create user                         RequestSeparator   (anywhere)
//! # @name createUser                      MetadataComment    (preamble)
//! POST {{baseUrl}}/users HTTP/1.1         RequestLine        (preamble)
//!     ?verbose=true                       QueryContinuation  (headers)
//! Content-Type: application/json          Header             (headers)
//!                                         (blank: headers -> body)
//! {"name": "<@ not a directive"}          BodyLine           (body)
//! <@latin1 ./extra.txt                    FileBodyWithEncoding (body)
//! ```
//!
//! Tokenizing never fails. Lines that match nothing become
//! [`Token::Unrecognized`].

use crate::models::HttpMethod;
use log::trace;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Matches `METHOD target [HTTP/x.y]`.
static REQUEST_LINE_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^([A-Za-z]+)\s+(\S+)(?:\s+(HTTP/\d+(?:\.\d+)?))?$")
        .expect("Failed to compile request line regex")
});

/// Matches a request line without a method: `target [HTTP/x.y]`.
static BARE_URL_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(https?://\S+|\{\{[^}]+\}\}\S*)(?:\s+(HTTP/\d+(?:\.\d+)?))?$")
        .expect("Failed to compile bare URL regex")
});

/// Matches `# @key value` and `// @key value`.
static METADATA_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:#|//)\s*@([A-Za-z][A-Za-z0-9_-]*)(?:\s+(.*))?$")
        .expect("Failed to compile metadata regex")
});

/// A lexical token produced from a single source line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Token {
    /// `# text` or `// text`
    Comment(String),
    /// `@name = value`
    FileVariable { name: String, value: String },
    /// `###`, optionally followed by a legacy inline request name.
    RequestSeparator(Option<String>),
    /// `# @key value`, e.g. `# @name login` or `# @expect status 200`.
    MetadataComment { key: String, value: String },
    /// `METHOD URL [HTTP/version]`. The method is empty for a bare URL.
    RequestLine {
        method: String,
        url: String,
        http_version: Option<String>,
    },
    /// `?page=2` or `&limit=10` directly after a request line.
    QueryContinuation(String),
    /// `Name: value`. The name may be empty or contain whitespace; the
    /// validator reports those.
    Header { name: String, value: String },
    /// A literal body line, verbatim.
    BodyLine(String),
    /// `< path`
    FileBody(String),
    /// `<@ path`
    FileBodyWithVariables(String),
    /// `<@encoding path`
    FileBodyWithEncoding { encoding: String, path: String },
    /// Anything else.
    Unrecognized(String),
}

/// A token with its 1-based source line number.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocatedToken {
    pub token: Token,
    pub line: usize,
}

/// Where the tokenizer is within the current request block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Region {
    /// Before the request line: variables, comments, metadata.
    Preamble,
    /// After the request line, before the first blank line.
    Headers,
    /// After the blank line that ends the headers.
    Body,
}

struct Tokenizer {
    tokens: Vec<LocatedToken>,
    region: Region,
    /// Previous line in the body region was blank (or the body just started).
    after_blank: bool,
    /// Open `{`/`[` nesting of the literal body so far.
    json_depth: usize,
}

impl Tokenizer {
    fn new() -> Self {
        Self {
            tokens: Vec::new(),
            region: Region::Preamble,
            after_blank: false,
            json_depth: 0,
        }
    }

    fn push(&mut self, token: Token, line: usize) {
        trace!(line = line; "token {:?}", token);
        self.tokens.push(LocatedToken { token, line });
    }

    fn last_token(&self) -> Option<&Token> {
        self.tokens.last().map(|t| &t.token)
    }

    fn start_request(&mut self) {
        self.region = Region::Headers;
        self.after_blank = false;
        self.json_depth = 0;
    }

    fn reset_block(&mut self) {
        self.region = Region::Preamble;
        self.after_blank = false;
        self.json_depth = 0;
    }

    /// Comment and metadata lines. Valid in every region outside an open
    /// JSON structure.
    fn try_comment(&mut self, trimmed: &str, line: usize) -> bool {
        if !trimmed.starts_with('#') && !trimmed.starts_with("//") {
            return false;
        }

        if let Some(captures) = METADATA_REGEX.captures(trimmed) {
            let key = captures[1].to_string();
            let value = captures
                .get(2)
                .map(|m| m.as_str().trim().to_string())
                .unwrap_or_default();
            self.push(Token::MetadataComment { key, value }, line);
        } else {
            let text = trimmed
                .strip_prefix("//")
                .or_else(|| trimmed.strip_prefix('#'))
                .unwrap_or(trimmed)
                .trim()
                .to_string();
            self.push(Token::Comment(text), line);
        }
        true
    }

    fn try_file_variable(&mut self, trimmed: &str, line: usize) -> bool {
        let Some(rest) = trimmed.strip_prefix('@') else {
            return false;
        };
        let Some(eq_pos) = rest.find('=') else {
            return false;
        };

        let name = rest[..eq_pos].trim().to_string();
        let value = rest[eq_pos + 1..].trim().to_string();
        self.push(Token::FileVariable { name, value }, line);
        true
    }

    fn try_request_line(&mut self, trimmed: &str, line: usize, strict: bool) -> bool {
        match parse_request_line(trimmed, strict) {
            Some(token) => {
                self.push(token, line);
                self.start_request();
                true
            }
            None => false,
        }
    }

    fn try_query_continuation(&mut self, trimmed: &str, line: usize) -> bool {
        if !trimmed.starts_with('?') && !trimmed.starts_with('&') {
            return false;
        }
        if !matches!(
            self.last_token(),
            Some(Token::RequestLine { .. } | Token::QueryContinuation(_))
        ) {
            return false;
        }
        self.push(Token::QueryContinuation(trimmed.to_string()), line);
        true
    }

    fn try_header(&mut self, trimmed: &str, line: usize) -> bool {
        let Some(colon) = trimmed.find(':') else {
            return false;
        };
        let name = trimmed[..colon].trim().to_string();
        let value = trimmed[colon + 1..].trim().to_string();
        self.push(Token::Header { name, value }, line);
        true
    }

    fn try_file_body(&mut self, trimmed: &str, line: usize) -> bool {
        match parse_file_body_directive(trimmed) {
            Some(token) => {
                self.push(token, line);
                true
            }
            None => false,
        }
    }

    fn classify_preamble(&mut self, trimmed: &str, line: usize) {
        if trimmed.is_empty() {
            return;
        }
        if self.try_comment(trimmed, line) {
            return;
        }
        if self.try_file_variable(trimmed, line) {
            return;
        }
        if self.try_request_line(trimmed, line, false) {
            return;
        }
        self.push(Token::Unrecognized(trimmed.to_string()), line);
    }

    fn classify_headers(&mut self, trimmed: &str, line: usize) {
        if trimmed.is_empty() {
            self.region = Region::Body;
            self.after_blank = true;
            return;
        }
        if self.try_comment(trimmed, line) {
            return;
        }
        if self.try_query_continuation(trimmed, line) {
            return;
        }
        if trimmed.starts_with('<') && self.try_file_body(trimmed, line) {
            self.region = Region::Body;
            return;
        }
        if self.try_request_line(trimmed, line, true) {
            return;
        }
        if self.try_header(trimmed, line) {
            return;
        }
        self.push(Token::Unrecognized(trimmed.to_string()), line);
    }

    fn classify_body(&mut self, raw_line: &str, trimmed: &str, line: usize) {
        // Inside an open JSON structure everything is literal content.
        if self.json_depth > 0 {
            self.push_body_line(raw_line, line);
            return;
        }

        if trimmed.is_empty() {
            self.push(Token::BodyLine(String::new()), line);
            self.after_blank = true;
            return;
        }

        if self.after_blank && self.try_request_line(trimmed, line, true) {
            return;
        }
        if self.try_comment(trimmed, line) {
            return;
        }
        if trimmed.starts_with('<') && self.try_file_body(trimmed, line) {
            self.after_blank = false;
            return;
        }

        self.push_body_line(raw_line, line);
    }

    fn push_body_line(&mut self, raw_line: &str, line: usize) {
        self.json_depth = json_depth_after(self.json_depth, raw_line);
        self.after_blank = false;
        self.push(Token::BodyLine(raw_line.to_string()), line);
    }

    fn classify_line(&mut self, raw_line: &str, line: usize) {
        let trimmed = raw_line.trim();

        // A separator always ends the current block, even inside a body.
        if let Some(rest) = trimmed.strip_prefix("###") {
            self.reset_block();
            self.push(Token::RequestSeparator(inline_request_name(rest)), line);
            return;
        }

        match self.region {
            Region::Preamble => self.classify_preamble(trimmed, line),
            Region::Headers => self.classify_headers(trimmed, line),
            Region::Body => self.classify_body(raw_line, trimmed, line),
        }
    }
}

/// Tokenizes `.http` content, normalizing line endings first.
///
/// # Examples
///
/// ```
/// use httpfile::parser::tokenizer::{tokenize, Token};
///
/// let tokens = tokenize("GET https://example.com\r\nAccept: */*\r\n");
/// assert!(matches!(tokens[0].token, Token::RequestLine { .. }));
/// assert_eq!(tokens[1].line, 2);
/// ```
pub fn tokenize(text: &str) -> Vec<LocatedToken> {
    tokenize_with_options(text, true)
}

/// Tokenizes `.http` content.
///
/// With `normalize_line_endings`, a leading byte-order mark is dropped and
/// `\r\n` / `\r` become `\n`. Without it, lines are split on `\n` only and
/// body lines keep any trailing `\r`.
pub fn tokenize_with_options(text: &str, normalize_line_endings: bool) -> Vec<LocatedToken> {
    let mut tokenizer = Tokenizer::new();

    if normalize_line_endings {
        let normalized = normalize(text);
        for (idx, raw_line) in normalized.split('\n').enumerate() {
            tokenizer.classify_line(raw_line, idx + 1);
        }
    } else {
        for (idx, raw_line) in text.split('\n').enumerate() {
            tokenizer.classify_line(raw_line, idx + 1);
        }
    }

    tokenizer.tokens
}

/// Strips a UTF-8 byte-order mark and collapses CR/LF variants to LF.
pub fn normalize(text: &str) -> String {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    text.replace("\r\n", "\n").replace('\r', "\n")
}

/// Interprets the text after `###`. A single word is a legacy inline name;
/// anything longer is a title and yields no name.
fn inline_request_name(rest: &str) -> Option<String> {
    let rest = rest.trim_start_matches('#').trim();
    if rest.is_empty() || rest.contains(char::is_whitespace) {
        None
    } else {
        Some(rest.to_string())
    }
}

/// Parses a request line.
///
/// In strict mode, used where a line could also be a header or body text,
/// the method must be a standard upper-case verb and the target must look
/// like a URL.
fn parse_request_line(trimmed: &str, strict: bool) -> Option<Token> {
    if let Some(captures) = REQUEST_LINE_REGEX.captures(trimmed) {
        let method = captures[1].to_string();
        let url = captures[2].to_string();
        let http_version = captures.get(3).map(|m| m.as_str().to_string());

        if strict && (HttpMethod::from_exact(&method).is_none() || !looks_like_url(&url)) {
            return None;
        }

        return Some(Token::RequestLine {
            method,
            url,
            http_version,
        });
    }

    if strict {
        return None;
    }

    BARE_URL_REGEX.captures(trimmed).map(|captures| Token::RequestLine {
        method: String::new(),
        url: captures[1].to_string(),
        http_version: captures.get(2).map(|m| m.as_str().to_string()),
    })
}

fn looks_like_url(target: &str) -> bool {
    target.starts_with("http://")
        || target.starts_with("https://")
        || target.starts_with("{{")
        || target.starts_with('/')
}

/// Parses a file body directive.
///
/// ```text
/// < path               raw
/// <@ path              variables, UTF-8
/// <@encoding path      variables, named encoding
/// ```
///
/// The raw form needs whitespace after `<`, so markup such as `<user>` is
/// not mistaken for a directive. Paths are taken verbatim and may contain
/// spaces.
pub fn parse_file_body_directive(trimmed: &str) -> Option<Token> {
    let rest = trimmed.strip_prefix('<')?;

    let Some(after_at) = rest.strip_prefix('@') else {
        if !rest.starts_with(char::is_whitespace) {
            return None;
        }
        let path = rest.trim();
        return (!path.is_empty()).then(|| Token::FileBody(path.to_string()));
    };

    if after_at.starts_with(char::is_whitespace) {
        let path = after_at.trim();
        return (!path.is_empty()).then(|| Token::FileBodyWithVariables(path.to_string()));
    }

    // `<@encoding path` or `<@path`
    if let Some((word, remainder)) = after_at.split_once(char::is_whitespace) {
        let path = remainder.trim();
        if is_encoding_token(word) && !path.is_empty() {
            return Some(Token::FileBodyWithEncoding {
                encoding: word.to_string(),
                path: path.to_string(),
            });
        }
    }

    let path = after_at.trim();
    (!path.is_empty()).then(|| Token::FileBodyWithVariables(path.to_string()))
}

fn is_encoding_token(word: &str) -> bool {
    !word.is_empty() && word.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
}

/// Tracks `{`/`[` nesting across a body line, ignoring brackets inside
/// JSON string literals.
fn json_depth_after(depth: usize, line: &str) -> usize {
    let mut depth = depth;
    let mut in_string = false;
    let mut escaped = false;

    for ch in line.chars() {
        if in_string {
            match ch {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match ch {
            '"' => in_string = true,
            '{' | '[' => depth += 1,
            '}' | ']' => depth = depth.saturating_sub(1),
            _ => {}
        }
    }

    depth
}
