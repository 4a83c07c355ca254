//! Restricted JSONPath evaluation.
//!
//! Supports the subset needed by response chaining and body-path
//! expectations: the root (`$`), dotted field access (`$.user.name`), array
//! indexes (`$.items[0]`, chained as `$.grid[1][2]`) and quoted bracket
//! fields (`$['a.b']`). Filters, wildcards and slices are not supported.

use serde_json::Value as JsonValue;

/// One step of a path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathSegment {
    /// Object field access (e.g., "user", "name")
    Field(String),

    /// Array index access (e.g., [0], [5])
    ArrayIndex(usize),
}

/// Parses a path into segments.
///
/// A leading `$` and the dot after it are optional. Returns `None` for
/// malformed paths such as an unclosed bracket or a non-numeric unquoted
/// index.
///
/// - `user.name` -> `[Field("user"), Field("name")]`
/// - `$.items[0].id` -> `[Field("items"), ArrayIndex(0), Field("id")]`
pub fn parse_segments(path: &str) -> Option<Vec<PathSegment>> {
    let path = path.trim();
    let path = path.strip_prefix('$').unwrap_or(path);

    let mut segments = Vec::new();
    let mut current = String::new();
    let mut chars = path.chars().peekable();

    while let Some(ch) = chars.next() {
        match ch {
            '.' => {
                if !current.is_empty() {
                    segments.push(PathSegment::Field(std::mem::take(&mut current)));
                }
            }
            '[' => {
                if !current.is_empty() {
                    segments.push(PathSegment::Field(std::mem::take(&mut current)));
                }

                let mut inner = String::new();
                let mut closed = false;
                let mut quote: Option<char> = None;
                for next_ch in chars.by_ref() {
                    match quote {
                        Some(q) if next_ch == q => {
                            quote = None;
                            inner.push(next_ch);
                        }
                        None if next_ch == ']' => {
                            closed = true;
                            break;
                        }
                        None if next_ch == '\'' || next_ch == '"' => {
                            quote = Some(next_ch);
                            inner.push(next_ch);
                        }
                        _ => inner.push(next_ch),
                    }
                }
                if !closed {
                    return None;
                }

                segments.push(bracket_segment(inner.trim())?);
            }
            _ => current.push(ch),
        }
    }

    if !current.is_empty() {
        segments.push(PathSegment::Field(current));
    }

    Some(segments)
}

fn bracket_segment(inner: &str) -> Option<PathSegment> {
    for quote in ['\'', '"'] {
        if let Some(field) = inner
            .strip_prefix(quote)
            .and_then(|rest| rest.strip_suffix(quote))
        {
            return Some(PathSegment::Field(field.to_string()));
        }
    }

    inner.parse::<usize>().ok().map(PathSegment::ArrayIndex)
}

/// Evaluates a path against a JSON value.
///
/// Returns `None` when the path is malformed or leads nowhere.
pub fn evaluate<'a>(json: &'a JsonValue, path: &str) -> Option<&'a JsonValue> {
    parse_segments(path)?
        .iter()
        .try_fold(json, |current, segment| match segment {
            PathSegment::Field(name) => current.get(name.as_str()),
            PathSegment::ArrayIndex(index) => current.get(*index),
        })
}

/// Parses `body` as JSON and extracts the value at `path` as text.
///
/// Returns `None` when the body is not JSON or the path does not resolve.
pub fn extract_from_body(body: &str, path: &str) -> Option<String> {
    let json: JsonValue = serde_json::from_str(body).ok()?;
    evaluate(&json, path).map(json_value_to_string)
}

/// Renders a JSON value for substitution.
///
/// Strings are returned without quotes, other scalars as their JSON text,
/// and objects and arrays as compact JSON.
pub fn json_value_to_string(value: &JsonValue) -> String {
    match value {
        JsonValue::String(s) => s.clone(),
        JsonValue::Number(n) => n.to_string(),
        JsonValue::Bool(b) => b.to_string(),
        JsonValue::Null => "null".to_string(),
        JsonValue::Array(_) | JsonValue::Object(_) => value.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_segments() {
        let segments = parse_segments("user.name").unwrap();
        assert_eq!(
            segments,
            vec![
                PathSegment::Field("user".to_string()),
                PathSegment::Field("name".to_string())
            ]
        );

        let segments = parse_segments("$.items[0].id").unwrap();
        assert_eq!(
            segments,
            vec![
                PathSegment::Field("items".to_string()),
                PathSegment::ArrayIndex(0),
                PathSegment::Field("id".to_string())
            ]
        );

        let segments = parse_segments("$.grid[1][2]").unwrap();
        assert_eq!(segments[1], PathSegment::ArrayIndex(1));
        assert_eq!(segments[2], PathSegment::ArrayIndex(2));

        assert_eq!(parse_segments("$").unwrap(), vec![]);
    }

    #[test]
    fn test_parse_quoted_bracket_fields() {
        let segments = parse_segments("$['a.b'][\"c]d\"]").unwrap();
        assert_eq!(
            segments,
            vec![
                PathSegment::Field("a.b".to_string()),
                PathSegment::Field("c]d".to_string())
            ]
        );
    }

    #[test]
    fn test_parse_malformed() {
        assert_eq!(parse_segments("$.items[0"), None);
        assert_eq!(parse_segments("$.items[first]"), None);
        assert_eq!(parse_segments("$.items[-1]"), None);
    }

    #[test]
    fn test_evaluate_complex() {
        let json = json!({
            "data": {
                "users": [
                    {"id": 1, "name": "Alice", "email": "alice@example.com"},
                    {"id": 2, "name": "Bob", "tags": ["admin", "ops"]}
                ],
                "count": 2
            }
        });

        assert_eq!(evaluate(&json, "$.data.users[0].name"), Some(&json!("Alice")));
        assert_eq!(evaluate(&json, "$.data.users[1].tags[1]"), Some(&json!("ops")));
        assert_eq!(evaluate(&json, "$.data.count"), Some(&json!(2)));
        assert_eq!(evaluate(&json, "$"), Some(&json));
        assert_eq!(evaluate(&json, "$.data.users[5]"), None);
        assert_eq!(evaluate(&json, "$.data.missing"), None);
        assert_eq!(evaluate(&json, "$.data.count.deeper"), None);
    }

    #[test]
    fn test_extract_from_body() {
        assert_eq!(
            extract_from_body(r#"{"token":"abc123"}"#, "$.token"),
            Some("abc123".to_string())
        );
        assert_eq!(extract_from_body("not json", "$.token"), None);
        assert_eq!(
            extract_from_body(r#"{"a":{"b":[1,2]}}"#, "$.a"),
            Some(r#"{"b":[1,2]}"#.to_string())
        );
    }

    #[test]
    fn test_json_value_to_string() {
        assert_eq!(json_value_to_string(&json!("test")), "test");
        assert_eq!(json_value_to_string(&json!(42)), "42");
        assert_eq!(json_value_to_string(&json!(1.5)), "1.5");
        assert_eq!(json_value_to_string(&json!(true)), "true");
        assert_eq!(json_value_to_string(&JsonValue::Null), "null");
        assert_eq!(json_value_to_string(&json!(["a", "b"])), r#"["a","b"]"#);
    }
}
