//! Test assertions attached to requests with `# @expect`.

use serde::{Deserialize, Serialize};

/// The kind of an `@expect` directive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ExpectationKind {
    /// `@expect status 200`
    StatusCode,
    /// `@expect header Content-Type: application/json`
    Header,
    /// `@expect body-contains "ok"`
    BodyContains,
    /// `@expect body-path $.user.id`
    BodyPath,
    /// `@expect schema ./user.schema.json`
    Schema,
    /// `@expect max-time 500ms`
    MaxTime,
}

impl ExpectationKind {
    /// Maps an `@expect` keyword to its kind. Matching ignores case and the
    /// `-`/`_` separators, so `body-path`, `bodyPath` and `body_path` agree.
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        let normalized: String = keyword
            .chars()
            .filter(|c| *c != '-' && *c != '_')
            .collect::<String>()
            .to_ascii_lowercase();

        match normalized.as_str() {
            "status" | "statuscode" => Some(ExpectationKind::StatusCode),
            "header" => Some(ExpectationKind::Header),
            "bodycontains" | "contains" => Some(ExpectationKind::BodyContains),
            "bodypath" | "jsonpath" => Some(ExpectationKind::BodyPath),
            "schema" => Some(ExpectationKind::Schema),
            "maxtime" | "duration" => Some(ExpectationKind::MaxTime),
            _ => None,
        }
    }

    /// Canonical keyword used when displaying the expectation.
    pub fn keyword(&self) -> &'static str {
        match self {
            ExpectationKind::StatusCode => "status",
            ExpectationKind::Header => "header",
            ExpectationKind::BodyContains => "body-contains",
            ExpectationKind::BodyPath => "body-path",
            ExpectationKind::Schema => "schema",
            ExpectationKind::MaxTime => "max-time",
        }
    }
}

impl std::fmt::Display for ExpectationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.keyword())
    }
}

/// One `@expect` directive. The value is the raw payload after the keyword;
/// its meaning depends on `kind` and it is checked by the validator, not the parser.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Expectation {
    pub kind: ExpectationKind,
    pub value: String,
}

impl Expectation {
    pub fn new(kind: ExpectationKind, value: impl Into<String>) -> Self {
        Self {
            kind,
            value: value.into(),
        }
    }
}
