//! Variable substitution engine.
//!
//! Replaces `{{name}}` and `${NAME}` placeholders with their values:
//!
//! - `{{$name args}}` runs a system generator ([`super::system`]).
//! - `{{name}}` looks up file variables, then environment variables. File
//!   variable values are resolved recursively before they are substituted.
//! - `${NAME}` looks up environment variables only.
//!
//! Resolution never fails. A placeholder that cannot be resolved (unknown
//! name, failing generator, reference cycle, response reference) is left in
//! the output verbatim. `\{{` and `\}}` produce literal braces.

use super::system::resolve_system_expression;
use crate::models::HttpDocument;
use indexmap::IndexMap;
use log::{debug, trace};
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::hash::BuildHasher;

/// Matches `{{name}}` (group 1) and `${NAME}` (group 2).
pub(crate) static PLACEHOLDER_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\{\{\s*([^{}]+?)\s*\}\}|\$\{\s*([A-Za-z_][A-Za-z0-9_.-]*)\s*\}")
        .expect("Failed to compile placeholder regex")
});

const ESCAPED_OPEN: &str = "\u{E000}";
const ESCAPED_CLOSE: &str = "\u{E001}";

/// Hides escaped braces from placeholder matching.
pub(crate) fn mask_escapes(text: &str) -> String {
    text.replace("\\{{", ESCAPED_OPEN)
        .replace("\\}}", ESCAPED_CLOSE)
}

pub(crate) fn unmask_escapes(text: &str) -> String {
    text.replace(ESCAPED_OPEN, "{{").replace(ESCAPED_CLOSE, "}}")
}

/// Puts escaped braces back as written, for stages that run before this one.
pub(crate) fn restore_escapes(text: &str) -> String {
    text.replace(ESCAPED_OPEN, "\\{{")
        .replace(ESCAPED_CLOSE, "\\}}")
}

/// A table of named values.
pub trait VariableSource {
    fn lookup(&self, name: &str) -> Option<&str>;
}

impl<S: BuildHasher> VariableSource for HashMap<String, String, S> {
    fn lookup(&self, name: &str) -> Option<&str> {
        self.get(name).map(String::as_str)
    }
}

impl<S: BuildHasher> VariableSource for IndexMap<String, String, S> {
    fn lookup(&self, name: &str) -> Option<&str> {
        self.get(name).map(String::as_str)
    }
}

impl VariableSource for BTreeMap<String, String> {
    fn lookup(&self, name: &str) -> Option<&str> {
        self.get(name).map(String::as_str)
    }
}

impl<T: VariableSource + ?Sized> VariableSource for &T {
    fn lookup(&self, name: &str) -> Option<&str> {
        (**self).lookup(name)
    }
}

/// Variable tables for resolution.
///
/// # Examples
///
/// ```
/// use httpfile::variables::VariableContext;
///
/// let mut context = VariableContext::new();
/// context.file_variables.insert("host".to_string(), "https://api.example.com".to_string());
/// context.file_variables.insert("users".to_string(), "{{host}}/users".to_string());
/// context.environment_variables.insert("TOKEN".to_string(), "secret".to_string());
///
/// let resolved = context.resolve("GET {{users}}?t=${TOKEN}");
/// assert_eq!(resolved, "GET https://api.example.com/users?t=secret");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VariableContext {
    /// Variables declared in the `.http` file
    pub file_variables: IndexMap<String, String>,

    /// Variables supplied by the caller's environment
    pub environment_variables: IndexMap<String, String>,
}

impl VariableContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// A context holding the document's file variables.
    pub fn from_document(document: &HttpDocument) -> Self {
        Self {
            file_variables: document.variables().clone(),
            environment_variables: IndexMap::new(),
        }
    }

    /// Adds environment variables, replacing existing ones with the same name.
    pub fn with_environment<I, K, V>(mut self, variables: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.environment_variables
            .extend(variables.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    /// Resolves every placeholder this context can resolve.
    pub fn resolve(&self, text: &str) -> String {
        resolve_variables(text, &self.file_variables, &self.environment_variables)
    }
}

/// Substitutes placeholders using a [`VariableContext`].
pub fn substitute_variables(text: &str, context: &VariableContext) -> String {
    context.resolve(text)
}

/// Resolves placeholders in `text` against file and environment variables.
///
/// Unresolvable placeholders are kept verbatim.
///
/// # Examples
///
/// ```
/// use httpfile::variables::resolve_variables;
/// use std::collections::HashMap;
///
/// let mut file_vars = HashMap::new();
/// file_vars.insert("base".to_string(), "http://x".to_string());
/// let env_vars: HashMap<String, String> = HashMap::new();
///
/// assert_eq!(resolve_variables("{{base}}/y", &file_vars, &env_vars), "http://x/y");
/// assert_eq!(resolve_variables("{{other}}/y", &file_vars, &env_vars), "{{other}}/y");
/// ```
pub fn resolve_variables<F, E>(text: &str, file_vars: &F, env_vars: &E) -> String
where
    F: VariableSource + ?Sized,
    E: VariableSource + ?Sized,
{
    Resolver::new(file_vars, env_vars).resolve_top(text)
}

/// Walks placeholders, recording the ones it cannot resolve.
pub(crate) struct Resolver<'a, F: ?Sized, E: ?Sized> {
    file_vars: &'a F,
    env_vars: &'a E,
    visiting: HashSet<String>,
    pub(crate) unresolved: Vec<String>,
}

impl<'a, F, E> Resolver<'a, F, E>
where
    F: VariableSource + ?Sized,
    E: VariableSource + ?Sized,
{
    pub(crate) fn new(file_vars: &'a F, env_vars: &'a E) -> Self {
        Self {
            file_vars,
            env_vars,
            visiting: HashSet::new(),
            unresolved: Vec::new(),
        }
    }

    pub(crate) fn resolve_top(&mut self, text: &str) -> String {
        if !text.contains("{{") && !text.contains("${") && !text.contains("\\}}") {
            return text.to_string();
        }
        self.resolve_text(text)
    }

    fn resolve_text(&mut self, text: &str) -> String {
        let masked = mask_escapes(text);

        let mut result = String::with_capacity(masked.len());
        let mut last_match_end = 0;

        for caps in PLACEHOLDER_REGEX.captures_iter(&masked) {
            let Some(full_match) = caps.get(0) else {
                continue;
            };
            result.push_str(&masked[last_match_end..full_match.start()]);

            match self.resolve_placeholder(&caps) {
                Some(value) => result.push_str(&value),
                None => {
                    self.unresolved.push(full_match.as_str().to_string());
                    result.push_str(full_match.as_str());
                }
            }

            last_match_end = full_match.end();
        }

        result.push_str(&masked[last_match_end..]);
        unmask_escapes(&result)
    }

    fn resolve_placeholder(&mut self, caps: &Captures) -> Option<String> {
        if let Some(name) = caps.get(2) {
            return self.env_vars.lookup(name.as_str()).map(str::to_string);
        }

        let name = caps.get(1)?.as_str().trim();

        if name.starts_with('$') {
            return match resolve_system_expression(name) {
                Ok(value) => Some(value),
                Err(e) => {
                    debug!(variable = name, error = e.to_string().as_str(); "System variable left unresolved");
                    None
                }
            };
        }

        let file_vars = self.file_vars;
        if let Some(value) = file_vars.lookup(name) {
            if self.visiting.contains(name) {
                trace!(variable = name; "Circular reference, leaving placeholder");
                return None;
            }

            self.visiting.insert(name.to_string());
            let resolved = self.resolve_text(value);
            self.visiting.remove(name);
            return Some(resolved);
        }

        self.env_vars.lookup(name).map(str::to_string)
    }
}
