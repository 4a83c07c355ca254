//! Placeholder reference analysis.
//!
//! Extraction of referenced names, detection of placeholders that stay
//! unresolved, and reference-cycle detection over file variables.

use super::substitution::{mask_escapes, Resolver, VariableSource, PLACEHOLDER_REGEX};
use indexmap::IndexSet;
use std::collections::{BTreeSet, HashMap, HashSet};

/// Returns every distinct placeholder name in `text`, from both the
/// `{{name}}` and `${NAME}` forms, trimmed.
///
/// # Examples
///
/// ```
/// use httpfile::variables::extract_references;
///
/// let names = extract_references("{{ base }}/users/{{id}}?t=${TOKEN}&again={{id}}");
/// let names: Vec<&str> = names.iter().map(String::as_str).collect();
/// assert_eq!(names, vec!["TOKEN", "base", "id"]);
/// ```
pub fn extract_references(text: &str) -> BTreeSet<String> {
    let masked = mask_escapes(text);
    PLACEHOLDER_REGEX
        .captures_iter(&masked)
        .filter_map(|caps| caps.get(1).or_else(|| caps.get(2)))
        .map(|m| m.as_str().trim().to_string())
        .collect()
}

/// Names referenced through `{{name}}` that are neither system variables
/// nor response references.
fn variable_references(value: &str) -> impl Iterator<Item = String> {
    let masked = mask_escapes(value);
    PLACEHOLDER_REGEX
        .captures_iter(&masked)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str().trim().to_string())
        .filter(|name| !name.starts_with('$'))
        .collect::<Vec<_>>()
        .into_iter()
}

/// Returns the placeholders in `text` that stay unresolved against the
/// given file variables, as literal substrings such as `"{{unknown}}"`.
///
/// Placeholders coming from nested file variable values are reported too.
/// Each distinct placeholder is listed once, in order of appearance.
pub fn validate_references<F>(text: &str, file_vars: &F) -> Vec<String>
where
    F: VariableSource + ?Sized,
{
    let no_env: HashMap<String, String> = HashMap::new();
    let mut resolver = Resolver::new(file_vars, &no_env);
    resolver.resolve_top(text);

    resolver
        .unresolved
        .into_iter()
        .collect::<IndexSet<String>>()
        .into_iter()
        .collect()
}

/// Finds every file variable that can reach itself through its `{{...}}`
/// references.
///
/// All members of every cycle are reported. Variables that merely reference
/// a cycle are not.
///
/// # Examples
///
/// ```
/// use httpfile::variables::detect_circular_references;
/// use indexmap::IndexMap;
///
/// let mut vars = IndexMap::new();
/// vars.insert("a".to_string(), "{{b}}".to_string());
/// vars.insert("b".to_string(), "{{c}}".to_string());
/// vars.insert("c".to_string(), "{{a}}".to_string());
/// vars.insert("d".to_string(), "{{a}}".to_string());
///
/// let cyclic = detect_circular_references(&vars);
/// assert_eq!(cyclic.len(), 3);
/// assert!(!cyclic.contains("d"));
/// ```
pub fn detect_circular_references<'a, I>(variables: I) -> BTreeSet<String>
where
    I: IntoIterator<Item = (&'a String, &'a String)>,
{
    let graph: HashMap<&str, Vec<String>> = variables
        .into_iter()
        .map(|(name, value)| (name.as_str(), variable_references(value).collect()))
        .collect();

    graph
        .keys()
        .filter(|start| reaches_itself(&graph, start))
        .map(|name| name.to_string())
        .collect()
}

/// Iterative depth-first walk from `start`'s references back to `start`.
fn reaches_itself(graph: &HashMap<&str, Vec<String>>, start: &str) -> bool {
    let mut visited: HashSet<&str> = HashSet::new();
    let mut stack: Vec<&str> = graph
        .get(start)
        .map(|refs| refs.iter().map(String::as_str).collect())
        .unwrap_or_default();

    while let Some(name) = stack.pop() {
        if name == start {
            return true;
        }
        if !visited.insert(name) {
            continue;
        }
        if let Some(refs) = graph.get(name) {
            stack.extend(refs.iter().map(String::as_str));
        }
    }

    false
}
