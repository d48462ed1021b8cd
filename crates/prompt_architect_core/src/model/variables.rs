//! Prompt template variable extraction.
//!
//! A variable is any `{{name}}` marker inside a prompt body. Matching is
//! non-greedy: the name runs up to the first closing `}}` on the same line.

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;

static VARIABLE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{\{(.*?)\}\}").expect("valid variable regex"));

/// Returns unique variable names referenced by `body`, in first-seen order.
///
/// Bodies without markers yield an empty list. The result is a pure function
/// of `body`, so applying it to an already consistent body is idempotent.
pub fn extract_variables(body: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    VARIABLE_RE
        .captures_iter(body)
        .filter_map(|caps| caps.get(1).map(|m| m.as_str().to_string()))
        .filter(|name| seen.insert(name.clone()))
        .collect()
}

/// Returns whether `body` references `name` as a variable.
pub fn references_variable(body: &str, name: &str) -> bool {
    VARIABLE_RE
        .captures_iter(body)
        .any(|caps| caps.get(1).is_some_and(|m| m.as_str() == name))
}
