//! Relation cells: plain name lists or `$[...]$` embedded JSON fragments

use regex::Regex;
use serde_json::Value;
use std::sync::OnceLock;
use tracing::{debug, warn};

use super::dictionary::Dictionary;
use super::normalize::{split_tokens, strip_markup};

fn fragment_regex() -> &'static Regex {
    static FRAGMENT: OnceLock<Regex> = OnceLock::new();
    FRAGMENT.get_or_init(|| Regex::new(r"(?s)\$(\[.*?\])\$").expect("fragment pattern is valid"))
}

/// Whether a raw cell carries embedded JSON fragments
pub fn has_fragments(raw: &str) -> bool {
    fragment_regex().is_match(raw)
}

/// Inner JSON text of every `$[...]$` fragment in a cell
pub fn fragments(raw: &str) -> Vec<&str> {
    fragment_regex()
        .captures_iter(raw)
        .filter_map(|caps| caps.get(1).map(|m| m.as_str()))
        .collect()
}

/// Names referenced by a set of raw relation cells.
///
/// Fragment elements may be objects carrying `name` or bare strings. Cells
/// without fragments are treated as separator-delimited name lists.
pub fn relation_names<S: AsRef<str>>(cells: &[S]) -> Vec<String> {
    let mut names = Vec::new();

    for cell in cells {
        let cell = cell.as_ref();
        if !has_fragments(cell) {
            names.extend(split_tokens(&[strip_markup(cell)]));
            continue;
        }

        for fragment in fragments(cell) {
            let items: Vec<Value> = match serde_json::from_str(fragment) {
                Ok(items) => items,
                Err(e) => {
                    warn!("Skipping unparseable relation fragment: {}", e);
                    continue;
                }
            };

            for item in items {
                let name = match &item {
                    Value::Object(map) => map.get("name").and_then(Value::as_str),
                    Value::String(s) => Some(s.as_str()),
                    _ => None,
                };
                match name.map(|n| strip_markup(n).trim().to_string()) {
                    Some(n) if !n.is_empty() => names.push(n),
                    _ => debug!("Relation element without a name: {}", item),
                }
            }
        }
    }

    names
}

/// Resolve names to ids, de-duplicated in first-seen order.
/// Unresolved names are dropped and logged.
pub fn resolve_relations(names: &[String], dictionary: &Dictionary<u32>, entry_id: &str) -> Vec<u32> {
    let (ids, unresolved) = dictionary.resolve_all(names);
    for name in unresolved {
        warn!("Entry '{}': dropping unresolved faction '{}'", entry_id, name);
    }
    ids
}
