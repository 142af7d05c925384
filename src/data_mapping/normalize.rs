//! Scalar normalization for stringly-typed payload cells

use regex::Regex;
use serde_json::Value;
use std::sync::OnceLock;

/// Placeholder the wiki uses for "no value at this level"
pub const PLACEHOLDER: &str = "-";

/// Separators accepted between several tokens packed in one cell
const TOKEN_SEPARATORS: &[char] = &['/', '、', ',', '，', '|'];

/// A normalized scalar cell
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    Number(f64),
    /// Magnitude of a `NN%` value
    Percent(f64),
    /// The `-` placeholder, which reads as zero
    Placeholder,
    Unrecognized(String),
}

impl Scalar {
    /// Numeric value, with the placeholder reading as `0`
    pub fn value(&self) -> Option<f64> {
        match self {
            Scalar::Number(v) | Scalar::Percent(v) => Some(*v),
            Scalar::Placeholder => Some(0.0),
            Scalar::Unrecognized(_) => None,
        }
    }
}

fn markup_regex() -> &'static Regex {
    static MARKUP: OnceLock<Regex> = OnceLock::new();
    MARKUP.get_or_init(|| Regex::new(r"<[^>]*>").expect("markup pattern is valid"))
}

/// Drop inline tags and the common non-breaking space entity. This is a flat
/// strip; nested documents are never interpreted.
pub fn strip_markup(raw: &str) -> String {
    markup_regex()
        .replace_all(raw, "")
        .replace("&nbsp;", " ")
        .replace('\u{a0}', " ")
}

/// Normalize one raw cell
pub fn normalize_scalar(raw: &str) -> Scalar {
    let cleaned = strip_markup(raw);
    let trimmed = cleaned.trim();

    if trimmed == PLACEHOLDER {
        return Scalar::Placeholder;
    }

    let compact: String = trimmed.chars().filter(|c| *c != ',').collect();
    let (digits, is_percent) = match compact.strip_suffix('%') {
        Some(rest) => (rest.trim_end(), true),
        None => (compact.as_str(), false),
    };

    match digits.parse::<f64>() {
        Ok(v) if v.is_finite() && is_percent => Scalar::Percent(v),
        Ok(v) if v.is_finite() => Scalar::Number(v),
        _ => Scalar::Unrecognized(trimmed.to_string()),
    }
}

/// Normalize a JSON cell, which may already be a number
pub fn normalize_json_scalar(value: &Value) -> Scalar {
    match value {
        Value::Number(n) => match n.as_f64() {
            Some(v) if v.is_finite() => Scalar::Number(v),
            _ => Scalar::Unrecognized(n.to_string()),
        },
        Value::String(s) => normalize_scalar(s),
        Value::Array(items) => items
            .first()
            .map(normalize_json_scalar)
            .unwrap_or_else(|| Scalar::Unrecognized(String::new())),
        other => Scalar::Unrecognized(other.to_string()),
    }
}

/// Raw strings held by a cell: a string, or an array of strings/numbers
pub fn raw_strings(value: &Value) -> Vec<String> {
    match value {
        Value::String(s) => vec![s.clone()],
        Value::Number(n) => vec![n.to_string()],
        Value::Array(items) => items.iter().flat_map(raw_strings).collect(),
        _ => Vec::new(),
    }
}

/// Clean text values of a cell: markup stripped, trimmed, blanks dropped
pub fn text_values(value: &Value) -> Vec<String> {
    raw_strings(value)
        .iter()
        .map(|s| strip_markup(s).trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

/// Split packed cells such as `冰/霜烈` into individual tokens
pub fn split_tokens<S: AsRef<str>>(values: &[S]) -> Vec<String> {
    values
        .iter()
        .flat_map(|v| v.as_ref().split(TOKEN_SEPARATORS))
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .collect()
}

/// Key comparison used for every synonym lookup
pub fn key_matches(candidate: &str, synonyms: &[&str]) -> bool {
    let candidate = strip_markup(candidate);
    let candidate = candidate.trim();
    synonyms
        .iter()
        .any(|synonym| synonym.eq_ignore_ascii_case(candidate))
}
