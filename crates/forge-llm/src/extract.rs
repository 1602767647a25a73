//! Tolerant JSON extraction from model replies
//!
//! Models wrap JSON in markdown fences or surround it with prose. Each
//! extractor tries a strict parse of the unfenced reply first. Only a reply
//! that is not JSON at all falls back to the outermost bracket-delimited
//! substring; valid JSON of the wrong shape is rejected.

use std::sync::OnceLock;

use regex::Regex;
use serde_json::{Map, Value};

/// Remove a surrounding markdown code fence, with or without a language tag
pub fn strip_code_fences(reply: &str) -> &str {
    let trimmed = reply.trim();

    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };

    // Drop the language tag, if any, up to the end of the opening line
    let body = match rest.split_once('\n') {
        Some((tag, body)) if tag.trim().chars().all(|c| c.is_ascii_alphanumeric()) => body,
        _ => rest.strip_prefix("json").unwrap_or(rest),
    };

    body.trim_end().strip_suffix("```").unwrap_or(body).trim()
}

/// Extract a JSON array from a reply
pub fn json_array(reply: &str) -> Option<Vec<Value>> {
    fn re() -> &'static Regex {
        static RE: OnceLock<Regex> = OnceLock::new();
        RE.get_or_init(|| Regex::new(r"\[[\s\S]*\]").expect("must be valid regex"))
    }

    let cleaned = strip_code_fences(reply);

    match serde_json::from_str(cleaned) {
        Ok(Value::Array(items)) => return Some(items),
        Ok(_) => return None,
        Err(_) => {}
    }

    match serde_json::from_str(re().find(cleaned)?.as_str()) {
        Ok(Value::Array(items)) => Some(items),
        _ => None,
    }
}

/// Extract a JSON object from a reply
pub fn json_object(reply: &str) -> Option<Map<String, Value>> {
    fn re() -> &'static Regex {
        static RE: OnceLock<Regex> = OnceLock::new();
        RE.get_or_init(|| Regex::new(r"\{[\s\S]*\}").expect("must be valid regex"))
    }

    let cleaned = strip_code_fences(reply);

    match serde_json::from_str(cleaned) {
        Ok(Value::Object(map)) => return Some(map),
        Ok(_) => return None,
        Err(_) => {}
    }

    match serde_json::from_str(re().find(cleaned)?.as_str()) {
        Ok(Value::Object(map)) => Some(map),
        _ => None,
    }
}

/// Keep the string entries of a JSON array, at most `limit` of them
pub fn strings(items: Vec<Value>, limit: usize) -> Vec<String> {
    items
        .into_iter()
        .filter_map(|item| match item {
            Value::String(s) => Some(s),
            _ => None,
        })
        .take(limit)
        .collect()
}
