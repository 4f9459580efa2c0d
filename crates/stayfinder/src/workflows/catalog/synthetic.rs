//! Recovery of listing rows from free-form text returned by a text-generation service.
//!
//! Generated output routinely wraps the JSON payload in prose or code fences, so the
//! first array (or, failing that, the first object) embedded in the text is used.

use serde_json::Value;

use super::domain::RawListing;
use super::CatalogError;

pub fn extract_listings(text: &str) -> Result<Vec<RawListing>, CatalogError> {
    let value = extract_json(text).ok_or_else(|| {
        CatalogError::Synthetic("no JSON array or object found in generated text".to_string())
    })?;

    let rows: Vec<RawListing> = match &value {
        Value::Array(items) => items
            .iter()
            .filter_map(Value::as_object)
            .map(RawListing::from_json)
            .collect(),
        Value::Object(object) => vec![RawListing::from_json(object)],
        _ => Vec::new(),
    };

    if rows.is_empty() {
        return Err(CatalogError::Synthetic(
            "generated JSON contained no listing objects".to_string(),
        ));
    }

    Ok(rows)
}

fn extract_json(text: &str) -> Option<Value> {
    extract_delimited(text, '[', ']').or_else(|| extract_delimited(text, '{', '}'))
}

/// Parse from the first `open` to the furthest `close` that yields valid JSON.
fn extract_delimited(text: &str, open: char, close: char) -> Option<Value> {
    let start = text.find(open)?;
    text.char_indices()
        .rev()
        .take_while(|(index, _)| *index > start)
        .filter(|(_, ch)| *ch == close)
        .find_map(|(end, _)| serde_json::from_str(&text[start..=end]).ok())
}
