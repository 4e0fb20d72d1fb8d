//! Lenient decoding of aggregation records.
//!
//! The aggregation endpoint does not pin down field names: an entry may carry
//! `id` or `key`, `label`, `name` or `title`, and ids may arrive as strings or
//! numbers. Everything is mapped into strict types here, once, so the rest of
//! the crate never branches on payload shape.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

/// One option of a flat facet (author, publisher, language, ...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FacetOption {
    /// Value sent back to the backend when the option is selected.
    pub value: String,
    /// Display label.
    pub label: String,
    /// Number of matching products.
    pub count: u64,
}

#[derive(Debug, Deserialize)]
struct RawFacetOption {
    value: Option<Value>,
    id: Option<Value>,
    key: Option<Value>,
    label: Option<String>,
    name: Option<String>,
    title: Option<String>,
    #[serde(alias = "docCount", alias = "productCount")]
    count: Option<f64>,
}

/// Render an id-like JSON value as a key string.
///
/// Strings are trimmed; numbers are printed as-is. Blank strings, booleans,
/// arrays and objects are not usable keys.
pub(crate) fn value_to_key(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => {
            let trimmed = s.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        }
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// First non-blank label among the candidates.
pub(crate) fn first_label(candidates: [&Option<String>; 3]) -> Option<String> {
    candidates
        .into_iter()
        .flatten()
        .map(|s| s.trim())
        .find(|s| !s.is_empty())
        .map(str::to_string)
}

/// Clamp a backend count into a non-negative integer.
pub(crate) fn normalize_count(count: Option<f64>) -> u64 {
    match count {
        Some(c) if c.is_finite() && c > 0.0 => c.round() as u64,
        _ => 0,
    }
}

/// Normalize raw facet entries into [`FacetOption`]s.
///
/// Entries that are not objects, or that carry neither a key nor a label,
/// are skipped and logged. An entry with only one of the two uses it for both.
pub fn normalize_facet_options(raw: &[Value]) -> Vec<FacetOption> {
    raw.iter()
        .enumerate()
        .filter_map(|(position, entry)| {
            let parsed: RawFacetOption = match serde_json::from_value(entry.clone()) {
                Ok(parsed) => parsed,
                Err(e) => {
                    warn!(position, error = %e, "skipping unparseable facet entry");
                    return None;
                }
            };

            let key = [&parsed.value, &parsed.id, &parsed.key]
                .into_iter()
                .flatten()
                .find_map(value_to_key);
            let label = first_label([&parsed.label, &parsed.name, &parsed.title]);

            let (value, label) = match (key, label) {
                (Some(k), Some(l)) => (k, l),
                (Some(k), None) => (k.clone(), k),
                (None, Some(l)) => (l.clone(), l),
                (None, None) => {
                    debug!(position, "dropping facet entry without key or label");
                    return None;
                }
            };

            Some(FacetOption {
                value,
                label,
                count: normalize_count(parsed.count),
            })
        })
        .collect()
}
