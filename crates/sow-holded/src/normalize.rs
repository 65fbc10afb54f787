//! Raw Holded document JSON -> [`RawOrder`].
//!
//! The API is loose about shapes: ids under `_id` or `id`, numbers sent as
//! strings, tags as a list or a single string, custom fields as a map or as
//! `[{ "field": .., "value": .. }]`. Anything unreadable degrades to a
//! default; only a document without an id is rejected.

use std::collections::BTreeMap;

use serde_json::{Map, Value};
use sow_schemas::{OrderLine, RawOrder};

use crate::OrderSourceError;

/// A scalar as text: strings trimmed, numbers and bools rendered.
pub(crate) fn as_text(v: &Value) -> Option<String> {
    match v {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// A number, or a numeric string (`"12,5"` accepted).
pub(crate) fn as_f64(v: &Value) -> Option<f64> {
    let f: f64 = match v {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().replace(',', ".").parse().ok()?,
        _ => return None,
    };
    f.is_finite().then_some(f)
}

fn first_text(obj: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|k| obj.get(*k).and_then(as_text))
}

fn first_f64(obj: &Map<String, Value>, keys: &[&str]) -> Option<f64> {
    keys.iter().find_map(|k| obj.get(*k).and_then(as_f64))
}

fn tags_of(v: Option<&Value>) -> Vec<String> {
    match v {
        Some(Value::Array(items)) => items.iter().filter_map(as_text).collect(),
        Some(Value::String(s)) => s
            .split(',')
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_string)
            .collect(),
        _ => Vec::new(),
    }
}

/// Epoch seconds; millisecond timestamps are scaled down.
fn epoch_secs(v: &Value) -> Option<i64> {
    let f = as_f64(v)?;
    let secs = if f.abs() >= 1e12 { f / 1000.0 } else { f };
    Some(secs as i64)
}

/// `attributes` and `customFields` of an object, plus any top-level scalar
/// whose key is one of `extra_keys`.
pub(crate) fn collect_attributes(obj: &Map<String, Value>, extra_keys: &[String]) -> BTreeMap<String, String> {
    let mut out = BTreeMap::new();

    for container in ["attributes", "customFields"] {
        match obj.get(container) {
            Some(Value::Object(map)) => {
                for (k, v) in map {
                    if let Some(t) = as_text(v) {
                        out.entry(k.clone()).or_insert(t);
                    }
                }
            }
            Some(Value::Array(entries)) => {
                for entry in entries.iter().filter_map(Value::as_object) {
                    let key = first_text(entry, &["field", "name", "key"]);
                    let val = entry.get("value").and_then(as_text);
                    if let (Some(k), Some(v)) = (key, val) {
                        out.entry(k).or_insert(v);
                    }
                }
            }
            _ => {}
        }
    }

    for (k, v) in obj {
        if extra_keys.iter().any(|e| e.eq_ignore_ascii_case(k)) {
            if let Some(t) = as_text(v) {
                out.entry(k.clone()).or_insert(t);
            }
        }
    }
    out
}

fn normalize_line(obj: &Map<String, Value>, attribute_keys: &[String]) -> OrderLine {
    let name = first_text(obj, &["name", "desc", "description"]).unwrap_or_default();
    OrderLine {
        name,
        sku: first_text(obj, &["sku", "code"]),
        product_id: first_text(obj, &["productId", "product_id"]),
        quantity: first_f64(obj, &["units", "quantity", "qty"]).unwrap_or(0.0),
        unit_price: first_f64(obj, &["price", "unitPrice", "unit_price"]),
        attributes: collect_attributes(obj, attribute_keys),
        tags: tags_of(obj.get("tags")),
    }
}

/// Lines from `products`, else `lines`, else `items`.
fn line_values(doc: &Map<String, Value>) -> &[Value] {
    ["products", "lines", "items"]
        .iter()
        .find_map(|k| match doc.get(*k) {
            Some(Value::Array(a)) if !a.is_empty() => Some(a.as_slice()),
            _ => None,
        })
        .unwrap_or(&[])
}

pub fn normalize_document(doc: &Value, attribute_keys: &[String]) -> Result<RawOrder, OrderSourceError> {
    let obj = doc
        .as_object()
        .ok_or_else(|| OrderSourceError::Decode("document is not a JSON object".to_string()))?;
    let order_id = first_text(obj, &["_id", "id"])
        .ok_or_else(|| OrderSourceError::Decode("document has no _id/id".to_string()))?;

    Ok(RawOrder {
        number: first_text(obj, &["number", "code", "docNumber"]),
        customer_name: first_text(obj, &["contactName", "contact_name", "customer"])
            .unwrap_or_else(|| "-".to_string()),
        status: first_text(obj, &["status"]).unwrap_or_default(),
        date: ["date", "createdAt", "issuedOn", "updatedAt"]
            .iter()
            .find_map(|k| obj.get(*k).and_then(epoch_secs)),
        tags: tags_of(obj.get("tags")),
        lines: line_values(obj)
            .iter()
            .filter_map(Value::as_object)
            .map(|l| normalize_line(l, attribute_keys))
            .collect(),
        order_id,
    })
}
