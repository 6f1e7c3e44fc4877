//! Conversion between document trees and `serde_json::Value`.

use serde_json::{Map, Value as JsonValue};
use smol_str::SmolStr;

use crate::constants::MAX_DEPTH;
use crate::document::{Document, Value};
use crate::options::DocumentOptions;
use crate::{Error, Result};

impl Document {
    /// Build a tree from a JSON object or array. Numbers and booleans are
    /// stored as literals with their JSON spelling, `null` as [`Value::Null`].
    ///
    /// # Examples
    /// ```
    /// use arena_json::{Document, DocumentOptions};
    /// use serde_json::json;
    ///
    /// let doc = Document::from_json_value(&json!({"n": [1, 2]}), &DocumentOptions::default())
    ///     .unwrap();
    /// assert_eq!(doc.to_text().unwrap(), r#"{"n":[1,2]}"#);
    /// ```
    pub fn from_json_value(value: &JsonValue, options: &DocumentOptions) -> Result<Document> {
        let is_array = match value {
            JsonValue::Object(_) => false,
            JsonValue::Array(_) => true,
            _ => {
                return Err(Error::KindMismatch {
                    expected: "object or array",
                    found: "scalar",
                })
            }
        };
        let doc = Document::with_options(options.clone().with_array(is_array));
        fill(&doc, value, 0)?;
        Ok(doc)
    }

    /// Export as a `serde_json::Value`.
    ///
    /// Literals are read back as JSON numbers or booleans when they parse as
    /// such and kept as strings otherwise. Null-valued entries are left out,
    /// as in serialized output, and the first of repeated keys wins.
    pub fn to_json_value(&self) -> Result<JsonValue> {
        export(self, 0)
    }
}

fn fill(doc: &Document, value: &JsonValue, depth: usize) -> Result<()> {
    if depth >= MAX_DEPTH {
        return Err(Error::DepthLimit);
    }
    match value {
        JsonValue::Object(map) => {
            for (key, item) in map {
                fill_entry(doc, Some(SmolStr::new(key)), item, depth)?;
            }
        }
        JsonValue::Array(items) => {
            for item in items {
                fill_entry(doc, None, item, depth)?;
            }
        }
        _ => {}
    }
    Ok(())
}

fn fill_entry(doc: &Document, key: Option<SmolStr>, item: &JsonValue, depth: usize) -> Result<()> {
    match item {
        JsonValue::Object(_) => fill(&doc.derive(key, false), item, depth + 1),
        JsonValue::Array(_) => fill(&doc.derive(key, true), item, depth + 1),
        JsonValue::Null => {
            doc.append_entry(key, Value::Null);
            Ok(())
        }
        JsonValue::Bool(flag) => {
            doc.append_entry(key, Value::from(*flag));
            Ok(())
        }
        JsonValue::Number(number) => {
            doc.append_entry(key, Value::literal(number.to_string()));
            Ok(())
        }
        JsonValue::String(text) => {
            doc.append_entry(key, Value::from(text.as_str()));
            Ok(())
        }
    }
}

fn export(doc: &Document, depth: usize) -> Result<JsonValue> {
    if depth >= MAX_DEPTH {
        return Err(Error::DepthLimit);
    }
    if doc.is_array() {
        let mut items = Vec::with_capacity(doc.len());
        for entry in doc {
            if let Some(item) = export_value(entry.value, depth)? {
                items.push(item);
            }
        }
        return Ok(JsonValue::Array(items));
    }
    let mut map = Map::new();
    for entry in doc {
        let Some(key) = entry.key else {
            continue;
        };
        if map.contains_key(key.as_str()) {
            continue;
        }
        if let Some(item) = export_value(entry.value, depth)? {
            map.insert(key.to_string(), item);
        }
    }
    Ok(JsonValue::Object(map))
}

fn export_value(value: Value, depth: usize) -> Result<Option<JsonValue>> {
    Ok(match value {
        Value::Null => None,
        Value::Text(text) => Some(JsonValue::String(text.to_string())),
        Value::Literal(text) => Some(literal_to_json(&text)),
        Value::Document(child) => Some(export(&child, depth + 1)?),
    })
}

fn literal_to_json(text: &str) -> JsonValue {
    match serde_json::from_str::<JsonValue>(text) {
        Ok(value @ (JsonValue::Null | JsonValue::Bool(_) | JsonValue::Number(_))) => value,
        _ => JsonValue::String(text.to_string()),
    }
}
