use once_cell::sync::Lazy;
use serde_json::{Map, Value as JsonValue};

static NO_TAGS: Lazy<Map<String, JsonValue>> = Lazy::new(Map::new);

/// Read-only view over one serie of a reply
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Serie<'a> {
    raw: &'a Map<String, JsonValue>,
}

impl<'a> Serie<'a> {
    pub(crate) fn new(raw: &'a Map<String, JsonValue>) -> Self {
        Self { raw }
    }

    pub fn raw(&self) -> &'a Map<String, JsonValue> {
        self.raw
    }

    pub fn name(&self) -> &'a str {
        self.raw.get("name").and_then(JsonValue::as_str).unwrap_or("")
    }

    pub fn columns(&self) -> Vec<&'a str> {
        self.raw
            .get("columns")
            .and_then(JsonValue::as_array)
            .map(|cols| cols.iter().filter_map(JsonValue::as_str).collect())
            .unwrap_or_default()
    }

    /// Rows aligned to [`Serie::columns`]; empty when the serie has no `values`
    pub fn values(&self) -> Vec<&'a [JsonValue]> {
        self.raw
            .get("values")
            .and_then(JsonValue::as_array)
            .map(|rows| {
                rows.iter()
                    .filter_map(JsonValue::as_array)
                    .map(Vec::as_slice)
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Tag key/value pairs attached to this serie
    pub fn tags(&self) -> &'a Map<String, JsonValue> {
        self.raw
            .get("tags")
            .and_then(JsonValue::as_object)
            .unwrap_or_else(|| &*NO_TAGS)
    }

    pub fn row_count(&self) -> usize {
        self.raw
            .get("values")
            .and_then(JsonValue::as_array)
            .map_or(0, Vec::len)
    }
}
