//! Decoded reply of a query
//!
//! The reply shape is `{"results": [{"series": [{name, columns, values, tags}]}]}`.
//! A reply without results or series is a normal "no data" outcome, never an
//! error; only a reply that does not follow the shape at all is rejected.

mod serie;

pub use serie::Serie;

use serde_json::{Map, Value as JsonValue};

#[derive(Debug, thiserror::Error)]
pub enum ResponseError {
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

fn invalid(reason: impl Into<String>) -> ResponseError {
    ResponseError::InvalidResponse(reason.into())
}

/// Owns the raw reply and hands out [`Serie`] views over it
#[derive(Debug, Clone, PartialEq)]
pub struct Response {
    raw: JsonValue,
}

impl Response {
    /// Wrap a decoded reply after checking its shape
    pub fn new(raw: JsonValue) -> Result<Self, ResponseError> {
        validate(&raw)?;
        Ok(Self { raw })
    }

    /// The empty mapping: no results at all
    pub fn empty() -> Self {
        Self {
            raw: JsonValue::Object(Map::new()),
        }
    }

    pub fn from_slice(bytes: &[u8]) -> Result<Self, ResponseError> {
        Self::new(serde_json::from_slice(bytes)?)
    }

    pub fn raw(&self) -> &JsonValue {
        &self.raw
    }

    pub fn into_raw(self) -> JsonValue {
        self.raw
    }

    fn first_result(&self) -> Option<&Map<String, JsonValue>> {
        self.raw
            .get("results")?
            .as_array()?
            .first()?
            .as_object()
    }

    /// Series of the first result, `None` when it carries no `series` key
    pub fn series(&self) -> Option<Vec<Serie<'_>>> {
        let series = self.first_result()?.get("series")?.as_array()?;
        Some(
            series
                .iter()
                .filter_map(JsonValue::as_object)
                .map(Serie::new)
                .collect(),
        )
    }

    /// First serie of the first result
    pub fn main_serie(&self) -> Option<Serie<'_>> {
        self.first_result()?
            .get("series")?
            .as_array()?
            .first()?
            .as_object()
            .map(Serie::new)
    }

    /// Statement-level error message reported inside the reply, if any
    pub fn error(&self) -> Option<&str> {
        self.first_result()
            .and_then(|r| r.get("error"))
            .or_else(|| self.raw.get("error"))
            .and_then(JsonValue::as_str)
    }
}

impl std::str::FromStr for Response {
    type Err = ResponseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(serde_json::from_str(s)?)
    }
}

impl TryFrom<JsonValue> for Response {
    type Error = ResponseError;

    fn try_from(raw: JsonValue) -> Result<Self, Self::Error> {
        Self::new(raw)
    }
}

fn validate(raw: &JsonValue) -> Result<(), ResponseError> {
    let root = raw
        .as_object()
        .ok_or_else(|| invalid("reply is not a JSON object"))?;

    let results = match root.get("results") {
        None => return Ok(()),
        Some(results) => results
            .as_array()
            .ok_or_else(|| invalid("`results` is not a list"))?,
    };

    for (i, result) in results.iter().enumerate() {
        let result = result
            .as_object()
            .ok_or_else(|| invalid(format!("result {} is not an object", i)))?;

        let series = match result.get("series") {
            None => continue,
            Some(series) => series
                .as_array()
                .ok_or_else(|| invalid(format!("result {}: `series` is not a list", i)))?,
        };

        for (j, serie) in series.iter().enumerate() {
            validate_serie(serie).map_err(|reason| {
                invalid(format!("result {} serie {}: {}", i, j, reason))
            })?;
        }
    }

    Ok(())
}

fn validate_serie(serie: &JsonValue) -> Result<(), String> {
    let serie = serie.as_object().ok_or("not an object")?;

    if let Some(name) = serie.get("name") {
        if !name.is_string() {
            return Err("`name` is not a string".into());
        }
    }

    let columns = serie
        .get("columns")
        .and_then(JsonValue::as_array)
        .ok_or("`columns` is missing or not a list")?;
    if !columns.iter().all(JsonValue::is_string) {
        return Err("`columns` contains a non-string entry".into());
    }

    if let Some(values) = serie.get("values") {
        let rows = values.as_array().ok_or("`values` is not a list")?;
        if !rows.iter().all(JsonValue::is_array) {
            return Err("`values` contains a row that is not a list".into());
        }
    }

    if let Some(tags) = serie.get("tags") {
        if !tags.is_object() {
            return Err("`tags` is not an object".into());
        }
    }

    Ok(())
}
