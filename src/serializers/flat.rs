use serde_json::Value as JsonValue;

use super::{SerializeError, Serializer};
use crate::response::Response;

/// Main serie rows concatenated into one sequence
#[derive(Debug, Clone, Copy, Default)]
pub struct FlatSimpleResultSerializer;

impl Serializer for FlatSimpleResultSerializer {
    type Output = Vec<JsonValue>;

    fn convert(&self, response: &Response) -> Result<Self::Output, SerializeError> {
        let Some(serie) = response.main_serie() else {
            tracing::debug!("No main serie to flatten");
            return Ok(Vec::new());
        };
        Ok(serie
            .values()
            .into_iter()
            .flat_map(|row| row.iter().cloned())
            .collect())
    }
}

/// The single scalar of the main serie, `None` unless exactly one value exists
#[derive(Debug, Clone, Copy, Default)]
pub struct FlatSingleValueSerializer;

impl Serializer for FlatSingleValueSerializer {
    type Output = Option<JsonValue>;

    fn convert(&self, response: &Response) -> Result<Self::Output, SerializeError> {
        let mut values = FlatSimpleResultSerializer.convert(response)?;
        if values.len() != 1 {
            tracing::debug!(values = values.len(), "Expected a single value");
            return Ok(None);
        }
        Ok(values.pop())
    }
}
