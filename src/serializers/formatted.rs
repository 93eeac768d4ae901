use serde::ser::{Serialize, SerializeMap, Serializer as SerdeSerializer};
use serde_json::Value as JsonValue;

use super::{RowDict, SerializeError, Serializer};
use crate::response::{Response, Serie};

/// Rows of one serie keyed by column, serialized as `{name: [rows]}`
#[derive(Debug, Clone, PartialEq)]
pub struct FormattedSerie {
    pub name: String,
    pub rows: Vec<RowDict>,
}

impl FormattedSerie {
    fn from_serie(serie: &Serie<'_>) -> Self {
        let columns = serie.columns();
        let values = serie.values();

        let rows = if values.is_empty() {
            // A serie without values still yields one all-null row
            vec![columns
                .iter()
                .map(|c| (c.to_string(), JsonValue::Null))
                .collect()]
        } else {
            values
                .iter()
                .map(|row| {
                    columns
                        .iter()
                        .zip(row.iter())
                        .map(|(c, v)| (c.to_string(), v.clone()))
                        .collect()
                })
                .collect()
        };

        Self {
            name: serie.name().to_string(),
            rows,
        }
    }

    pub fn to_json(&self) -> JsonValue {
        let rows = self.rows.iter().cloned().map(JsonValue::Object).collect();
        let mut map = RowDict::new();
        map.insert(self.name.clone(), JsonValue::Array(rows));
        JsonValue::Object(map)
    }
}

impl Serialize for FormattedSerie {
    fn serialize<S: SerdeSerializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry(&self.name, &self.rows)?;
        map.end()
    }
}

/// One `{serie_name: [{column: value}]}` entry per serie
#[derive(Debug, Clone, Copy, Default)]
pub struct FormattedSerieSerializer;

impl Serializer for FormattedSerieSerializer {
    type Output = Vec<FormattedSerie>;

    fn convert(&self, response: &Response) -> Result<Self::Output, SerializeError> {
        let series = response.series().unwrap_or_default();
        Ok(series.iter().map(FormattedSerie::from_serie).collect())
    }
}

/// Row dicts of the only serie; empty unless there is exactly one serie
#[derive(Debug, Clone, Copy, Default)]
pub struct FlatFormattedSerieSerializer;

impl Serializer for FlatFormattedSerieSerializer {
    type Output = Vec<RowDict>;

    fn convert(&self, response: &Response) -> Result<Self::Output, SerializeError> {
        let mut formatted = FormattedSerieSerializer.convert(response)?;
        if formatted.len() != 1 {
            tracing::debug!(series = formatted.len(), "Expected exactly one serie to flatten");
            return Ok(Vec::new());
        }
        Ok(formatted.remove(0).rows)
    }
}
