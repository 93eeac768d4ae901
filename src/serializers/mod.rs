//! Converters from a [`Response`] to caller-facing shapes
//!
//! Every converter implements [`Serializer`]. "No data" (no series, no main
//! serie) always converts to the converter's empty form rather than an error.

pub mod dataframe;
pub mod flat;
pub mod formatted;
pub mod measurement;
pub mod row_column;

pub use dataframe::DataFrameSerializer;
pub use flat::{FlatSimpleResultSerializer, FlatSingleValueSerializer};
pub use formatted::{FlatFormattedSerieSerializer, FormattedSerie, FormattedSerieSerializer};
pub use measurement::{MeasurementPointSerializer, MeasurementSerializer};
pub use row_column::{ColumnHeader, LegacyRowColumnSerializer, RowColumnSerializer, RowColumns};

use crate::error::ConstructionError;
use crate::response::Response;

/// One row keyed by column name, in column order
pub type RowDict = serde_json::Map<String, serde_json::Value>;

#[derive(Debug, thiserror::Error)]
pub enum SerializeError {
    #[error("Schema mismatch for {measurement}: {reason}")]
    SchemaMismatch { measurement: String, reason: String },

    #[error("Construction error: {0}")]
    Construction(#[from] ConstructionError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),
}

pub trait Serializer {
    type Output;

    fn convert(&self, response: &Response) -> Result<Self::Output, SerializeError>;
}

/// Returns the raw reply unchanged
#[derive(Debug, Clone, Copy, Default)]
pub struct BaseSerializer;

impl Serializer for BaseSerializer {
    type Output = serde_json::Value;

    fn convert(&self, response: &Response) -> Result<Self::Output, SerializeError> {
        Ok(response.raw().clone())
    }
}

/// Renders the raw reply as JSON text
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonSerializer;

impl Serializer for JsonSerializer {
    type Output = String;

    fn convert(&self, response: &Response) -> Result<Self::Output, SerializeError> {
        Ok(serde_json::to_string(response.raw())?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn reply() -> serde_json::Value {
        json!({"results": [{"series": [{"name": "m", "columns": ["time", "value"], "values": [[10, 1]]}]}]})
    }

    #[test]
    fn test_passthrough() {
        let response = Response::new(reply()).unwrap();
        assert_eq!(BaseSerializer.convert(&response).unwrap(), reply());
    }

    #[test]
    fn test_json_text() {
        let response = Response::new(reply()).unwrap();
        let text = JsonSerializer.convert(&response).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(parsed, reply());

        assert_eq!(JsonSerializer.convert(&Response::empty()).unwrap(), "{}");
    }
}
