use std::sync::Arc;

use serde_json::Value as JsonValue;

use super::{FlatFormattedSerieSerializer, SerializeError, Serializer};
use crate::measurement::{MeasurementSchema, Precision, Record};
use crate::response::Response;

/// Materializes the single serie of a reply into typed [`Record`]s
///
/// Timestamp attributes arrive as integers in the reply epoch (nanoseconds
/// unless configured otherwise) and are converted to seconds.
#[derive(Debug, Clone)]
pub struct MeasurementSerializer {
    schema: Arc<MeasurementSchema>,
    epoch: Precision,
}

impl MeasurementSerializer {
    pub fn new(schema: Arc<MeasurementSchema>) -> Self {
        Self {
            schema,
            epoch: Precision::Nanoseconds,
        }
    }

    pub fn with_epoch(mut self, epoch: Precision) -> Self {
        self.epoch = epoch;
        self
    }

    pub fn schema(&self) -> &Arc<MeasurementSchema> {
        &self.schema
    }
}

impl Serializer for MeasurementSerializer {
    type Output = Vec<Record>;

    fn convert(&self, response: &Response) -> Result<Self::Output, SerializeError> {
        let mut rows = FlatFormattedSerieSerializer.convert(response)?;

        let divisor = self.epoch.per_second();
        for attribute in self.schema.timestamp_attributes() {
            for row in rows.iter_mut() {
                let Some(raw) = row.get(&attribute.name).and_then(JsonValue::as_f64) else {
                    continue;
                };
                if let Some(secs) = serde_json::Number::from_f64(raw / divisor) {
                    row.insert(attribute.name.clone(), JsonValue::Number(secs));
                }
            }
        }

        let records = rows
            .iter()
            .map(|row| Record::from_row(&self.schema, row))
            .collect::<Result<Vec<_>, _>>()?;

        tracing::debug!(
            measurement = self.schema.measurement_name(),
            records = records.len(),
            "Materialized records"
        );
        Ok(records)
    }
}

/// Renders records as a newline-separated line-protocol batch
#[derive(Debug, Clone, Copy, Default)]
pub struct MeasurementPointSerializer;

impl MeasurementPointSerializer {
    pub fn convert(&self, records: &[Record]) -> Result<String, SerializeError> {
        let lines = records
            .iter()
            .map(Record::to_line_protocol)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(lines.join("\n"))
    }
}
