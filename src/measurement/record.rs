use std::sync::Arc;

use chrono::{DateTime, Utc};

use super::attribute::Attribute;
use super::schema::MeasurementSchema;
use crate::data::Value;
use crate::error::ConstructionError;
use crate::serializers::{RowDict, SerializeError};

/// One materialized row of a declared measurement
///
/// Values are stored in attribute declaration order and always hold the
/// attribute's declared kind (or `Null`).
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    schema: Arc<MeasurementSchema>,
    values: Vec<Value>,
}

impl Record {
    /// Empty record, every attribute null
    pub fn new(schema: Arc<MeasurementSchema>) -> Self {
        let values = vec![Value::Null; schema.attributes().len()];
        Self { schema, values }
    }

    /// Build a record from a `{column -> cell}` row.
    ///
    /// Every key must name a declared attribute. Missing attributes are null,
    /// which is rejected for non-nullable attributes.
    pub fn from_row(schema: &Arc<MeasurementSchema>, row: &RowDict) -> Result<Self, SerializeError> {
        let mismatch = |reason: String| SerializeError::SchemaMismatch {
            measurement: schema.measurement_name().to_string(),
            reason,
        };

        if let Some(unknown) = row.keys().find(|k| schema.attribute(k).is_none()) {
            return Err(mismatch(format!("unexpected field {}", unknown)));
        }

        let mut values = Vec::with_capacity(schema.attributes().len());
        for attribute in schema.attributes() {
            let cell = row.get(&attribute.name).unwrap_or(&serde_json::Value::Null);
            let value = attribute.coerce(cell).ok_or_else(|| {
                mismatch(format!(
                    "{} is not a valid {:?} for attribute {}",
                    cell, attribute.kind, attribute.name
                ))
            })?;
            if value.is_null() && !attribute.nullable {
                return Err(mismatch(format!(
                    "attribute {} is not nullable",
                    attribute.name
                )));
            }
            values.push(value);
        }

        Ok(Self {
            schema: Arc::clone(schema),
            values,
        })
    }

    /// Set an attribute, coercing the value into its declared kind
    pub fn set(mut self, name: &str, value: impl Into<Value>) -> Result<Self, ConstructionError> {
        let index = self
            .schema
            .position(name)
            .ok_or_else(|| ConstructionError::UnknownAttribute {
                measurement: self.schema.measurement_name().to_string(),
                attribute: name.to_string(),
            })?;

        let value = value.into();
        if let Value::Float64(f) | Value::Timestamp(f) = &value {
            if !f.is_finite() {
                return Err(ConstructionError::InvalidValue {
                    attribute: name.to_string(),
                    value: value.to_string(),
                });
            }
        }
        let coerced = self.schema.attributes()[index]
            .coerce(&value.to_json())
            .ok_or_else(|| ConstructionError::InvalidValue {
                attribute: name.to_string(),
                value: value.to_string(),
            })?;
        self.values[index] = coerced;
        Ok(self)
    }

    pub fn schema(&self) -> &Arc<MeasurementSchema> {
        &self.schema
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.schema.position(name).map(|i| &self.values[i])
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Attribute, &Value)> {
        self.schema.attributes().iter().zip(self.values.iter())
    }

    /// Timestamp attribute as a UTC datetime
    pub fn time(&self) -> Option<DateTime<Utc>> {
        let attribute = self.schema.timestamp_attribute()?;
        let secs = self.get(&attribute.name)?.as_f64()?;
        let whole = secs.floor();
        let nanos = ((secs - whole) * 1e9).round() as u32;
        DateTime::from_timestamp(whole as i64, nanos.min(999_999_999))
    }

    /// `{attribute -> value}` in declaration order
    pub fn to_json(&self) -> serde_json::Value {
        let map: RowDict = self
            .iter()
            .map(|(attribute, value)| (attribute.name.clone(), value.to_json()))
            .collect();
        serde_json::Value::Object(map)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::measurement::Attribute;
    use serde_json::json;

    fn schema() -> Arc<MeasurementSchema> {
        MeasurementSchema::builder("cpu")
            .attribute(Attribute::timestamp("time"))
            .attribute(Attribute::tag("host"))
            .attribute(Attribute::float("value").not_null())
            .build()
            .unwrap()
    }

    fn row(value: serde_json::Value) -> RowDict {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_from_row() {
        let schema = schema();
        let record =
            Record::from_row(&schema, &row(json!({"time": 1.0, "host": "a", "value": 2}))).unwrap();
        assert_eq!(record.get("time"), Some(&Value::Timestamp(1.0)));
        assert_eq!(record.get("host"), Some(&Value::String("a".into())));
        assert_eq!(record.get("value"), Some(&Value::Float64(2.0)));
        assert_eq!(record.time().unwrap().timestamp(), 1);
    }

    #[test]
    fn test_missing_nullable_attribute_is_null() {
        let schema = schema();
        let record = Record::from_row(&schema, &row(json!({"value": 1.5}))).unwrap();
        assert_eq!(record.get("host"), Some(&Value::Null));
        assert_eq!(record.time(), None);
    }

    #[test]
    fn test_schema_mismatch() {
        let schema = schema();
        let err = Record::from_row(&schema, &row(json!({"value": 1, "extra": 2}))).unwrap_err();
        assert!(matches!(err, SerializeError::SchemaMismatch { .. }));

        let err = Record::from_row(&schema, &row(json!({"host": "a"}))).unwrap_err();
        assert!(matches!(err, SerializeError::SchemaMismatch { .. }));

        let err = Record::from_row(&schema, &row(json!({"value": "high"}))).unwrap_err();
        assert!(matches!(err, SerializeError::SchemaMismatch { .. }));
    }

    #[test]
    fn test_set_coerces() {
        let record = Record::new(schema())
            .set("value", 3)
            .unwrap()
            .set("host", "web-1")
            .unwrap();
        assert_eq!(record.get("value"), Some(&Value::Float64(3.0)));

        let err = Record::new(schema()).set("nope", 1).unwrap_err();
        assert!(matches!(err, ConstructionError::UnknownAttribute { .. }));

        let err = Record::new(schema()).set("value", "x").unwrap_err();
        assert!(matches!(err, ConstructionError::InvalidValue { .. }));

        let err = Record::new(schema()).set("time", f64::NAN).unwrap_err();
        assert!(matches!(err, ConstructionError::InvalidValue { .. }));
    }

    #[test]
    fn test_to_json_keeps_declaration_order() {
        let record = Record::new(schema()).set("value", 1.5).unwrap();
        let json = record.to_json();
        let keys: Vec<&String> = json.as_object().unwrap().keys().collect();
        assert_eq!(keys, vec!["time", "host", "value"]);
    }
}
