//! Line protocol rendering for writes
//!
//! `measurement[,tag=v...] field=v[,field=v...] [timestamp]`

use super::attribute::AttributeKind;
use super::record::Record;
use crate::data::Value;
use crate::error::ConstructionError;

fn escape_measurement(s: &str) -> String {
    s.replace(',', "\\,").replace(' ', "\\ ")
}

fn escape_key(s: &str) -> String {
    s.replace(',', "\\,").replace('=', "\\=").replace(' ', "\\ ")
}

fn field_value(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::Bool(b) => Some(b.to_string()),
        Value::Int64(i) => Some(format!("{}i", i)),
        Value::Float64(f) | Value::Timestamp(f) => Some(f.to_string()),
        Value::String(s) => Some(format!(
            "\"{}\"",
            s.replace('\\', "\\\\").replace('"', "\\\"")
        )),
    }
}

impl Record {
    /// Render this record as one line-protocol point
    pub fn to_line_protocol(&self) -> Result<String, ConstructionError> {
        let measurement = self.schema().measurement_name();

        let mut tags: Vec<(String, String)> = Vec::new();
        let mut fields: Vec<String> = Vec::new();
        let mut timestamp: Option<i64> = None;

        for (attribute, value) in self.iter() {
            match attribute.kind {
                AttributeKind::Tag => {
                    // Empty tag values are not representable
                    if let Some(v) = value.as_str().filter(|v| !v.is_empty()) {
                        tags.push((escape_key(&attribute.name), escape_key(v)));
                    }
                }
                AttributeKind::Timestamp => {
                    if let Some(secs) = value.as_f64() {
                        let precision = attribute.precision.unwrap_or_default();
                        timestamp = Some((secs * precision.per_second()).round() as i64);
                    }
                }
                _ => {
                    if let Some(rendered) = field_value(value) {
                        fields.push(format!("{}={}", escape_key(&attribute.name), rendered));
                    }
                }
            }
        }

        if fields.is_empty() {
            return Err(ConstructionError::NoFields(measurement.to_string()));
        }

        tags.sort();

        let mut line = escape_measurement(measurement);
        for (key, value) in &tags {
            line.push(',');
            line.push_str(key);
            line.push('=');
            line.push_str(value);
        }
        line.push(' ');
        line.push_str(&fields.join(","));
        if let Some(ts) = timestamp {
            line.push(' ');
            line.push_str(&ts.to_string());
        }

        Ok(line)
    }
}

#[cfg(test)]
mod tests {
    use crate::error::ConstructionError;
    use crate::measurement::{Attribute, MeasurementSchema, Precision, Record};

    #[test]
    fn test_line_protocol() {
        let schema = MeasurementSchema::builder("cpu load")
            .attribute(Attribute::timestamp("time").with_precision(Precision::Seconds))
            .attribute(Attribute::tag("region"))
            .attribute(Attribute::tag("host"))
            .attribute(Attribute::integer("count"))
            .attribute(Attribute::float("value"))
            .attribute(Attribute::text("note"))
            .attribute(Attribute::boolean("ok"))
            .build()
            .unwrap();

        let record = Record::new(schema)
            .set("time", 1_600_000_000.0)
            .unwrap()
            .set("region", "eu west")
            .unwrap()
            .set("host", "a")
            .unwrap()
            .set("count", 3)
            .unwrap()
            .set("value", 0.5)
            .unwrap()
            .set("note", "say \"hi\"")
            .unwrap()
            .set("ok", true)
            .unwrap();

        assert_eq!(
            record.to_line_protocol().unwrap(),
            "cpu\\ load,host=a,region=eu\\ west count=3i,value=0.5,note=\"say \\\"hi\\\"\",ok=true 1600000000"
        );
    }

    #[test]
    fn test_non_finite_field_rejected() {
        let schema = MeasurementSchema::builder("m")
            .attribute(Attribute::float("value"))
            .build()
            .unwrap();
        // Non-finite values never reach a point
        let err = Record::new(schema).set("value", f64::INFINITY).unwrap_err();
        assert!(matches!(err, ConstructionError::InvalidValue { .. }));
    }

    #[test]
    fn test_nanosecond_default_and_null_fields() {
        let schema = MeasurementSchema::builder("m")
            .attribute(Attribute::timestamp("time"))
            .attribute(Attribute::float("a"))
            .attribute(Attribute::float("b"))
            .build()
            .unwrap();

        let record = Record::new(schema.clone()).set("time", 2.0).unwrap().set("b", 1.0).unwrap();
        assert_eq!(record.to_line_protocol().unwrap(), "m b=1 2000000000");

        let err = Record::new(schema).set("time", 2.0).unwrap().to_line_protocol().unwrap_err();
        assert_eq!(err, ConstructionError::NoFields("m".to_string()));
    }
}
