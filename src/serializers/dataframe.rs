use std::sync::Arc;

use arrow::array::{new_null_array, ArrayRef, BooleanArray, Float64Array, Int64Array, StringArray};
use arrow::datatypes::{DataType as ArrowType, Field, Schema};
use arrow::record_batch::{RecordBatch, RecordBatchOptions};
use serde_json::Value as JsonValue;

use super::{SerializeError, Serializer};
use crate::data::DataType;
use crate::error::ConstructionError;
use crate::response::Response;

/// Main serie as an Arrow record batch, one column per serie column
///
/// Column types are inferred from the cells: integers, floats and booleans
/// map to their Arrow types, mixed or textual columns become UTF-8.
#[derive(Debug, Clone, Copy, Default)]
pub struct DataFrameSerializer;

fn build_column(cells: &[&JsonValue]) -> (ArrowType, ArrayRef) {
    match DataType::infer(cells.iter().copied()) {
        DataType::Null => (ArrowType::Null, new_null_array(&ArrowType::Null, cells.len())),
        DataType::Bool => {
            let array: BooleanArray = cells.iter().map(|c| c.as_bool()).collect();
            (ArrowType::Boolean, Arc::new(array))
        }
        DataType::Int64 => {
            let array: Int64Array = cells.iter().map(|c| c.as_i64()).collect();
            (ArrowType::Int64, Arc::new(array))
        }
        DataType::Float64 => {
            let array: Float64Array = cells.iter().map(|c| c.as_f64()).collect();
            (ArrowType::Float64, Arc::new(array))
        }
        DataType::String => {
            let array: StringArray = cells
                .iter()
                .map(|c| match c {
                    JsonValue::Null => None,
                    JsonValue::String(s) => Some(s.clone()),
                    other => Some(other.to_string()),
                })
                .collect();
            (ArrowType::Utf8, Arc::new(array))
        }
    }
}

impl Serializer for DataFrameSerializer {
    type Output = RecordBatch;

    fn convert(&self, response: &Response) -> Result<Self::Output, SerializeError> {
        let Some(serie) = response.main_serie() else {
            return Ok(RecordBatch::new_empty(Arc::new(Schema::empty())));
        };

        let columns = serie.columns();
        let rows = serie.values();

        for (i, row) in rows.iter().enumerate() {
            if row.len() != columns.len() {
                return Err(ConstructionError::ShapeMismatch {
                    row: i,
                    width: row.len(),
                    columns: columns.len(),
                }
                .into());
            }
        }

        if columns.is_empty() {
            let options = RecordBatchOptions::new().with_row_count(Some(rows.len()));
            return Ok(RecordBatch::try_new_with_options(
                Arc::new(Schema::empty()),
                Vec::new(),
                &options,
            )?);
        }

        let mut fields = Vec::with_capacity(columns.len());
        let mut arrays = Vec::with_capacity(columns.len());
        for (i, name) in columns.iter().enumerate() {
            let cells: Vec<&JsonValue> = rows.iter().map(|row| &row[i]).collect();
            let (data_type, array) = build_column(&cells);
            fields.push(Field::new(*name, data_type, true));
            arrays.push(array);
        }

        Ok(RecordBatch::try_new(Arc::new(Schema::new(fields)), arrays)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arrow::array::Array;
    use serde_json::json;

    #[test]
    fn test_dataframe_from_main_serie() {
        let response = Response::new(json!({"results":[{"series":[{
            "name":"m",
            "columns":["time","value","host","ok"],
            "values":[[10,1.5,"a",true],[20,2,null,false]]
        }]}]}))
        .unwrap();

        let batch = DataFrameSerializer.convert(&response).unwrap();
        assert_eq!(batch.num_rows(), 2);
        assert_eq!(batch.num_columns(), 4);

        let schema = batch.schema();
        assert_eq!(schema.field(0).data_type(), &ArrowType::Int64);
        assert_eq!(schema.field(1).data_type(), &ArrowType::Float64);
        assert_eq!(schema.field(2).data_type(), &ArrowType::Utf8);
        assert_eq!(schema.field(3).data_type(), &ArrowType::Boolean);

        let values = batch.column(1).as_any().downcast_ref::<Float64Array>().unwrap();
        assert_eq!(values.value(1), 2.0);
        assert!(batch.column(2).is_null(1));
    }

    #[test]
    fn test_row_width_mismatch() {
        let response = Response::new(json!({"results":[{"series":[{
            "name":"m","columns":["time","value"],"values":[[10,1],[20]]
        }]}]}))
        .unwrap();

        let err = DataFrameSerializer.convert(&response).unwrap_err();
        assert!(matches!(
            err,
            SerializeError::Construction(ConstructionError::ShapeMismatch { row: 1, width: 1, columns: 2 })
        ));
    }

    #[test]
    fn test_no_main_serie() {
        let batch = DataFrameSerializer.convert(&Response::empty()).unwrap();
        assert_eq!(batch.num_rows(), 0);
        assert_eq!(batch.num_columns(), 0);
    }
}
