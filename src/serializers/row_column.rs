//! Column-major pivots of reply data
//!
//! Both forms return `(columns, values)` with `values[i]` holding the whole
//! column `columns[i]`. They differ in how serie tags are carried.

use serde::Serialize;
use serde_json::Value as JsonValue;

use super::{RowDict, SerializeError, Serializer};
use crate::response::{Response, Serie};

pub type RowColumns<C> = (Vec<C>, Vec<Vec<JsonValue>>);

fn pivot(serie: &Serie<'_>, column: usize) -> Vec<JsonValue> {
    serie
        .values()
        .iter()
        .map(|row| row.get(column).cloned().unwrap_or(JsonValue::Null))
        .collect()
}

/// Main serie pivoted, with one trailing column per tag key
#[derive(Debug, Clone, Copy, Default)]
pub struct LegacyRowColumnSerializer;

impl Serializer for LegacyRowColumnSerializer {
    type Output = RowColumns<String>;

    fn convert(&self, response: &Response) -> Result<Self::Output, SerializeError> {
        let Some(serie) = response.main_serie() else {
            return Ok((Vec::new(), Vec::new()));
        };

        let mut columns: Vec<String> = Vec::new();
        let mut values: Vec<Vec<JsonValue>> = Vec::new();

        for (i, name) in serie.columns().into_iter().enumerate() {
            columns.push(name.to_string());
            values.push(pivot(&serie, i));
        }

        let rows = serie.row_count();
        for (key, value) in serie.tags() {
            columns.push(key.clone());
            values.push(vec![value.clone(); rows]);
        }

        Ok((columns, values))
    }
}

/// Column label annotated with the tags of the serie it came from
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnHeader {
    pub name: String,
    pub serie: String,
    pub tags: RowDict,
}

/// Every serie pivoted, same-named columns grouped together across series
#[derive(Debug, Clone, Copy, Default)]
pub struct RowColumnSerializer;

impl Serializer for RowColumnSerializer {
    type Output = RowColumns<ColumnHeader>;

    fn convert(&self, response: &Response) -> Result<Self::Output, SerializeError> {
        if response.main_serie().is_none() {
            return Ok((Vec::new(), Vec::new()));
        }
        let series = response.series().unwrap_or_default();

        let mut names: Vec<&str> = Vec::new();
        for serie in &series {
            for name in serie.columns() {
                if !names.contains(&name) {
                    names.push(name);
                }
            }
        }

        let mut columns = Vec::new();
        let mut values = Vec::new();
        for name in names {
            for serie in &series {
                if let Some(i) = serie.columns().iter().position(|c| *c == name) {
                    columns.push(ColumnHeader {
                        name: name.to_string(),
                        serie: serie.name().to_string(),
                        tags: serie.tags().clone(),
                    });
                    values.push(pivot(serie, i));
                }
            }
        }

        Ok((columns, values))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn grouped() -> Response {
        Response::new(json!({"results":[{"series":[
            {"name":"cpu","tags":{"host":"a"},"columns":["time","value"],"values":[[1,10],[2,11]]},
            {"name":"cpu","tags":{"host":"b"},"columns":["time","value"],"values":[[1,20]]}
        ]}]}))
        .unwrap()
    }

    #[test]
    fn test_legacy_pivot_with_tag_columns() {
        let (columns, values) = LegacyRowColumnSerializer.convert(&grouped()).unwrap();
        assert_eq!(columns, vec!["time", "value", "host"]);
        assert_eq!(values.len(), columns.len());
        assert_eq!(values[0], vec![json!(1), json!(2)]);
        assert_eq!(values[1], vec![json!(10), json!(11)]);
        assert_eq!(values[2], vec![json!("a"), json!("a")]);
        assert!(values.iter().all(|col| col.len() == 2));
    }

    #[test]
    fn test_legacy_pivot_without_tags() {
        let response = Response::new(json!({"results":[{"series":[{"name":"m","columns":["time","value"],"values":[[10,1],[20,2]]}]}]})).unwrap();
        let (columns, values) = LegacyRowColumnSerializer.convert(&response).unwrap();
        assert_eq!(columns, vec!["time", "value"]);
        assert_eq!(values, vec![vec![json!(10), json!(20)], vec![json!(1), json!(2)]]);
    }

    #[test]
    fn test_current_pivot_groups_columns() {
        let (columns, values) = RowColumnSerializer.convert(&grouped()).unwrap();
        let labels: Vec<(&str, &JsonValue)> = columns
            .iter()
            .map(|c| (c.name.as_str(), &c.tags["host"]))
            .collect();
        assert_eq!(
            labels,
            vec![
                ("time", &json!("a")),
                ("time", &json!("b")),
                ("value", &json!("a")),
                ("value", &json!("b")),
            ]
        );
        assert_eq!(values.len(), columns.len());
        assert_eq!(values[2], vec![json!(10), json!(11)]);
        assert_eq!(values[3], vec![json!(20)]);
    }

    #[test]
    fn test_no_main_serie() {
        let response = Response::new(json!({"results":[{"statement_id":0}]})).unwrap();
        assert_eq!(
            LegacyRowColumnSerializer.convert(&response).unwrap(),
            (Vec::<String>::new(), Vec::<Vec<JsonValue>>::new())
        );
        let (columns, values) = RowColumnSerializer.convert(&response).unwrap();
        assert!(columns.is_empty() && values.is_empty());
    }
}
