use super::function::{quote_identifier, Expression};
use super::predicate::{all, Criteria};
use crate::error::ConstructionError;
use crate::measurement::MeasurementSchema;

/// Sort direction of the ORDER BY time clause
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Order {
    Asc,
    Desc,
}

/// Policy for empty GROUP BY time intervals
#[derive(Debug, Clone, PartialEq)]
pub enum Fill {
    Null,
    None,
    Previous,
    Linear,
    Value(f64),
}

impl Fill {
    fn evaluate(&self) -> Result<String, ConstructionError> {
        let rendered = match self {
            Fill::Null => "fill(null)".to_string(),
            Fill::None => "fill(none)".to_string(),
            Fill::Previous => "fill(previous)".to_string(),
            Fill::Linear => "fill(linear)".to_string(),
            Fill::Value(v) if !v.is_finite() => {
                return Err(ConstructionError::InvalidLiteral(v.to_string()))
            }
            Fill::Value(v) => format!("fill({})", v),
        };
        Ok(rendered)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum GroupBy {
    /// `time(interval[, offset])`
    Time {
        interval: String,
        offset: Option<String>,
    },
    /// Tag key, or `*` for every tag
    Tag(String),
}

impl GroupBy {
    fn evaluate(&self) -> String {
        match self {
            GroupBy::Time {
                interval,
                offset: Some(offset),
            } => format!("time({}, {})", interval, offset),
            GroupBy::Time {
                interval,
                offset: None,
            } => format!("time({})", interval),
            GroupBy::Tag(tag) if tag == "*" => tag.clone(),
            GroupBy::Tag(tag) => quote_identifier(tag),
        }
    }
}

/// Chainable SELECT statement builder
///
/// Clauses are rendered in the dialect's fixed order; optional clauses that
/// were never set are left out entirely.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Query {
    selection: Vec<Expression>,
    into: Option<String>,
    measurements: Vec<String>,
    criteria: Vec<Criteria>,
    group_by: Vec<GroupBy>,
    fill: Option<Fill>,
    order: Option<Order>,
    limit: Option<usize>,
    offset: Option<usize>,
    slimit: Option<usize>,
    soffset: Option<usize>,
    tz: Option<String>,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add target expressions. Nothing selected renders `*`.
    pub fn select<E: Into<Expression>>(mut self, exprs: impl IntoIterator<Item = E>) -> Self {
        self.selection.extend(exprs.into_iter().map(Into::into));
        self
    }

    pub fn into_measurement(mut self, target: impl Into<String>) -> Self {
        self.into = Some(target.into());
        self
    }

    pub fn from_measurement(mut self, name: impl Into<String>) -> Self {
        self.measurements.push(name.into());
        self
    }

    /// Read from a declared schema's measurement; the schema is only borrowed.
    pub fn from_schema(self, schema: &MeasurementSchema) -> Self {
        self.from_measurement(schema.measurement_name())
    }

    /// Add a predicate; successive calls are ANDed
    pub fn filter(mut self, criteria: Criteria) -> Self {
        self.criteria.push(criteria);
        self
    }

    pub fn group_by(mut self, tag: impl Into<String>) -> Self {
        self.group_by.push(GroupBy::Tag(tag.into()));
        self
    }

    pub fn group_by_time(mut self, interval: impl Into<String>) -> Self {
        self.group_by.push(GroupBy::Time {
            interval: interval.into(),
            offset: None,
        });
        self
    }

    pub fn group_by_time_offset(
        mut self,
        interval: impl Into<String>,
        offset: impl Into<String>,
    ) -> Self {
        self.group_by.push(GroupBy::Time {
            interval: interval.into(),
            offset: Some(offset.into()),
        });
        self
    }

    pub fn fill(mut self, fill: Fill) -> Self {
        self.fill = Some(fill);
        self
    }

    pub fn order_asc(mut self) -> Self {
        self.order = Some(Order::Asc);
        self
    }

    pub fn order_desc(mut self) -> Self {
        self.order = Some(Order::Desc);
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn offset(mut self, offset: usize) -> Self {
        self.offset = Some(offset);
        self
    }

    pub fn slimit(mut self, slimit: usize) -> Self {
        self.slimit = Some(slimit);
        self
    }

    pub fn soffset(mut self, soffset: usize) -> Self {
        self.soffset = Some(soffset);
        self
    }

    pub fn tz(mut self, zone: impl Into<String>) -> Self {
        self.tz = Some(zone.into());
        self
    }

    /// Render the full statement
    pub fn evaluate(&self) -> Result<String, ConstructionError> {
        if self.measurements.is_empty() {
            return Err(ConstructionError::MissingSource);
        }

        let mut clauses = Vec::new();

        let selection = if self.selection.is_empty() {
            "*".to_string()
        } else {
            self.selection
                .iter()
                .map(Expression::evaluate)
                .collect::<Vec<_>>()
                .join(", ")
        };
        clauses.push(format!("SELECT {}", selection));

        if let Some(into) = &self.into {
            clauses.push(format!("INTO {}", quote_identifier(into)));
        }

        let sources = self
            .measurements
            .iter()
            .map(|m| quote_identifier(m))
            .collect::<Vec<_>>()
            .join(", ");
        clauses.push(format!("FROM {}", sources));

        let criteria = all(self.criteria.iter().cloned());
        if !criteria.is_empty() {
            clauses.push(format!("WHERE {}", criteria.evaluate()?));
        }

        if !self.group_by.is_empty() {
            let fields = self
                .group_by
                .iter()
                .map(GroupBy::evaluate)
                .collect::<Vec<_>>()
                .join(", ");
            clauses.push(format!("GROUP BY {}", fields));

            if let Some(fill) = &self.fill {
                clauses.push(fill.evaluate()?);
            }
        }

        match self.order {
            Some(Order::Asc) => clauses.push("ORDER BY time ASC".to_string()),
            Some(Order::Desc) => clauses.push("ORDER BY time DESC".to_string()),
            None => {}
        }

        if let Some(limit) = self.limit {
            clauses.push(format!("LIMIT {}", limit));
        }
        if let Some(offset) = self.offset {
            clauses.push(format!("OFFSET {}", offset));
        }
        if let Some(slimit) = self.slimit {
            clauses.push(format!("SLIMIT {}", slimit));
        }
        if let Some(soffset) = self.soffset {
            clauses.push(format!("SOFFSET {}", soffset));
        }
        if let Some(tz) = &self.tz {
            clauses.push(format!("tz('{}')", tz.replace('\'', "\\'")));
        }

        let query = clauses.join(" ");
        tracing::trace!(query = %query, "Rendered query");
        Ok(query)
    }

    pub fn build(&self) -> Result<String, ConstructionError> {
        self.evaluate()
    }
}
