//! WHERE clause predicate tree
//!
//! Comparisons are combined with AND/OR. AND binds tighter than OR, so an OR
//! group nested inside an AND is the only thing that needs parentheses.

use chrono::{DateTime, SecondsFormat, Utc};

use super::function::quote_identifier;
use crate::data::Value;
use crate::error::ConstructionError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Eq,
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,
    Matches,
    NotMatches,
}

impl Operator {
    pub fn as_str(&self) -> &'static str {
        match self {
            Operator::Eq => "=",
            Operator::NotEq => "!=",
            Operator::Lt => "<",
            Operator::LtEq => "<=",
            Operator::Gt => ">",
            Operator::GtEq => ">=",
            Operator::Matches => "=~",
            Operator::NotMatches => "!~",
        }
    }
}

/// Right-hand side of a comparison
#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    Value(Value),
    Time(DateTime<Utc>),
    Regex(String),
    /// Rendered verbatim, e.g. `now() - 1h`
    Raw(String),
}

impl Operand {
    pub fn raw(expr: impl Into<String>) -> Self {
        Operand::Raw(expr.into())
    }

    /// Render the literal. Null and non-finite numbers have no literal form.
    pub fn evaluate(&self) -> Result<String, ConstructionError> {
        let rendered = match self {
            Operand::Value(Value::Null) => {
                return Err(ConstructionError::InvalidLiteral(Value::Null.to_string()))
            }
            Operand::Value(Value::Float64(f) | Value::Timestamp(f)) if !f.is_finite() => {
                return Err(ConstructionError::InvalidLiteral(f.to_string()))
            }
            Operand::Value(Value::String(s)) => quote_string(s),
            Operand::Value(Value::Timestamp(secs)) => {
                format!("{}", (secs * 1_000_000_000.0).round() as i64)
            }
            Operand::Value(v) => v.to_string(),
            Operand::Time(t) => quote_string(&t.to_rfc3339_opts(SecondsFormat::AutoSi, true)),
            Operand::Regex(pattern) => format!("/{}/", pattern.replace('/', "\\/")),
            Operand::Raw(expr) => expr.clone(),
        };
        Ok(rendered)
    }
}

fn quote_string(s: &str) -> String {
    format!("'{}'", s.replace('\\', "\\\\").replace('\'', "\\'"))
}

impl From<Value> for Operand {
    fn from(v: Value) -> Self {
        Operand::Value(v)
    }
}

impl From<&str> for Operand {
    fn from(v: &str) -> Self {
        Operand::Value(Value::from(v))
    }
}

impl From<String> for Operand {
    fn from(v: String) -> Self {
        Operand::Value(Value::String(v))
    }
}

impl From<i64> for Operand {
    fn from(v: i64) -> Self {
        Operand::Value(Value::Int64(v))
    }
}

impl From<i32> for Operand {
    fn from(v: i32) -> Self {
        Operand::Value(Value::Int64(v as i64))
    }
}

impl From<f64> for Operand {
    fn from(v: f64) -> Self {
        Operand::Value(Value::Float64(v))
    }
}

impl From<bool> for Operand {
    fn from(v: bool) -> Self {
        Operand::Value(Value::Bool(v))
    }
}

impl From<DateTime<Utc>> for Operand {
    fn from(v: DateTime<Utc>) -> Self {
        Operand::Time(v)
    }
}

/// Left-hand side of a comparison
#[derive(Debug, Clone)]
pub struct Field(String);

impl Field {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    fn compare(&self, operator: Operator, operand: Operand) -> Criteria {
        Criteria::Compare {
            field: self.0.clone(),
            operator,
            operand,
        }
    }

    pub fn eq(&self, v: impl Into<Operand>) -> Criteria {
        self.compare(Operator::Eq, v.into())
    }

    pub fn ne(&self, v: impl Into<Operand>) -> Criteria {
        self.compare(Operator::NotEq, v.into())
    }

    pub fn lt(&self, v: impl Into<Operand>) -> Criteria {
        self.compare(Operator::Lt, v.into())
    }

    pub fn lte(&self, v: impl Into<Operand>) -> Criteria {
        self.compare(Operator::LtEq, v.into())
    }

    pub fn gt(&self, v: impl Into<Operand>) -> Criteria {
        self.compare(Operator::Gt, v.into())
    }

    pub fn gte(&self, v: impl Into<Operand>) -> Criteria {
        self.compare(Operator::GtEq, v.into())
    }

    pub fn matches(&self, pattern: impl Into<String>) -> Criteria {
        self.compare(Operator::Matches, Operand::Regex(pattern.into()))
    }

    pub fn not_matches(&self, pattern: impl Into<String>) -> Criteria {
        self.compare(Operator::NotMatches, Operand::Regex(pattern.into()))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Criteria {
    Compare {
        field: String,
        operator: Operator,
        operand: Operand,
    },
    And(Vec<Criteria>),
    Or(Vec<Criteria>),
}

impl Criteria {
    pub fn and(self, other: Criteria) -> Criteria {
        all([self, other])
    }

    pub fn or(self, other: Criteria) -> Criteria {
        any([self, other])
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Criteria::Compare { .. } => false,
            Criteria::And(children) | Criteria::Or(children) => {
                children.iter().all(Criteria::is_empty)
            }
        }
    }

    pub fn evaluate(&self) -> Result<String, ConstructionError> {
        let rendered = match self {
            Criteria::Compare {
                field,
                operator,
                operand,
            } => format!(
                "{} {} {}",
                quote_identifier(field),
                operator.as_str(),
                operand.evaluate()?
            ),
            Criteria::And(children) => children
                .iter()
                .filter(|c| !c.is_empty())
                .map(|c| match c {
                    Criteria::Or(or) if or.iter().filter(|c| !c.is_empty()).count() > 1 => {
                        Ok(format!("({})", c.evaluate()?))
                    }
                    _ => c.evaluate(),
                })
                .collect::<Result<Vec<_>, _>>()?
                .join(" AND "),
            Criteria::Or(children) => children
                .iter()
                .filter(|c| !c.is_empty())
                .map(Criteria::evaluate)
                .collect::<Result<Vec<_>, _>>()?
                .join(" OR "),
        };
        Ok(rendered)
    }
}

/// Conjunction, flattening nested AND groups
pub fn all(criteria: impl IntoIterator<Item = Criteria>) -> Criteria {
    let mut children = Vec::new();
    for c in criteria {
        match c {
            Criteria::And(nested) => children.extend(nested),
            other => children.push(other),
        }
    }
    Criteria::And(children)
}

/// Disjunction, flattening nested OR groups
pub fn any(criteria: impl IntoIterator<Item = Criteria>) -> Criteria {
    let mut children = Vec::new();
    for c in criteria {
        match c {
            Criteria::Or(nested) => children.extend(nested),
            other => children.push(other),
        }
    }
    Criteria::Or(children)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_literal_quoting() {
        assert_eq!(Field::new("host").eq("server01").evaluate().unwrap(), "host = 'server01'");
        assert_eq!(Field::new("value").gt(3).evaluate().unwrap(), "value > 3");
        assert_eq!(Field::new("value").lte(2.5).evaluate().unwrap(), "value <= 2.5");
        assert_eq!(Field::new("up").ne(true).evaluate().unwrap(), "up != true");
        assert_eq!(
            Field::new("name").eq("o'brien").evaluate().unwrap(),
            "name = 'o\\'brien'"
        );
    }

    #[test]
    fn test_time_operands() {
        let t = Utc.with_ymd_and_hms(2020, 1, 2, 3, 4, 5).unwrap();
        assert_eq!(
            Field::new("time").gte(t).evaluate().unwrap(),
            "time >= '2020-01-02T03:04:05Z'"
        );
        assert_eq!(
            Field::new("time").gt(Operand::raw("now() - 1h")).evaluate().unwrap(),
            "time > now() - 1h"
        );
        assert_eq!(
            Field::new("time").lt(Value::Timestamp(1.5)).evaluate().unwrap(),
            "time < 1500000000"
        );
    }

    #[test]
    fn test_regex_operands() {
        assert_eq!(
            Field::new("host").matches("^web/[0-9]+$").evaluate().unwrap(),
            "host =~ /^web\\/[0-9]+$/"
        );
        assert_eq!(Field::new("host").not_matches("db").evaluate().unwrap(), "host !~ /db/");
    }

    #[test]
    fn test_precedence() {
        let a = Field::new("a").eq(1);
        let b = Field::new("b").eq(2);
        let c = Field::new("c").eq(3);

        let expr = a.clone().or(b.clone()).and(c.clone());
        assert_eq!(expr.evaluate().unwrap(), "(a = 1 OR b = 2) AND c = 3");

        let expr = a.clone().and(b.clone()).or(c.clone());
        assert_eq!(expr.evaluate().unwrap(), "a = 1 AND b = 2 OR c = 3");

        let expr = all([a.clone(), any([b, c])]);
        assert_eq!(expr.evaluate().unwrap(), "a = 1 AND (b = 2 OR c = 3)");

        let expr = any([a]).and(Field::new("d").eq(4));
        assert_eq!(expr.evaluate().unwrap(), "a = 1 AND d = 4");
    }

    #[test]
    fn test_unrenderable_literals_rejected() {
        let err = Field::new("value").eq(Value::Null).evaluate().unwrap_err();
        assert_eq!(err, ConstructionError::InvalidLiteral("NULL".to_string()));

        let err = Field::new("value").gt(f64::INFINITY).evaluate().unwrap_err();
        assert!(matches!(err, ConstructionError::InvalidLiteral(_)));

        let nested = Field::new("a").eq(1).and(Field::new("b").lt(f64::NAN).or(Field::new("c").eq(2)));
        assert!(nested.evaluate().is_err());
    }

    #[test]
    fn test_empty_groups_are_elided() {
        assert!(all(Vec::<Criteria>::new()).is_empty());
        let expr = all([any(Vec::<Criteria>::new()), Field::new("a").eq(1)]);
        assert_eq!(expr.evaluate().unwrap(), "a = 1");
    }
}
