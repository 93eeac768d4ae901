//! Attribute descriptors for declared measurements

use chrono::DateTime;
use serde::{Deserialize, Serialize};

use crate::data::Value;

/// Prefix that keeps attribute keys clear of accessor names
pub const ATTRIBUTE_PREFIX: &str = "__attribute__";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttributeKind {
    Text,
    Integer,
    Float,
    Boolean,
    Timestamp,
    Tag,
}

/// Time unit of a timestamp
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Precision {
    #[serde(rename = "h")]
    Hours,
    #[serde(rename = "m")]
    Minutes,
    #[serde(rename = "s")]
    Seconds,
    #[serde(rename = "ms")]
    Milliseconds,
    #[serde(rename = "u")]
    Microseconds,
    #[default]
    #[serde(rename = "ns")]
    Nanoseconds,
}

impl Precision {
    /// Unit name as used by the HTTP API
    pub fn as_str(&self) -> &'static str {
        match self {
            Precision::Hours => "h",
            Precision::Minutes => "m",
            Precision::Seconds => "s",
            Precision::Milliseconds => "ms",
            Precision::Microseconds => "u",
            Precision::Nanoseconds => "ns",
        }
    }

    pub fn parse(unit: &str) -> Option<Self> {
        match unit {
            "h" => Some(Precision::Hours),
            "m" => Some(Precision::Minutes),
            "s" => Some(Precision::Seconds),
            "ms" => Some(Precision::Milliseconds),
            "u" | "us" => Some(Precision::Microseconds),
            "ns" => Some(Precision::Nanoseconds),
            _ => None,
        }
    }

    /// How many units make up one second
    pub fn per_second(&self) -> f64 {
        match self {
            Precision::Hours => 1.0 / 3600.0,
            Precision::Minutes => 1.0 / 60.0,
            Precision::Seconds => 1.0,
            Precision::Milliseconds => 1_000.0,
            Precision::Microseconds => 1_000_000.0,
            Precision::Nanoseconds => 1_000_000_000.0,
        }
    }
}

/// One declared attribute of a measurement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attribute {
    pub name: String,
    pub kind: AttributeKind,
    pub nullable: bool,
    /// Only meaningful for timestamp attributes
    pub precision: Option<Precision>,
}

impl Attribute {
    pub fn new(name: impl Into<String>, kind: AttributeKind) -> Self {
        Self {
            name: name.into(),
            kind,
            nullable: true,
            precision: if kind == AttributeKind::Timestamp {
                Some(Precision::default())
            } else {
                None
            },
        }
    }

    pub fn text(name: impl Into<String>) -> Self {
        Self::new(name, AttributeKind::Text)
    }

    pub fn integer(name: impl Into<String>) -> Self {
        Self::new(name, AttributeKind::Integer)
    }

    pub fn float(name: impl Into<String>) -> Self {
        Self::new(name, AttributeKind::Float)
    }

    pub fn boolean(name: impl Into<String>) -> Self {
        Self::new(name, AttributeKind::Boolean)
    }

    pub fn timestamp(name: impl Into<String>) -> Self {
        Self::new(name, AttributeKind::Timestamp)
    }

    pub fn tag(name: impl Into<String>) -> Self {
        Self::new(name, AttributeKind::Tag)
    }

    pub fn not_null(mut self) -> Self {
        self.nullable = false;
        self
    }

    pub fn with_precision(mut self, precision: Precision) -> Self {
        self.precision = Some(precision);
        self
    }

    /// Namespaced key, e.g. `__attribute__time`
    pub fn key(&self) -> String {
        format!("{}{}", ATTRIBUTE_PREFIX, self.name)
    }

    pub fn is_timestamp(&self) -> bool {
        self.kind == AttributeKind::Timestamp
    }

    pub fn is_tag(&self) -> bool {
        self.kind == AttributeKind::Tag
    }

    /// Coerce a reply cell into this attribute's kind.
    ///
    /// Returns `None` when the cell cannot represent the kind. Null passes
    /// through; nullability is the caller's concern.
    pub fn coerce(&self, cell: &serde_json::Value) -> Option<Value> {
        use serde_json::Value as Json;

        if cell.is_null() {
            return Some(Value::Null);
        }

        match self.kind {
            AttributeKind::Text | AttributeKind::Tag => match cell {
                Json::String(s) => Some(Value::String(s.clone())),
                Json::Number(n) => Some(Value::String(n.to_string())),
                Json::Bool(b) => Some(Value::String(b.to_string())),
                _ => None,
            },
            AttributeKind::Integer => match cell {
                Json::Number(n) => n.as_i64().map(Value::Int64).or_else(|| {
                    n.as_f64()
                        .filter(|f| f.fract() == 0.0)
                        .map(|f| Value::Int64(f as i64))
                }),
                Json::String(s) => s.parse().ok().map(Value::Int64),
                _ => None,
            },
            AttributeKind::Float => match cell {
                Json::Number(n) => n.as_f64().map(Value::Float64),
                Json::String(s) => s.parse().ok().map(Value::Float64),
                _ => None,
            },
            AttributeKind::Boolean => match cell {
                Json::Bool(b) => Some(Value::Bool(*b)),
                Json::String(s) => s.parse().ok().map(Value::Bool),
                _ => None,
            },
            AttributeKind::Timestamp => match cell {
                Json::Number(n) => n.as_f64().map(Value::Timestamp),
                Json::String(s) => DateTime::parse_from_rfc3339(s).ok().map(|t| {
                    Value::Timestamp(
                        t.timestamp() as f64 + t.timestamp_subsec_nanos() as f64 / 1e9,
                    )
                }),
                _ => None,
            },
        }
    }
}
