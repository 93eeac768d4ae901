//! Error taxonomy shared across the crate

use crate::response::ResponseError;
use crate::serializers::SerializeError;
use crate::transport::TransportError;

/// A malformed expression, query, schema declaration or point
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConstructionError {
    #[error("Invalid alias: {0:?}")]
    InvalidAlias(String),

    #[error("Function {0} requires at least one field")]
    MissingField(String),

    #[error("Query has no FROM source")]
    MissingSource,

    #[error("Measurement name must not be empty")]
    EmptyMeasurementName,

    #[error("Attribute name must not be empty")]
    EmptyAttributeName,

    #[error("Duplicate attribute: {0}")]
    DuplicateAttribute(String),

    #[error("Only one timestamp attribute is allowed, found {0} and {1}")]
    MultipleTimestamps(String, String),

    #[error("Unknown attribute {attribute} on measurement {measurement}")]
    UnknownAttribute {
        measurement: String,
        attribute: String,
    },

    #[error("Literal {0} has no representation in a query or point")]
    InvalidLiteral(String),

    #[error("Value {value} does not fit attribute {attribute}")]
    InvalidValue { attribute: String, value: String },

    #[error("Row {row} has {width} values but there are {columns} columns")]
    ShapeMismatch {
        row: usize,
        width: usize,
        columns: usize,
    },

    #[error("Point for measurement {0} has no field values")]
    NoFields(String),
}

/// Crate-level error
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Construction error: {0}")]
    Construction(#[from] ConstructionError),

    #[error("Response error: {0}")]
    Response(#[from] ResponseError),

    #[error("Serialize error: {0}")]
    Serialize(#[from] SerializeError),

    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),
}

pub type Result<T> = std::result::Result<T, Error>;
