//! Declared measurement schemas
//!
//! A [`MeasurementSchema`] lists typed attributes for one measurement. It
//! drives default queries, typed record materialization and line-protocol
//! rendering of points for writes.

pub mod attribute;
pub mod point;
pub mod record;
pub mod schema;

pub use attribute::{Attribute, AttributeKind, Precision, ATTRIBUTE_PREFIX};
pub use record::Record;
pub use schema::{MeasurementSchema, MeasurementSchemaBuilder};
