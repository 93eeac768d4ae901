//! Influxable: typed InfluxQL queries and reply serializers
//!
//! Build queries from composable expressions and predicates, send them over
//! HTTP, and convert the JSON reply into the shape the caller needs: raw
//! JSON, per-serie rows, column-major pivots, an Arrow record batch, or
//! typed [`measurement::Record`]s validated against a declared schema.
//!
//! # Example
//!
//! ```no_run
//! use influxable::query::{functions, Field, Query};
//! use influxable::serializers::FlatFormattedSerieSerializer;
//! use influxable::transport::{execute, HttpTransport};
//!
//! # async fn run() -> influxable::Result<()> {
//! let query = Query::new()
//!     .select([functions::mean("value").alias("avg")?])
//!     .from_measurement("cpu")
//!     .filter(Field::new("host").eq("server01"))
//!     .group_by_time("1h");
//!
//! // INFLUXDB_URL, INFLUXDB_DATABASE_NAME, ...
//! let transport = HttpTransport::from_env()?;
//! let rows = execute(&transport, &query, &FlatFormattedSerieSerializer).await?;
//! println!("{:?}", rows);
//! # Ok(())
//! # }
//! ```

pub mod data;
pub mod error;
pub mod measurement;
pub mod query;
pub mod response;
pub mod serializers;
pub mod transport;

// Re-export commonly used types
pub use data::{DataType, Value};
pub use error::{ConstructionError, Error, Result};
pub use measurement::{Attribute, MeasurementSchema, Record};
pub use query::{Criteria, Expression, Field, Query};
pub use response::Response;
pub use serializers::Serializer;
