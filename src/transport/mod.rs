//! Narrow contract with the database's HTTP API
//!
//! The core only needs two operations: run a rendered query and get the
//! decoded reply back, and submit a line-protocol batch. Failures are
//! classified once here and propagate unchanged; nothing is retried.

pub mod config;
pub mod http;

pub use config::Settings;
pub use http::HttpTransport;

use std::future::Future;

use crate::error::Result;
use crate::measurement::{Precision, Record};
use crate::query::Query;
use crate::response::Response;
use crate::serializers::Serializer;

#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Bad query: {query}")]
    BadQuery { query: String },

    #[error("Invalid number in points: {points}")]
    InvalidNumber { points: String },

    #[error("Bad request: {params}")]
    BadRequest { params: String },

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("HTTP {status}: {message}")]
    Http { status: u16, message: String },

    #[error("Decode error: {0}")]
    Decode(String),
}

/// What a failed request carried, echoed back in the classified error
#[derive(Debug, Clone, Default)]
pub struct FailedRequest<'a> {
    pub params: Vec<(&'a str, String)>,
    pub query: Option<&'a str>,
    pub points: Option<&'a str>,
}

/// Map a non-success reply onto the error taxonomy
pub fn classify_failure(status: u16, body: &str, request: &FailedRequest<'_>) -> TransportError {
    let message = serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|json| json.get("error").and_then(|e| e.as_str()).map(str::to_string));

    if let Some(message) = &message {
        if message.starts_with("error parsing query") {
            return TransportError::BadQuery {
                query: request.query.unwrap_or_default().to_string(),
            };
        }
        if message.ends_with("invalid number") {
            return TransportError::InvalidNumber {
                points: request.points.unwrap_or_default().to_string(),
            };
        }
    }

    let message = message.unwrap_or_else(|| body.to_string());
    match status {
        400 => TransportError::BadRequest {
            params: request
                .params
                .iter()
                .map(|(k, v)| format!("{}={}", k, v))
                .collect::<Vec<_>>()
                .join("&"),
        },
        401 => TransportError::Unauthorized(message),
        _ => TransportError::Http { status, message },
    }
}

pub trait Transport {
    /// Run a rendered query and return the decoded reply
    fn query(
        &self,
        query: &str,
    ) -> impl Future<Output = std::result::Result<serde_json::Value, TransportError>> + Send;

    /// Submit newline-separated line-protocol points
    fn write(
        &self,
        points: &str,
        precision: Precision,
    ) -> impl Future<Output = std::result::Result<(), TransportError>> + Send;
}

/// Render, send, wrap and convert in one go
pub async fn execute<T, S>(transport: &T, query: &Query, serializer: &S) -> Result<S::Output>
where
    T: Transport,
    S: Serializer,
{
    let text = query.evaluate()?;
    let raw = transport.query(&text).await?;
    let response = Response::new(raw)?;
    Ok(serializer.convert(&response)?)
}

/// Write records, one request per timestamp precision in use
pub async fn write_records<T: Transport>(transport: &T, records: &[Record]) -> Result<()> {
    let mut batches: Vec<(Precision, Vec<String>)> = Vec::new();
    for record in records {
        let precision = record
            .schema()
            .timestamp_attribute()
            .and_then(|a| a.precision)
            .unwrap_or_default();
        let line = record.to_line_protocol()?;
        match batches.iter_mut().find(|(p, _)| *p == precision) {
            Some((_, lines)) => lines.push(line),
            None => batches.push((precision, vec![line])),
        }
    }

    for (precision, lines) in batches {
        transport.write(&lines.join("\n"), precision).await?;
    }
    Ok(())
}
