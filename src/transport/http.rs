use reqwest::{RequestBuilder, Url};

use super::{classify_failure, FailedRequest, Settings, Transport, TransportError};
use crate::measurement::Precision;

/// reqwest-backed transport against the `/query` and `/write` endpoints
#[derive(Debug, Clone)]
pub struct HttpTransport {
    http_client: reqwest::Client,
    base_url: Url,
    settings: Settings,
}

fn map_send_error(e: reqwest::Error) -> TransportError {
    if e.is_builder() {
        TransportError::InvalidUrl(e.to_string())
    } else {
        TransportError::Connection(e.to_string())
    }
}

impl HttpTransport {
    pub fn new(settings: Settings) -> Result<Self, TransportError> {
        let base_url = Url::parse(&settings.url)
            .map_err(|e| TransportError::InvalidUrl(format!("{}: {}", settings.url, e)))?;
        if base_url.cannot_be_a_base() {
            return Err(TransportError::InvalidUrl(settings.url.clone()));
        }

        let http_client = reqwest::Client::builder()
            .timeout(settings.timeout())
            .build()
            .map_err(|e| TransportError::Connection(e.to_string()))?;

        Ok(Self {
            http_client,
            base_url,
            settings,
        })
    }

    pub fn from_env() -> Result<Self, TransportError> {
        Self::new(Settings::from_env())
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Base URL with `path` appended as a final segment
    pub fn endpoint(&self, path: &str) -> Result<Url, TransportError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| TransportError::InvalidUrl(self.settings.url.clone()))?
            .pop_if_empty()
            .push(path);
        Ok(url)
    }

    fn authenticate(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.settings.user {
            Some(user) => request.basic_auth(user, self.settings.password.as_ref()),
            None => request,
        }
    }

    /// Send and return the body of a successful reply
    async fn send(
        &self,
        request: RequestBuilder,
        failed: FailedRequest<'_>,
    ) -> Result<String, TransportError> {
        let response = self
            .authenticate(request)
            .send()
            .await
            .map_err(map_send_error)?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| TransportError::Decode(e.to_string()))?;

        if !status.is_success() {
            let err = classify_failure(status.as_u16(), &body, &failed);
            tracing::warn!(status = status.as_u16(), error = %err, "Request failed");
            return Err(err);
        }
        Ok(body)
    }

    /// Check that the server answers `/ping`
    pub async fn ping(&self) -> Result<bool, TransportError> {
        let response = self
            .http_client
            .get(self.endpoint("ping")?)
            .send()
            .await
            .map_err(map_send_error)?;
        Ok(response.status().is_success())
    }
}

impl Transport for HttpTransport {
    async fn query(&self, query: &str) -> Result<serde_json::Value, TransportError> {
        let params = vec![
            ("db", self.settings.database_name.clone()),
            ("q", query.to_string()),
            ("epoch", Precision::Nanoseconds.as_str().to_string()),
        ];
        tracing::debug!(db = %self.settings.database_name, query, "Sending query");

        let request = self.http_client.get(self.endpoint("query")?).query(&params);
        let failed = FailedRequest {
            params,
            query: Some(query),
            points: None,
        };
        let body = self.send(request, failed).await?;

        serde_json::from_str(&body).map_err(|e| TransportError::Decode(e.to_string()))
    }

    async fn write(&self, points: &str, precision: Precision) -> Result<(), TransportError> {
        let params = vec![
            ("db", self.settings.database_name.clone()),
            ("precision", precision.as_str().to_string()),
        ];
        tracing::debug!(
            db = %self.settings.database_name,
            lines = points.lines().count(),
            "Writing points"
        );

        let request = self
            .http_client
            .post(self.endpoint("write")?)
            .query(&params)
            .body(points.to_string());
        let failed = FailedRequest {
            params,
            query: None,
            points: Some(points),
        };
        self.send(request, failed).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_invalid_url() {
        let err = HttpTransport::new(Settings::default().with_url("localhost-without-scheme")).unwrap_err();
        assert!(matches!(err, TransportError::InvalidUrl(_)));

        let err = HttpTransport::new(Settings::default().with_url("mailto:someone")).unwrap_err();
        assert!(matches!(err, TransportError::InvalidUrl(_)));
    }

    #[test]
    fn test_endpoint_keeps_base_path() {
        let transport = HttpTransport::new(Settings::default().with_url("http://db:8086")).unwrap();
        assert_eq!(transport.endpoint("query").unwrap().as_str(), "http://db:8086/query");

        let transport = HttpTransport::new(Settings::default().with_url("http://proxy/influx/")).unwrap();
        assert_eq!(transport.endpoint("write").unwrap().as_str(), "http://proxy/influx/write");
    }

    #[tokio::test]
    async fn test_unreachable_server_is_a_connection_error() {
        // Port 9 (discard) is closed on test machines
        let settings = Settings::default()
            .with_url("http://127.0.0.1:9")
            .with_timeout(std::time::Duration::from_secs(2));
        let transport = HttpTransport::new(settings).unwrap();
        let err = transport.query("SELECT * FROM m").await.unwrap_err();
        assert!(matches!(err, TransportError::Connection(_)));
    }
}
