use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Connection settings for the HTTP transport
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// Base URL of the database, e.g. `http://localhost:8086`
    pub url: String,
    pub database_name: String,
    pub user: Option<String>,
    pub password: Option<String>,
    pub timeout_ms: u64,
}

impl Settings {
    /// Read settings from environment variables
    /// INFLUXDB_URL=http://localhost:8086
    /// INFLUXDB_DATABASE_NAME=default
    /// INFLUXDB_USER=admin
    /// INFLUXDB_PASSWORD=secret
    /// INFLUXDB_TIMEOUT_MS=30000
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            url: std::env::var("INFLUXDB_URL").unwrap_or(defaults.url),
            database_name: std::env::var("INFLUXDB_DATABASE_NAME")
                .unwrap_or(defaults.database_name),
            user: std::env::var("INFLUXDB_USER").ok().filter(|v| !v.is_empty()),
            password: std::env::var("INFLUXDB_PASSWORD").ok().filter(|v| !v.is_empty()),
            timeout_ms: std::env::var("INFLUXDB_TIMEOUT_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.timeout_ms),
        }
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    pub fn with_database(mut self, name: impl Into<String>) -> Self {
        self.database_name = name.into();
        self
    }

    pub fn with_credentials(mut self, user: impl Into<String>, password: impl Into<String>) -> Self {
        self.user = Some(user.into());
        self.password = Some(password.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout_ms = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX);
        self
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            url: "http://localhost:8086".to_string(),
            database_name: "default".to_string(),
            user: None,
            password: None,
            timeout_ms: 30_000,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_overrides() {
        let settings = Settings::default()
            .with_url("http://db:8086")
            .with_database("metrics")
            .with_credentials("admin", "secret")
            .with_timeout(Duration::from_secs(5));

        assert_eq!(settings.url, "http://db:8086");
        assert_eq!(settings.database_name, "metrics");
        assert_eq!(settings.user.as_deref(), Some("admin"));
        assert_eq!(settings.timeout(), Duration::from_secs(5));
    }

    #[test]
    fn test_sub_second_timeout_is_kept() {
        let settings = Settings::default().with_timeout(Duration::from_millis(500));
        assert_eq!(settings.timeout(), Duration::from_millis(500));
        assert_eq!(settings.timeout_ms, 500);
        assert_eq!(Settings::default().timeout(), Duration::from_secs(30));
    }

    #[test]
    fn test_from_env_falls_back_to_defaults() {
        // Only checks variables that tests never set
        let settings = Settings::from_env();
        assert!(!settings.url.is_empty());
        assert!(!settings.database_name.is_empty());
    }
}
