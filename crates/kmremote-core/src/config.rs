//! Connection settings and endpoint derivation.
//!
//! [`ConnectionSettings`] holds raw values as a user typed them. The only way
//! to get a [`ConnectionConfig`] is to validate them, so every client call
//! works against a host, port and timeout that already passed the checks.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default server address.
pub const DEFAULT_HOST: &str = "192.168.1.100";

/// Default server port.
pub const DEFAULT_PORT: u32 = 1234;

/// Default user-facing timeout in milliseconds.
pub const DEFAULT_TIMEOUT_MS: i64 = 5000;

/// Path of the macro trigger endpoint on the server.
const EXECUTE_PATH: &str = "/action.html";

/// Reasons a set of connection settings is rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("host must not be blank")]
    BlankHost,
    #[error("port {0} is out of range (expected 1-65535)")]
    PortOutOfRange(u32),
    #[error("timeout must be positive, got {0} ms")]
    NonPositiveTimeout(i64),
}

/// Unvalidated connection values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConnectionSettings {
    pub host: String,
    pub port: u32,
    pub timeout_ms: i64,
    pub use_https: bool,
}

impl Default for ConnectionSettings {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            timeout_ms: DEFAULT_TIMEOUT_MS,
            use_https: false,
        }
    }
}

impl ConnectionSettings {
    pub fn new(host: impl Into<String>, port: u32, timeout_ms: i64, use_https: bool) -> Self {
        Self {
            host: host.into(),
            port,
            timeout_ms,
            use_https,
        }
    }

    pub fn is_valid(&self) -> bool {
        self.validate().is_ok()
    }

    /// Check every field and build an immutable [`ConnectionConfig`].
    ///
    /// Checks run in field order, so the first problem found is reported.
    pub fn validate(&self) -> Result<ConnectionConfig, ConfigError> {
        let host = self.host.trim();
        if host.is_empty() {
            return Err(ConfigError::BlankHost);
        }

        let port = match u16::try_from(self.port) {
            Ok(port) if port != 0 => port,
            _ => return Err(ConfigError::PortOutOfRange(self.port)),
        };

        let timeout_ms = match u64::try_from(self.timeout_ms) {
            Ok(ms) if ms > 0 => ms,
            _ => return Err(ConfigError::NonPositiveTimeout(self.timeout_ms)),
        };

        Ok(ConnectionConfig {
            host: host.to_string(),
            port,
            timeout: Duration::from_millis(timeout_ms),
            use_https: self.use_https,
        })
    }

    /// Validate, falling back to the defaults when any field is invalid.
    pub fn validate_or_default(&self) -> ConnectionConfig {
        match self.validate() {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!("Invalid connection settings ({}), using defaults", e);
                ConnectionConfig::default()
            }
        }
    }
}

/// Validated, immutable description of how to reach the server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionConfig {
    host: String,
    port: u16,
    timeout: Duration,
    use_https: bool,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT as u16,
            timeout: Duration::from_millis(DEFAULT_TIMEOUT_MS as u64),
            use_https: false,
        }
    }
}

impl ConnectionConfig {
    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    /// User-facing timeout. Transport phases use their own bounds.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn use_https(&self) -> bool {
        self.use_https
    }

    pub fn scheme(&self) -> &'static str {
        if self.use_https {
            "https"
        } else {
            "http"
        }
    }

    /// `host:port`, as shown in connection error messages. IPv6 literals are
    /// bracketed.
    pub fn authority(&self) -> String {
        if self.host.contains(':') && !self.host.starts_with('[') {
            format!("[{}]:{}", self.host, self.port)
        } else {
            format!("{}:{}", self.host, self.port)
        }
    }

    pub fn base_url(&self) -> String {
        format!("{}://{}", self.scheme(), self.authority())
    }

    /// The root page, which embeds the macro picker.
    pub fn catalog_url(&self) -> String {
        format!("{}/", self.base_url())
    }

    /// Trigger URL for a macro.
    ///
    /// The id is percent-encoded; UUID-style ids and plain names pass
    /// through unchanged.
    pub fn execute_url(&self, macro_id: &str) -> String {
        format!(
            "{}{}?macro={}",
            self.base_url(),
            EXECUTE_PATH,
            urlencoding::encode(macro_id)
        )
    }
}
