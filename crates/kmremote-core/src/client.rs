//! HTTP client for the Keyboard Maestro web server.
//!
//! Each operation sends exactly one `GET` and resolves to an [`Outcome`].
//! There are no retries, no caches and no background tasks. Dropping a
//! returned future abandons the request and releases its connection.

use std::time::Duration;

use reqwest::Response;
use tracing::{debug, warn};

use crate::catalog::parse_catalog;
use crate::config::ConnectionConfig;
use crate::error::{ClientError, Outcome};
use crate::macros::MacroDescriptor;

/// Text the server's root page contains; used to tell it apart from other
/// services listening on the same address.
pub const SERVER_MARKER: &str = "Keyboard Maestro Server";

/// Default bound for each transport phase.
pub const DEFAULT_PHASE_TIMEOUT: Duration = Duration::from_secs(10);

const USER_AGENT: &str = concat!("kmremote/", env!("CARGO_PKG_VERSION"));

/// Per-phase transport bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransportTimeouts {
    /// Establishing the TCP (and TLS) connection.
    pub connect: Duration,
    /// Each read or write once connected.
    pub io: Duration,
}

impl Default for TransportTimeouts {
    fn default() -> Self {
        Self {
            connect: DEFAULT_PHASE_TIMEOUT,
            io: DEFAULT_PHASE_TIMEOUT,
        }
    }
}

impl TransportTimeouts {
    /// Upper bound for a whole request, covering writes that reqwest does not
    /// time individually.
    fn request(&self) -> Duration {
        self.connect + self.io
    }
}

/// Client for probing the server, listing macros and triggering them.
///
/// Cloning is cheap and clones share one connection pool. The pool keeps no
/// cookies or credentials, so calls cannot influence each other.
#[derive(Debug, Clone)]
pub struct RemoteClient {
    http: reqwest::Client,
    timeouts: TransportTimeouts,
}

impl RemoteClient {
    pub fn new() -> Outcome<Self> {
        Self::with_timeouts(TransportTimeouts::default())
    }

    pub fn with_timeouts(timeouts: TransportTimeouts) -> Outcome<Self> {
        let http = reqwest::Client::builder()
            .connect_timeout(timeouts.connect)
            .read_timeout(timeouts.io)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| ClientError::unknown(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self { http, timeouts })
    }

    pub fn timeouts(&self) -> TransportTimeouts {
        self.timeouts
    }

    /// Check that the server is reachable and is Keyboard Maestro.
    pub async fn probe(&self, config: &ConnectionConfig) -> Outcome<bool> {
        let response = self.get(config, &config.catalog_url()).await?;
        let status = response.status();
        if !status.is_success() {
            return Err(failed(ClientError::http_status(
                "Connection failed",
                status.as_u16(),
            )));
        }

        let body = read_body(config, response).await?;
        if body.contains(SERVER_MARKER) {
            Ok(true)
        } else {
            Err(failed(ClientError::unexpected_response(format!(
                "Unexpected response from server at {}",
                config.authority()
            ))))
        }
    }

    /// Fetch the control page and scan it for macros.
    ///
    /// An empty list is a success.
    pub async fn list_macros(&self, config: &ConnectionConfig) -> Outcome<Vec<MacroDescriptor>> {
        let response = self.get(config, &config.catalog_url()).await?;
        let status = response.status();
        if !status.is_success() {
            return Err(failed(ClientError::http_status(
                "Failed to get macros",
                status.as_u16(),
            )));
        }

        let html = read_body(config, response).await?;
        Ok(parse_catalog(&html))
    }

    /// Trigger a macro by id.
    pub async fn execute_macro(&self, config: &ConnectionConfig, macro_id: &str) -> Outcome<bool> {
        if macro_id.trim().is_empty() {
            return Err(failed(ClientError::unknown("Macro id must not be empty")));
        }

        let response = self.get(config, &config.execute_url(macro_id)).await?;
        let status = response.status();
        if status.is_success() {
            Ok(true)
        } else {
            Err(failed(ClientError::http_status(
                "Failed to execute macro",
                status.as_u16(),
            )))
        }
    }

    async fn get(&self, config: &ConnectionConfig, url: &str) -> Outcome<Response> {
        debug!("GET {}", url);
        let response = self
            .http
            .get(url)
            .timeout(self.timeouts.request())
            .send()
            .await
            .map_err(|e| failed(ClientError::from_reqwest(&e, config)))?;
        debug!("{} -> {}", url, response.status());
        Ok(response)
    }
}

async fn read_body(config: &ConnectionConfig, response: Response) -> Outcome<String> {
    let body = response
        .text()
        .await
        .map_err(|e| failed(ClientError::from_reqwest(&e, config)))?;
    debug!("Read {} bytes from {}", body.len(), config.authority());
    Ok(body)
}

fn failed(err: ClientError) -> ClientError {
    warn!("{}", err);
    err
}
