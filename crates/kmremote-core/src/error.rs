//! Client error kinds with actionable suggestions.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::config::ConnectionConfig;

/// Closed set of failure categories for client operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorKind {
    /// No connection could be established.
    Unreachable,
    /// Connecting, reading or writing exceeded its bound.
    Timeout,
    /// Some other I/O failure below HTTP.
    TransportError,
    /// The server answered with a non-2xx status.
    HttpError,
    /// A 2xx answer that failed the operation's own check.
    UnexpectedResponse,
    /// Anything not covered above.
    Unknown,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::Unreachable => write!(f, "UNREACHABLE"),
            ErrorKind::Timeout => write!(f, "TIMEOUT"),
            ErrorKind::TransportError => write!(f, "TRANSPORT_ERROR"),
            ErrorKind::HttpError => write!(f, "HTTP_ERROR"),
            ErrorKind::UnexpectedResponse => write!(f, "UNEXPECTED_RESPONSE"),
            ErrorKind::Unknown => write!(f, "UNKNOWN"),
        }
    }
}

/// A failed client operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientError {
    pub kind: ErrorKind,
    pub message: String,
    pub suggestion: Option<String>,
    /// HTTP status, present for [`ErrorKind::HttpError`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
}

/// Result of a client operation.
pub type Outcome<T> = Result<T, ClientError>;

impl fmt::Display for ClientError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.kind, self.message)?;
        if let Some(suggestion) = &self.suggestion {
            write!(f, " (hint: {})", suggestion)?;
        }
        Ok(())
    }
}

impl std::error::Error for ClientError {}

impl ClientError {
    fn new(kind: ErrorKind, message: String, suggestion: impl Into<String>) -> Self {
        Self {
            kind,
            message,
            suggestion: Some(suggestion.into()),
            status: None,
        }
    }

    pub fn unreachable(authority: &str) -> Self {
        Self::new(
            ErrorKind::Unreachable,
            format!("Cannot connect to Mac at {}", authority),
            "Check that the Mac is awake, Keyboard Maestro's web server is enabled, and the host and port match its settings",
        )
    }

    pub fn timeout(authority: &str) -> Self {
        Self::new(
            ErrorKind::Timeout,
            format!("Request to {} timed out", authority),
            "The server may be busy or the network slow. Try again, or check the connection",
        )
    }

    pub fn transport(detail: impl fmt::Display) -> Self {
        Self::new(
            ErrorKind::TransportError,
            format!("Network error: {}", detail),
            "Check the network connection and whether HTTPS is required by the server",
        )
    }

    /// Non-2xx response. `context` says what was being attempted.
    pub fn http_status(context: &str, status: u16) -> Self {
        let suggestion = if status == 404 {
            "The macro or page was not found. Refresh the macro list and try again"
        } else if status == 401 || status == 403 {
            "The server refused the request. Check the web server's access settings in Keyboard Maestro"
        } else {
            "The server reported an error. Check Keyboard Maestro on the Mac"
        };
        Self {
            status: Some(status),
            ..Self::new(
                ErrorKind::HttpError,
                format!("{}: HTTP {}", context, status),
                suggestion,
            )
        }
    }

    pub fn unexpected_response(detail: impl Into<String>) -> Self {
        Self::new(
            ErrorKind::UnexpectedResponse,
            detail.into(),
            "Something answered at this address, but it is not the Keyboard Maestro web server. Check the host and port",
        )
    }

    pub fn unknown(detail: impl Into<String>) -> Self {
        Self::new(
            ErrorKind::Unknown,
            detail.into(),
            "This is an unexpected error. Please report it if it persists.",
        )
    }

    /// Classify a transport error from reqwest.
    ///
    /// Timeouts are checked before connect failures, so a connect timeout is
    /// reported as [`ErrorKind::Timeout`].
    pub fn from_reqwest(err: &reqwest::Error, config: &ConnectionConfig) -> Self {
        let authority = config.authority();
        if err.is_timeout() {
            Self::timeout(&authority)
        } else if err.is_connect() {
            Self::unreachable(&authority)
        } else if err.is_request() || err.is_body() || err.is_decode() || err.is_redirect() {
            Self::transport(root_cause(err))
        } else {
            Self::unknown(format!("Request to {} failed: {}", authority, err))
        }
    }
}

/// Innermost message of an error chain, which is usually the useful one.
fn root_cause(err: &reqwest::Error) -> String {
    let mut current: &dyn std::error::Error = err;
    while let Some(source) = current.source() {
        current = source;
    }
    current.to_string()
}
