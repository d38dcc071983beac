//! Error types for the admin client.
//!
//! There is one domain error, [`RequestError`]. Every failed request, whether
//! the server answered non-2xx, the connection broke, or the body did not
//! decode, ends up as one of these and is handled the same way: unlock,
//! notify, leave the rest of the state alone.

use reqwest::StatusCode;
use serde::Deserialize;
use thiserror::Error;

/// Result type for REST operations.
pub type Result<T> = std::result::Result<T, RequestError>;

/// A request that did not produce a usable success body.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct RequestError {
    /// HTTP status, if the server answered at all.
    pub status: Option<u16>,
    /// Operator-facing text, `"<status>: <body>"` for HTTP failures.
    pub message: String,
}

impl RequestError {
    /// Build from a non-2xx response and its body text.
    ///
    /// A JSON error envelope (`{"error":{"codes":[..],"msg":".."}}`) is reduced
    /// to its `msg`; anything else is used as-is.
    pub fn from_response(status: StatusCode, body: &str) -> Self {
        let detail = error_envelope_msg(body).unwrap_or_else(|| body.trim().to_string());
        let message = if detail.is_empty() {
            status.to_string()
        } else {
            format!("{}: {}", status, detail)
        };

        Self {
            status: Some(status.as_u16()),
            message,
        }
    }

    /// Build from a failure that never got a status line (connect, timeout, decode).
    pub fn other(message: impl Into<String>) -> Self {
        Self {
            status: None,
            message: message.into(),
        }
    }
}

impl From<reqwest::Error> for RequestError {
    fn from(err: reqwest::Error) -> Self {
        let message = if err.is_timeout() {
            format!("request timed out: {}", err)
        } else {
            err.to_string()
        };
        Self {
            status: err.status().map(|s| s.as_u16()),
            message,
        }
    }
}

impl From<serde_json::Error> for RequestError {
    fn from(err: serde_json::Error) -> Self {
        Self::other(format!("invalid response body: {}", err))
    }
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    #[serde(default)]
    msg: String,
}

fn error_envelope_msg(body: &str) -> Option<String> {
    let envelope: ErrorEnvelope = serde_json::from_str(body).ok()?;
    let msg = envelope.error.msg.trim();
    (!msg.is_empty()).then(|| msg.to_string())
}

/// Errors from talking to a running [`crate::AdminRuntime`].
#[derive(Debug, Error)]
pub enum RuntimeError {
    /// The runtime loop has stopped and no longer accepts events.
    #[error("admin runtime is closed")]
    Closed,
}
