//! Error types for the monitor engine.

use thiserror::Error;

/// Errors surfaced by the monitor engine.
///
/// During normal operation probe failures never appear as errors; they are
/// folded into per-probe results and the reachability aggregate. This type
/// covers startup problems plus the transport classification used when a
/// failed probe is described in the debug log.
#[derive(Debug, Error)]
pub enum MonitorError {
    /// Invalid or unloadable configuration.
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// HTTP-level failure.
    #[error("HTTP request failed: {0}")]
    Http(String),

    /// Connection could not be established.
    #[error("Connection failed: {0}")]
    Connection(String),

    /// Timeout waiting for a response.
    #[error("Request timed out")]
    Timeout,
}

impl From<reqwest::Error> for MonitorError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            MonitorError::Timeout
        } else if err.is_connect() {
            MonitorError::Connection(err.to_string())
        } else {
            MonitorError::Http(err.to_string())
        }
    }
}
