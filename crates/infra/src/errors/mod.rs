//! Infrastructure error types

mod conversions;

use thiserror::Error;

/// Failure of an outbound call, before it is attributed to a source or the
/// calendar backend.
#[derive(Debug, Error)]
pub enum InfraError {
    #[error("HTTP request timed out")]
    Timeout,

    #[error("HTTP connection failure")]
    Connect,

    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("authentication failed: {0}")]
    Auth(String),

    #[error("response could not be decoded: {0}")]
    Decode(String),

    #[error("HTTP request failed: {0}")]
    Request(String),

    #[error("invalid client configuration: {0}")]
    Config(String),
}

impl InfraError {
    /// HTTP status carried by the error, if the server answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}
