//! Conversions between external errors, infrastructure errors and domain
//! errors.

use busysync_domain::{SourceError, SyncError};
use reqwest::Error as HttpError;

use super::InfraError;

/* -------------------------------------------------------------------------- */
/* reqwest::Error → InfraError */
/* -------------------------------------------------------------------------- */

impl From<HttpError> for InfraError {
    fn from(value: HttpError) -> Self {
        if value.is_timeout() {
            return InfraError::Timeout;
        }

        if value.is_connect() {
            return InfraError::Connect;
        }

        if let Some(status) = value.status() {
            return InfraError::Status {
                status: status.as_u16(),
                body: status.canonical_reason().unwrap_or("unknown status").to_string(),
            };
        }

        if value.is_decode() {
            return InfraError::Decode(value.without_url().to_string());
        }

        if value.is_builder() {
            return InfraError::Config(value.without_url().to_string());
        }

        InfraError::Request(value.without_url().to_string())
    }
}

/* -------------------------------------------------------------------------- */
/* InfraError → domain errors */
/* -------------------------------------------------------------------------- */

impl From<InfraError> for SourceError {
    fn from(value: InfraError) -> Self {
        match value {
            InfraError::Status { status, body } => SourceError::UnexpectedStatus { status, body },
            InfraError::Decode(message) => SourceError::InvalidPayload(message),
            other => SourceError::Unreachable(other.to_string()),
        }
    }
}

impl From<InfraError> for SyncError {
    fn from(value: InfraError) -> Self {
        match value {
            InfraError::Config(message) => SyncError::Config(message),
            other => SyncError::Internal(other.to_string()),
        }
    }
}

/* -------------------------------------------------------------------------- */
/* Tests */
/* -------------------------------------------------------------------------- */
