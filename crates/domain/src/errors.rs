//! Error types used throughout the application

use std::fmt;

use thiserror::Error;

use crate::slot::{EventId, Slot};

/// Failure reading the desired state from the busy-slot provider.
#[derive(Error, Debug)]
pub enum SourceError {
    #[error("busy-slot source unreachable: {0}")]
    Unreachable(String),

    #[error("busy-slot source returned status {status}: {body}")]
    UnexpectedStatus { status: u16, body: String },

    #[error("busy-slot source payload could not be parsed: {0}")]
    InvalidPayload(String),

    #[error("busy-slot source reported failure: {0}")]
    Rejected(String),
}

/// Failure talking to the calendar backend.
///
/// `NotFound` is only ever produced by deletes. Callers in the core treat it
/// as an already-satisfied delete.
#[derive(Error, Debug)]
pub enum BackendError {
    #[error("listing calendar events failed: {message}")]
    List { message: String },

    #[error("creating calendar event at {slot} failed: {message}")]
    Create { slot: Slot, message: String },

    #[error("deleting calendar event {id}{} failed: {message}", slot_suffix(.slot))]
    Delete { id: EventId, slot: Option<Slot>, message: String },

    #[error("calendar event {id} not found")]
    NotFound { id: EventId },

    #[error("calendar event {id} could not be interpreted: {message}")]
    InvalidEvent { id: EventId, message: String },
}

impl BackendError {
    /// Whether the backend reported the target event as already gone.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Attach the slot a failed delete was targeting.
    #[must_use]
    pub fn at_slot(self, slot: Slot) -> Self {
        match self {
            Self::Delete { id, message, .. } => Self::Delete { id, slot: Some(slot), message },
            other => other,
        }
    }
}

fn slot_suffix(slot: &Option<Slot>) -> AtSlot<'_> {
    AtSlot(slot.as_ref())
}

struct AtSlot<'a>(Option<&'a Slot>);

impl fmt::Display for AtSlot<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(slot) => write!(f, " at {slot}"),
            None => Ok(()),
        }
    }
}

/// Main error type for busysync
#[derive(Error, Debug)]
pub enum SyncError {
    #[error("Source error: {0}")]
    Source(#[from] SourceError),

    #[error("Backend error: {0}")]
    Backend(#[from] BackendError),

    #[error("duplicate collapse still found duplicates after {passes} passes")]
    CollapseDidNotConverge { passes: u32 },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl SyncError {
    /// Stable label suitable for metrics and structured logs.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Source(_) => "source",
            Self::Backend(_) => "backend",
            Self::CollapseDidNotConverge { .. } => "collapse_not_converged",
            Self::Config(_) => "config",
            Self::Internal(_) => "internal",
        }
    }
}

/// Result type alias for busysync operations
pub type Result<T> = std::result::Result<T, SyncError>;
