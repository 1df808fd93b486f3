//! Busy-slot provider port interface

use async_trait::async_trait;
use busysync_domain::{ReconciliationWindow, SlotSet, SourceError};

/// Provider of the externally busy instants (the desired state).
///
/// Adapters own authentication and payload translation. They return only
/// slots inside `window` and never attach event identifiers.
#[async_trait]
pub trait BusySlotSource: Send + Sync {
    async fn fetch_busy_slots(&self, window: &ReconciliationWindow)
        -> Result<SlotSet, SourceError>;
}
