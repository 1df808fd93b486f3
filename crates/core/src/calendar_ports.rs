//! Calendar backend port interfaces

use async_trait::async_trait;
use busysync_domain::{
    BackendError, EventId, ManagedEvent, ReconciliationWindow, Slot, SlotDuration, SlotSet,
};

/// Read/write facade over a calendar, restricted to events this system owns.
///
/// Implementations must only surface events carrying the ownership marker;
/// events created by anyone else sharing the calendar are invisible here.
#[async_trait]
pub trait CalendarMirror: Send + Sync {
    /// Every managed event starting inside `window`, duplicates included.
    async fn list_managed_events(
        &self,
        window: &ReconciliationWindow,
    ) -> Result<Vec<ManagedEvent>, BackendError>;

    /// Create a managed event starting at `slot` and lasting `duration`.
    async fn create_event(&self, slot: Slot, duration: SlotDuration)
        -> Result<EventId, BackendError>;

    /// Delete a managed event.
    ///
    /// Implementations report a missing event as [`BackendError::NotFound`];
    /// callers decide whether that is fatal.
    async fn delete_event(&self, id: &EventId) -> Result<(), BackendError>;

    /// Managed slots inside `window`, one entry per distinct start instant.
    ///
    /// When several events share an instant the last one listed wins. Run the
    /// duplicate collapser first when identifiers must be unambiguous.
    async fn list_managed_slots(
        &self,
        window: &ReconciliationWindow,
    ) -> Result<SlotSet, BackendError> {
        let events = self.list_managed_events(window).await?;
        Ok(events.into_iter().map(|event| (event.slot, event.id)).collect())
    }
}
