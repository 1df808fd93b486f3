use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use busysync_core::BusySlotSource;
use busysync_domain::{ReconciliationWindow, Slot, SlotSet, SourceError};

/// Busy-slot source returning a fixed, replaceable set of slots.
#[derive(Default, Clone)]
pub struct StaticBusySource {
    slots: Arc<Mutex<SlotSet>>,
    failing: Arc<Mutex<bool>>,
}

impl StaticBusySource {
    pub fn new(slots: &[Slot]) -> Self {
        let source = Self::default();
        source.set(slots);
        source
    }

    pub fn set(&self, slots: &[Slot]) {
        *self.slots.lock().unwrap() = slots.iter().copied().collect();
    }

    pub fn fail(&self, failing: bool) {
        *self.failing.lock().unwrap() = failing;
    }
}

#[async_trait]
impl BusySlotSource for StaticBusySource {
    async fn fetch_busy_slots(
        &self,
        window: &ReconciliationWindow,
    ) -> Result<SlotSet, SourceError> {
        if *self.failing.lock().unwrap() {
            return Err(SourceError::Unreachable("connection refused".into()));
        }

        let mut slots = self.slots.lock().unwrap().clone();
        slots.retain(|slot| window.contains(slot));
        Ok(slots)
    }
}
