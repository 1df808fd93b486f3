//! Pure diff of desired against observed slots

use busysync_domain::{EventId, Slot, SlotSet};

/// Operations that converge the calendar onto the desired slots.
///
/// `to_create` and `to_delete` are disjoint by construction: a slot is
/// either missing from the observed side or missing from the desired side,
/// never both.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcilePlan {
    /// Desired slots with no managed event, in chronological order.
    pub to_create: Vec<Slot>,
    /// Managed events whose slot is no longer desired, in chronological order.
    pub to_delete: Vec<(Slot, EventId)>,
    /// Observed-only slots that carry no identifier and cannot be deleted.
    pub orphaned: Vec<Slot>,
    /// Slots present on both sides; never touched.
    pub unchanged: usize,
}

impl ReconcilePlan {
    /// True when applying the plan would not mutate the calendar.
    pub fn is_empty(&self) -> bool {
        self.to_create.is_empty() && self.to_delete.is_empty()
    }
}

/// Diff `desired` against `observed`.
pub fn plan(desired: &SlotSet, observed: &SlotSet) -> ReconcilePlan {
    let to_create = desired.difference(observed).slots().collect();

    let mut to_delete = Vec::new();
    let mut orphaned = Vec::new();
    for (slot, id) in observed.difference(desired).iter() {
        match id {
            Some(id) => to_delete.push((slot, id.clone())),
            None => orphaned.push(slot),
        }
    }

    ReconcilePlan { to_create, to_delete, orphaned, unchanged: desired.intersection_len(observed) }
}
