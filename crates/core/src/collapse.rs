//! Duplicate collapsing
//!
//! Retried creates and overlapping passes can leave several managed events at
//! the same instant. [`DuplicateCollapser`] deletes all but one of them.

use std::collections::BTreeMap;
use std::sync::Arc;

use busysync_domain::{
    constants::DEFAULT_MAX_COLLAPSE_PASSES, EventId, ManagedEvent, ReconciliationWindow, Result,
    Slot, SyncError,
};
use tracing::{debug, info, instrument, warn};

use crate::calendar_ports::CalendarMirror;

/// Group managed events by start instant. Identifiers are sorted within each
/// group, so the first one is the survivor.
pub fn group_by_slot(events: Vec<ManagedEvent>) -> BTreeMap<Slot, Vec<EventId>> {
    let mut groups: BTreeMap<Slot, Vec<EventId>> = BTreeMap::new();
    for event in events {
        groups.entry(event.slot).or_default().push(event.id);
    }
    for ids in groups.values_mut() {
        ids.sort();
    }
    groups
}

/// Result of a single collapse pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CollapseReport {
    /// Surplus events found (events beyond the first in each group).
    pub duplicates_found: usize,
    /// Instants that carried more than one event.
    pub groups: usize,
    /// Surplus events actually removed, including ones already gone.
    pub deleted: usize,
}

impl CollapseReport {
    pub fn is_clean(&self) -> bool {
        self.duplicates_found == 0
    }
}

/// Result of [`DuplicateCollapser::collapse_until_clean`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CollapseSummary {
    /// Passes run, the final clean one included.
    pub passes: u32,
    pub deleted: usize,
}

pub struct DuplicateCollapser {
    mirror: Arc<dyn CalendarMirror>,
    max_passes: u32,
}

impl DuplicateCollapser {
    pub fn new(mirror: Arc<dyn CalendarMirror>) -> Self {
        Self { mirror, max_passes: DEFAULT_MAX_COLLAPSE_PASSES }
    }

    #[must_use]
    pub fn with_max_passes(mut self, max_passes: u32) -> Self {
        self.max_passes = max_passes.max(1);
        self
    }

    /// List once and delete every surplus event found.
    ///
    /// The lowest identifier at each instant survives. A delete answered with
    /// "not found" counts as done; any other failure aborts the pass.
    #[instrument(skip(self, window), fields(start = %window.start(), days = window.days()))]
    pub async fn collapse_once(&self, window: &ReconciliationWindow) -> Result<CollapseReport> {
        let events = self.mirror.list_managed_events(window).await?;
        let mut report = CollapseReport::default();

        for (slot, ids) in group_by_slot(events) {
            let Some((survivor, surplus)) = ids.split_first() else {
                continue;
            };
            if surplus.is_empty() {
                continue;
            }

            report.groups += 1;
            report.duplicates_found += surplus.len();
            debug!(%slot, survivor = %survivor, surplus = surplus.len(), "collapsing duplicates");

            for id in surplus {
                match self.mirror.delete_event(id).await {
                    Ok(()) => report.deleted += 1,
                    Err(err) if err.is_not_found() => {
                        debug!(%slot, event_id = %id, "duplicate already gone");
                        report.deleted += 1;
                    }
                    Err(err) => return Err(err.at_slot(slot).into()),
                }
            }
        }

        if report.groups > 0 {
            info!(
                groups = report.groups,
                deleted = report.deleted,
                "removed duplicate managed events"
            );
        }
        Ok(report)
    }

    /// Repeat [`collapse_once`](Self::collapse_once) until a pass finds no
    /// duplicates.
    ///
    /// Fails with [`SyncError::CollapseDidNotConverge`] once the pass budget is
    /// spent, which happens when something keeps re-creating duplicates.
    pub async fn collapse_until_clean(
        &self,
        window: &ReconciliationWindow,
    ) -> Result<CollapseSummary> {
        let mut summary = CollapseSummary::default();

        while summary.passes < self.max_passes {
            let report = self.collapse_once(window).await?;
            summary.passes += 1;
            summary.deleted += report.deleted;

            if report.is_clean() {
                return Ok(summary);
            }
        }

        warn!(passes = summary.passes, "duplicates still present after last collapse pass");
        Err(SyncError::CollapseDidNotConverge { passes: summary.passes })
    }
}
