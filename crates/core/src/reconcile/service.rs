//! Reconciler - applies the desired-vs-observed diff to the calendar

use std::sync::Arc;

use busysync_domain::{ReconciliationWindow, Result, SlotDuration};
use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use tracing::{debug, info, instrument, warn};

use super::plan::{plan, ReconcilePlan};
use crate::busy_slot_ports::BusySlotSource;
use crate::calendar_ports::CalendarMirror;

/// Window and event parameters of a reconciliation pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReconcilerSettings {
    /// Zone whose local midnight starts the window.
    pub timezone: Tz,
    /// Number of calendar days covered by each pass.
    pub days: u32,
    /// Length of every event the reconciler creates.
    pub event_duration: SlotDuration,
}

/// Outcome of one successful pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PassReport {
    pub window_start: DateTime<Utc>,
    pub window_end: DateTime<Utc>,
    pub created: usize,
    pub deleted: usize,
    /// Deletes the backend answered with "not found".
    pub already_gone: usize,
    pub unchanged: usize,
}

impl PassReport {
    /// True when the pass did not change the calendar.
    pub fn is_noop(&self) -> bool {
        self.created == 0 && self.deleted == 0
    }
}

/// Converges managed calendar events onto the busy slots of the source.
///
/// Stateless across passes. Callers must not run two passes against the same
/// calendar concurrently; the scheduler owns that guarantee.
pub struct Reconciler {
    source: Arc<dyn BusySlotSource>,
    mirror: Arc<dyn CalendarMirror>,
    settings: ReconcilerSettings,
}

impl Reconciler {
    pub fn new(
        source: Arc<dyn BusySlotSource>,
        mirror: Arc<dyn CalendarMirror>,
        settings: ReconcilerSettings,
    ) -> Self {
        Self { source, mirror, settings }
    }

    pub fn settings(&self) -> ReconcilerSettings {
        self.settings
    }

    /// The window a pass started at `now` covers.
    pub fn window_for(&self, now: DateTime<Utc>) -> Result<ReconciliationWindow> {
        ReconciliationWindow::starting_at(now, self.settings.timezone, self.settings.days)
    }

    /// Run one full pass over the window containing `now`.
    pub async fn run_pass(&self, now: DateTime<Utc>) -> Result<PassReport> {
        let window = self.window_for(now)?;
        self.reconcile(&window).await
    }

    /// Fetch both sides over `window` and compute the diff without applying it.
    pub async fn plan_pass(&self, window: &ReconciliationWindow) -> Result<ReconcilePlan> {
        let desired = self.source.fetch_busy_slots(window).await?;
        debug!(busy_slots = desired.len(), "fetched desired slots");

        let observed = self.mirror.list_managed_slots(window).await?;
        debug!(managed_slots = observed.len(), "fetched observed slots");

        Ok(plan(&desired, &observed))
    }

    /// Converge the calendar onto the source over `window`.
    ///
    /// The first failing call aborts the pass. Nothing is rolled back: the
    /// next pass recomputes the diff from fresh state.
    #[instrument(skip(self, window), fields(start = %window.start(), days = window.days()))]
    pub async fn reconcile(&self, window: &ReconciliationWindow) -> Result<PassReport> {
        info!("starting reconciliation pass");

        let plan = self.plan_pass(window).await?;

        for slot in &plan.orphaned {
            warn!(%slot, "managed slot has no event identifier; leaving it in place");
        }

        // Creates first: a pass that dies midway leaves extra busy time rather
        // than a busy slot with no blocking event.
        let mut created = 0;
        for slot in &plan.to_create {
            let id = self.mirror.create_event(*slot, self.settings.event_duration).await?;
            debug!(%slot, event_id = %id, "created managed event");
            created += 1;
        }

        let mut deleted = 0;
        let mut already_gone = 0;
        for (slot, id) in &plan.to_delete {
            match self.mirror.delete_event(id).await {
                Ok(()) => {
                    debug!(%slot, event_id = %id, "deleted managed event");
                    deleted += 1;
                }
                Err(err) if err.is_not_found() => {
                    debug!(%slot, event_id = %id, "managed event already gone");
                    already_gone += 1;
                }
                Err(err) => return Err(err.at_slot(*slot).into()),
            }
        }

        let report = PassReport {
            window_start: window.start(),
            window_end: window.end(),
            created,
            deleted,
            already_gone,
            unchanged: plan.unchanged,
        };

        info!(
            created = report.created,
            deleted = report.deleted,
            already_gone = report.already_gone,
            unchanged = report.unchanged,
            "finished reconciliation pass"
        );
        Ok(report)
    }
}
