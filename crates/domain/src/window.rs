//! Reconciliation window
//!
//! A contiguous run of calendar days in a given time zone, starting at local
//! midnight. Desired and observed snapshots of one pass are always taken over
//! the same window, otherwise the diff grows spurious creates and deletes at
//! the edges.

use chrono::{DateTime, Days, NaiveDate, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;

use crate::errors::{Result, SyncError};
use crate::slot::Slot;

/// `[start_date, start_date + days)` at local midnight in `timezone`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconciliationWindow {
    start_date: NaiveDate,
    days: u32,
    timezone: Tz,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

impl ReconciliationWindow {
    /// Window covering `days` calendar days from `start_date`.
    pub fn new(start_date: NaiveDate, days: u32, timezone: Tz) -> Result<Self> {
        if days == 0 {
            return Err(SyncError::Config(
                "reconciliation window must span at least one day".into(),
            ));
        }

        let end_date = start_date.checked_add_days(Days::new(u64::from(days))).ok_or_else(|| {
            SyncError::Internal(format!("window end overflows: {start_date} + {days} days"))
        })?;

        let start = local_midnight(start_date, timezone)?;
        let end = local_midnight(end_date, timezone)?;

        Ok(Self { start_date, days, timezone, start, end })
    }

    /// Window starting on the local calendar day that contains `now`.
    pub fn starting_at(now: DateTime<Utc>, timezone: Tz, days: u32) -> Result<Self> {
        let today = now.with_timezone(&timezone).date_naive();
        Self::new(today, days, timezone)
    }

    pub fn start_date(&self) -> NaiveDate {
        self.start_date
    }

    pub fn days(&self) -> u32 {
        self.days
    }

    pub fn timezone(&self) -> Tz {
        self.timezone
    }

    /// Inclusive lower bound.
    pub fn start(&self) -> DateTime<Utc> {
        self.start
    }

    /// Exclusive upper bound.
    pub fn end(&self) -> DateTime<Utc> {
        self.end
    }

    pub fn contains(&self, slot: Slot) -> bool {
        let seconds = slot.epoch_seconds();
        seconds >= self.start.timestamp() && seconds < self.end.timestamp()
    }

    /// Local calendar dates covered by the window, in order.
    pub fn dates(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        (0..self.days).filter_map(move |offset| {
            self.start_date.checked_add_days(Days::new(u64::from(offset)))
        })
    }
}

/// First instant of `date` in `timezone`.
///
/// Midnight can be skipped by a DST jump in a handful of zones; the first
/// valid local time of the day is used then.
fn local_midnight(date: NaiveDate, timezone: Tz) -> Result<DateTime<Utc>> {
    let midnight = date.and_time(NaiveTime::MIN);
    if let Some(instant) = timezone.from_local_datetime(&midnight).earliest() {
        return Ok(instant.with_timezone(&Utc));
    }

    (1..=24 * 60)
        .filter_map(|minutes| {
            let local = midnight + chrono::TimeDelta::minutes(minutes);
            timezone.from_local_datetime(&local).earliest()
        })
        .next()
        .map(|instant| instant.with_timezone(&Utc))
        .ok_or_else(|| SyncError::Internal(format!("no valid local time on {date} in {timezone}")))
}
