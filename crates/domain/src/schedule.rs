//! Weekly availability schedule
//!
//! Some booking portals only report *free* slots. For those, the busy set is
//! derived from the doctor's weekly schedule: every scheduled slot that the
//! portal does not list as free is busy.

use chrono::{Datelike, NaiveTime, TimeDelta, TimeZone, Weekday};
use serde::{Deserialize, Serialize};

use crate::errors::{Result, SyncError};
use crate::slot::Slot;
use crate::window::ReconciliationWindow;

/// Consulting hours for one weekday.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DaySchedule {
    pub weekday: Weekday,
    #[serde(with = "hour_minute")]
    pub start: NaiveTime,
    #[serde(with = "hour_minute")]
    pub end: NaiveTime,
    pub slot_minutes: u32,
}

impl DaySchedule {
    /// Local start times of every slot in `[start, end)`.
    pub fn slot_times(&self) -> Vec<NaiveTime> {
        let step = TimeDelta::minutes(i64::from(self.slot_minutes));
        let mut times = Vec::new();
        let mut current = self.start;
        while current < self.end {
            times.push(current);
            let (next, wrapped) = current.overflowing_add_signed(step);
            if wrapped != 0 {
                break;
            }
            current = next;
        }
        times
    }
}

/// The set of weekdays with consulting hours. Days not listed have none.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WeeklySchedule {
    days: Vec<DaySchedule>,
}

impl WeeklySchedule {
    pub fn new(days: Vec<DaySchedule>) -> Self {
        Self { days }
    }

    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }

    pub fn for_weekday(&self, weekday: Weekday) -> impl Iterator<Item = &DaySchedule> + '_ {
        self.days.iter().filter(move |day| day.weekday == weekday)
    }

    pub fn validate(&self) -> Result<()> {
        for day in &self.days {
            if day.slot_minutes == 0 {
                return Err(SyncError::Config(format!(
                    "schedule for {} has a zero slot length",
                    day.weekday
                )));
            }
            if day.end <= day.start {
                return Err(SyncError::Config(format!(
                    "schedule for {} ends ({}) before it starts ({})",
                    day.weekday, day.end, day.start
                )));
            }
        }
        Ok(())
    }

    /// Every scheduled slot that falls inside `window`.
    ///
    /// Local times that do not exist on a DST transition day are skipped;
    /// ambiguous ones resolve to the earlier instant.
    pub fn slots_in(&self, window: &ReconciliationWindow) -> Vec<Slot> {
        let timezone = window.timezone();
        let mut slots = Vec::new();

        for date in window.dates() {
            for day in self.for_weekday(date.weekday()) {
                for time in day.slot_times() {
                    if let Some(instant) =
                        timezone.from_local_datetime(&date.and_time(time)).earliest()
                    {
                        slots.push(Slot::from(instant));
                    }
                }
            }
        }

        slots.retain(|slot| window.contains(*slot));
        slots
    }
}

mod hour_minute {
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, Serializer};

    const FORMAT: &str = "%H:%M";

    pub fn serialize<S: Serializer>(time: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&time.format(FORMAT).to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveTime, D::Error> {
        let raw = String::deserialize(deserializer)?;
        NaiveTime::parse_from_str(&raw, FORMAT).map_err(serde::de::Error::custom)
    }
}
