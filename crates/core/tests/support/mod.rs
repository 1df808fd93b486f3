//! Shared test helpers for `busysync-core` integration tests.
//!
//! Lightweight in-memory implementations of the ports plus a few slot
//! fixtures, so the integration tests can focus on behaviour.

#![allow(dead_code)]

pub mod calendar;
pub mod source;

use busysync_domain::{ReconciliationWindow, Slot};
use chrono::{NaiveDate, TimeZone};
use chrono_tz::Europe::Bucharest;
use chrono_tz::Tz;

pub use calendar::InMemoryCalendar;
pub use source::StaticBusySource;

pub const ZONE: Tz = Bucharest;

/// Seven-day Bucharest window starting Monday 2024-02-19.
pub fn week_window() -> ReconciliationWindow {
    let start = NaiveDate::from_ymd_opt(2024, 2, 19).expect("valid date");
    ReconciliationWindow::new(start, 7, ZONE).expect("valid window")
}

/// Local Bucharest wall-clock time on February 2024.
pub fn local(day: u32, hour: u32, minute: u32) -> Slot {
    let instant = ZONE
        .with_ymd_and_hms(2024, 2, day, hour, minute, 0)
        .single()
        .expect("unambiguous local time");
    Slot::from_datetime(&instant)
}
