//! Shared fixtures for the adapter integration tests.

#![allow(dead_code)]

use std::time::Duration;

use busysync_domain::{ReconciliationWindow, Slot};
use busysync_infra::HttpClient;
use chrono::{NaiveDate, TimeZone};
use chrono_tz::Europe::Bucharest;
use chrono_tz::Tz;

pub const ZONE: Tz = Bucharest;

/// HTTP client with two attempts and no noticeable backoff.
pub fn http_client() -> HttpClient {
    HttpClient::builder()
        .timeout(Duration::from_secs(5))
        .max_attempts(2)
        .base_backoff(Duration::from_millis(1))
        .build()
        .expect("http client should build")
}

/// Monday 2024-02-19, Bucharest, `days` long.
pub fn window(days: u32) -> ReconciliationWindow {
    let start = NaiveDate::from_ymd_opt(2024, 2, 19).expect("valid date");
    ReconciliationWindow::new(start, days, ZONE).expect("valid window")
}

/// Bucharest wall-clock time in February 2024.
pub fn local(day: u32, hour: u32, minute: u32) -> Slot {
    let instant = ZONE
        .with_ymd_and_hms(2024, 2, day, hour, minute, 0)
        .single()
        .expect("unambiguous local time");
    Slot::from(instant)
}
