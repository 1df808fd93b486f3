//! External service integrations
//!
//! - [`google`]: the calendar backend
//! - [`amelia`] and [`portal`]: busy-slot providers

pub mod amelia;
pub mod google;
pub mod portal;

use busysync_domain::Slot;
use chrono::{NaiveDateTime, TimeZone};
use chrono_tz::Tz;
use reqwest::Url;

use crate::errors::InfraError;

pub use amelia::AmeliaBusySlotSource;
pub use google::GoogleCalendarMirror;
pub use portal::PortalBusySlotSource;

/// Resolve `path` against a configured site root. A missing trailing slash
/// on the root is tolerated.
pub(crate) fn endpoint_url(base: &str, path: &str) -> Result<Url, InfraError> {
    let base = if base.ends_with('/') { base.to_string() } else { format!("{base}/") };
    Url::parse(&base)
        .and_then(|root| root.join(path))
        .map_err(|e| InfraError::Config(format!("invalid base URL '{base}': {e}")))
}

/// Instant of a provider's local wall-clock time. `None` inside a DST gap;
/// the earlier instant wins inside a DST overlap.
pub(crate) fn local_slot(timezone: Tz, local: NaiveDateTime) -> Option<Slot> {
    timezone.from_local_datetime(&local).earliest().map(|instant| Slot::from_datetime(&instant))
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use chrono_tz::Europe::Bucharest;

    use super::*;

    #[test]
    fn endpoint_url_tolerates_missing_trailing_slash() {
        let with = endpoint_url("https://clinic.example/", "wp-admin/admin-ajax.php").unwrap();
        let without = endpoint_url("https://clinic.example", "wp-admin/admin-ajax.php").unwrap();
        assert_eq!(with, without);
        assert_eq!(with.as_str(), "https://clinic.example/wp-admin/admin-ajax.php");
    }

    #[test]
    fn endpoint_url_keeps_base_path() {
        let url = endpoint_url("https://portal.example/site", "api/free").unwrap();
        assert_eq!(url.as_str(), "https://portal.example/site/api/free");
    }

    #[test]
    fn local_slot_skips_dst_gap() {
        // Bucharest jumps from 03:00 to 04:00 on 2024-03-31.
        let gap = NaiveDate::from_ymd_opt(2024, 3, 31).unwrap().and_hms_opt(3, 30, 0).unwrap();
        assert_eq!(local_slot(Bucharest, gap), None);

        let evening = NaiveDate::from_ymd_opt(2024, 2, 19).unwrap().and_hms_opt(17, 30, 0).unwrap();
        assert_eq!(local_slot(Bucharest, evening), Some(Slot::from_epoch_seconds(1_708_356_600)));
    }
}
