use async_trait::async_trait;
use busysync_core::BusySlotSource;
use busysync_domain::{PortalSourceConfig, ReconciliationWindow, SlotSet, SourceError};
use chrono::{Days, NaiveDate, NaiveTime};
use tracing::{debug, warn};

use super::types::{FreeDaySlots, FreeSlotsResponse, RESULT_OK};
use crate::http::{ensure_success, HttpClient};
use crate::integrations::{endpoint_url, local_slot};

const FREE_SLOTS_PATH: &str =
    "DesktopModules/IWServices/API/Appointments/Programari_getIntervaleLibere";
const DATE_FORMAT: &str = "%d.%m.%Y";
const TIME_FORMAT: &str = "%H:%M";

/// Busy slots derived from a portal's free intervals and a weekly schedule.
pub struct PortalBusySlotSource {
    http: HttpClient,
    config: PortalSourceConfig,
}

impl PortalBusySlotSource {
    pub fn new(http: HttpClient, config: PortalSourceConfig) -> Self {
        Self { http, config }
    }

    async fn fetch_free_days(
        &self,
        window: &ReconciliationWindow,
    ) -> Result<Vec<FreeDaySlots>, SourceError> {
        let start = window.start_date();
        let end = start.checked_add_days(Days::new(u64::from(window.days()))).unwrap_or(start);

        let mut query = vec![
            ("Portal_HospitalConnectionValue", self.config.hospital_connection.clone()),
            ("dataStart", start.format(DATE_FORMAT).to_string()),
            ("dataEnd", end.format(DATE_FORMAT).to_string()),
            ("idSpecialitate", self.config.specialty_id.to_string()),
        ];
        if self.config.include_more_days {
            query.push(("maiMulteZile", "true".to_string()));
        }
        query.push(("medCod", self.config.doctor_code.clone()));

        let url = endpoint_url(&self.config.base_url, FREE_SLOTS_PATH)?;
        let request = self.http.get(url).query(&query);
        let response = ensure_success(self.http.send(request).await?).await?;

        let payload: FreeSlotsResponse = response
            .json()
            .await
            .map_err(|e| SourceError::InvalidPayload(format!("portal free slots response: {e}")))?;

        if payload.result_type != RESULT_OK {
            return Err(SourceError::Rejected(format!(
                "portal result type {}: {}",
                payload.result_type,
                payload.message.unwrap_or_default()
            )));
        }

        Ok(payload.items.unwrap_or_default())
    }
}

/// Instants the portal lists as free, inside `window`.
fn free_slots(
    days: &[FreeDaySlots],
    window: &ReconciliationWindow,
) -> Result<SlotSet, SourceError> {
    let mut free = SlotSet::new();

    for day in days {
        let date = NaiveDate::parse_from_str(day.date.trim(), DATE_FORMAT).map_err(|e| {
            SourceError::InvalidPayload(format!("free day '{}' is malformed: {e}", day.date))
        })?;

        for hour in day.hours.split(',').map(str::trim).filter(|hour| !hour.is_empty()) {
            let time = NaiveTime::parse_from_str(hour, TIME_FORMAT).map_err(|e| {
                SourceError::InvalidPayload(format!(
                    "free time '{hour}' on {date} is malformed: {e}"
                ))
            })?;

            match local_slot(window.timezone(), date.and_time(time)) {
                Some(slot) if window.contains(slot) => {
                    free.insert(slot, None);
                }
                Some(_) => {}
                None => warn!(%date, time = hour, "free slot falls in a DST gap; ignoring it"),
            }
        }
    }

    Ok(free)
}

#[async_trait]
impl BusySlotSource for PortalBusySlotSource {
    async fn fetch_busy_slots(
        &self,
        window: &ReconciliationWindow,
    ) -> Result<SlotSet, SourceError> {
        let days = self.fetch_free_days(window).await?;
        let free = free_slots(&days, window)?;

        let scheduled: SlotSet = self.config.schedule.slots_in(window).into_iter().collect();
        let busy = scheduled.difference(&free);

        debug!(
            scheduled = scheduled.len(),
            free = free.len(),
            busy = busy.len(),
            "derived portal busy slots"
        );
        Ok(busy)
    }
}
