use async_trait::async_trait;
use busysync_core::BusySlotSource;
use busysync_domain::{AmeliaSourceConfig, ReconciliationWindow, SlotSet, SourceError};
use chrono::NaiveDateTime;
use tracing::{debug, warn};

use super::types::SlotsResponse;
use crate::http::{ensure_success, HttpClient};
use crate::integrations::{endpoint_url, local_slot};

const SLOTS_PATH: &str = "wp-admin/admin-ajax.php";
const SLOT_FORMAT: &str = "%Y-%m-%dT%H:%M";

/// Busy slots read from an Amelia booking site.
pub struct AmeliaBusySlotSource {
    http: HttpClient,
    config: AmeliaSourceConfig,
}

impl AmeliaBusySlotSource {
    pub fn new(http: HttpClient, config: AmeliaSourceConfig) -> Self {
        Self { http, config }
    }

    fn query(&self) -> Vec<(&'static str, String)> {
        let provider_ids =
            self.config.provider_ids.iter().map(u32::to_string).collect::<Vec<_>>().join(",");

        vec![
            ("action", "wpamelia_api".to_string()),
            ("call", "/slots".to_string()),
            ("monthsLoad", self.config.months_load.to_string()),
            ("serviceId", self.config.service_id.to_string()),
            ("serviceDuration", self.config.service_duration_secs.to_string()),
            ("providerIds", provider_ids),
            ("group", "1".to_string()),
            ("page", "booking".to_string()),
            ("persons", "1".to_string()),
        ]
    }
}

#[async_trait]
impl BusySlotSource for AmeliaBusySlotSource {
    async fn fetch_busy_slots(
        &self,
        window: &ReconciliationWindow,
    ) -> Result<SlotSet, SourceError> {
        let url = endpoint_url(&self.config.base_url, SLOTS_PATH)?;
        let request = self.http.get(url).query(&self.query());
        let response = ensure_success(self.http.send(request).await?).await?;

        let payload: SlotsResponse = response
            .json()
            .await
            .map_err(|e| SourceError::InvalidPayload(format!("Amelia slots response: {e}")))?;

        if !payload.message.contains(&self.config.success_marker) {
            return Err(SourceError::Rejected(format!(
                "unexpected Amelia message: '{}'",
                payload.message
            )));
        }

        let data = payload.data.unwrap_or_default();
        let mut busy = SlotSet::new();
        for (date, time) in data.occupied.entries() {
            let raw = format!("{date}T{time}");
            let local = NaiveDateTime::parse_from_str(&raw, SLOT_FORMAT).map_err(|e| {
                SourceError::InvalidPayload(format!("occupied slot '{raw}' is malformed: {e}"))
            })?;

            match local_slot(window.timezone(), local) {
                Some(slot) if window.contains(slot) => {
                    busy.insert(slot, None);
                }
                Some(_) => {}
                None => warn!(slot = %raw, "occupied slot falls in a DST gap; ignoring it"),
            }
        }

        debug!(busy = busy.len(), "fetched Amelia busy slots");
        Ok(busy)
    }
}
