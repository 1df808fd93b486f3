//! Google Calendar implementation of the calendar port

use std::sync::Arc;

use async_trait::async_trait;
use busysync_core::CalendarMirror;
use busysync_domain::{
    BackendError, EventId, ManagedEvent, ReconciliationWindow, Slot, SlotDuration,
};
use chrono::{DateTime, SecondsFormat, Utc};
use reqwest::Url;
use tracing::debug;

use super::auth::AccessTokenProvider;
use super::types::{CreatedEvent, EventDateTime, EventsPage, GoogleEvent, NewEvent, Organizer};
use crate::errors::InfraError;
use crate::http::{ensure_success, HttpClient};

const MAX_RESULTS: &str = "2500";
const ORGANIZER_ID: &str = "auto-booking";
const ORGANIZER_NAME: &str = "Auto booking";

/// Calendar mirror backed by one Google calendar.
pub struct GoogleCalendarMirror {
    http: HttpClient,
    tokens: Arc<dyn AccessTokenProvider>,
    api_base: String,
    calendar_id: String,
    marker: String,
}

impl GoogleCalendarMirror {
    pub fn new(
        http: HttpClient,
        tokens: Arc<dyn AccessTokenProvider>,
        api_base: impl Into<String>,
        calendar_id: impl Into<String>,
        marker: impl Into<String>,
    ) -> Self {
        Self {
            http,
            tokens,
            api_base: api_base.into(),
            calendar_id: calendar_id.into(),
            marker: marker.into(),
        }
    }

    /// `{base}/calendars/{calendar_id}/events[/{event_id}]`, with ids
    /// percent-encoded as path segments.
    fn events_url(&self, event_id: Option<&EventId>) -> Result<Url, InfraError> {
        let mut url = Url::parse(&self.api_base)
            .map_err(|e| InfraError::Config(format!("invalid calendar API base URL: {e}")))?;

        {
            let mut segments = url.path_segments_mut().map_err(|()| {
                InfraError::Config("calendar API base URL cannot carry a path".into())
            })?;
            segments.pop_if_empty().extend(["calendars", self.calendar_id.as_str(), "events"]);
            if let Some(id) = event_id {
                segments.push(id.as_str());
            }
        }

        Ok(url)
    }

    fn is_managed(&self, event: &GoogleEvent) -> bool {
        event.description.as_deref().map(str::trim) == Some(self.marker.as_str())
    }

    async fn fetch_page(
        &self,
        window: &ReconciliationWindow,
        page_token: Option<&str>,
    ) -> Result<EventsPage, InfraError> {
        let token = self.tokens.access_token().await?;
        let time_min = rfc3339(window.start());
        let time_max = rfc3339(window.end());

        let mut query: Vec<(&str, &str)> = vec![
            ("showDeleted", "false"),
            ("singleEvents", "true"),
            ("timeMin", time_min.as_str()),
            ("timeMax", time_max.as_str()),
            ("orderBy", "startTime"),
            ("maxResults", MAX_RESULTS),
        ];
        if let Some(page_token) = page_token {
            query.push(("pageToken", page_token));
        }

        let request = self.http.get(self.events_url(None)?).bearer_auth(token).query(&query);
        let response = ensure_success(self.http.send(request).await?).await?;

        response
            .json::<EventsPage>()
            .await
            .map_err(|e| InfraError::Decode(format!("failed to parse Google events page: {e}")))
    }

    fn to_managed(&self, event: GoogleEvent) -> Result<ManagedEvent, BackendError> {
        let id = EventId::new(event.id);
        let start = event
            .start
            .and_then(|start| start.date_time)
            .ok_or_else(|| BackendError::InvalidEvent {
                id: id.clone(),
                message: "managed event has no start dateTime".into(),
            })?;

        let start = DateTime::parse_from_rfc3339(&start).map_err(|e| BackendError::InvalidEvent {
            id: id.clone(),
            message: format!("start '{start}' is not RFC 3339: {e}"),
        })?;

        Ok(ManagedEvent::new(id, Slot::from_datetime(&start)))
    }
}

#[async_trait]
impl CalendarMirror for GoogleCalendarMirror {
    async fn list_managed_events(
        &self,
        window: &ReconciliationWindow,
    ) -> Result<Vec<ManagedEvent>, BackendError> {
        let mut managed = Vec::new();
        let mut page_token: Option<String> = None;
        let mut pages = 0usize;

        loop {
            let page = self
                .fetch_page(window, page_token.as_deref())
                .await
                .map_err(|e| BackendError::List { message: e.to_string() })?;
            pages += 1;

            for event in page.items {
                if !self.is_managed(&event) {
                    continue;
                }
                let event = self.to_managed(event)?;
                // timeMin matches on event end, so events that started before
                // the window can show up here.
                if window.contains(event.slot) {
                    managed.push(event);
                }
            }

            match page.next_page_token {
                Some(next) if !next.is_empty() => page_token = Some(next),
                _ => break,
            }
        }

        debug!(pages, managed = managed.len(), "listed managed calendar events");
        Ok(managed)
    }

    async fn create_event(
        &self,
        slot: Slot,
        duration: SlotDuration,
    ) -> Result<EventId, BackendError> {
        let create_error = |e: InfraError| BackendError::Create { slot, message: e.to_string() };

        let token = self.tokens.access_token().await.map_err(create_error)?;
        let body = NewEvent {
            summary: &self.marker,
            description: &self.marker,
            start: EventDateTime { date_time: Some(rfc3339(slot.to_utc())), date: None },
            end: EventDateTime { date_time: Some(rfc3339(slot.end(duration))), date: None },
            organizer: Organizer { id: ORGANIZER_ID, display_name: ORGANIZER_NAME },
        };

        let url = self.events_url(None).map_err(create_error)?;
        let request = self.http.post(url).bearer_auth(token).json(&body);
        let response = self.http.send(request).await.map_err(create_error)?;
        let response = ensure_success(response).await.map_err(create_error)?;

        let created: CreatedEvent = response.json().await.map_err(|e| BackendError::Create {
            slot,
            message: format!("failed to parse created event: {e}"),
        })?;

        debug!(%slot, event_id = %created.id, "created Google calendar event");
        Ok(EventId::new(created.id))
    }

    async fn delete_event(&self, id: &EventId) -> Result<(), BackendError> {
        let delete_error = |e: InfraError| BackendError::Delete {
            id: id.clone(),
            slot: None,
            message: e.to_string(),
        };

        let token = self.tokens.access_token().await.map_err(delete_error)?;
        let url = self.events_url(Some(id)).map_err(delete_error)?;
        let request = self.http.delete(url).bearer_auth(token);
        let response = self.http.send(request).await.map_err(delete_error)?;

        match ensure_success(response).await {
            Ok(_) => {
                debug!(event_id = %id, "deleted Google calendar event");
                Ok(())
            }
            // Google answers 410 Gone for events that were already deleted.
            Err(err) if matches!(err.status(), Some(404 | 410)) => {
                debug!(event_id = %id, status = ?err.status(), "calendar event already gone");
                Err(BackendError::NotFound { id: id.clone() })
            }
            Err(err) => Err(delete_error(err)),
        }
    }
}

fn rfc3339(instant: DateTime<Utc>) -> String {
    instant.to_rfc3339_opts(SecondsFormat::Secs, true)
}
