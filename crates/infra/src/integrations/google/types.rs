//! Google Calendar wire types

use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub(crate) struct EventsPage {
    #[serde(default)]
    pub items: Vec<GoogleEvent>,
    #[serde(rename = "nextPageToken")]
    pub next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct GoogleEvent {
    pub id: String,
    pub description: Option<String>,
    pub start: Option<EventDateTime>,
}

#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct EventDateTime {
    #[serde(rename = "dateTime", skip_serializing_if = "Option::is_none")]
    pub date_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
}

#[derive(Debug, Serialize)]
pub(crate) struct NewEvent<'a> {
    pub summary: &'a str,
    pub description: &'a str,
    pub start: EventDateTime,
    pub end: EventDateTime,
    pub organizer: Organizer<'a>,
}

#[derive(Debug, Serialize)]
pub(crate) struct Organizer<'a> {
    pub id: &'a str,
    #[serde(rename = "displayName")]
    pub display_name: &'a str,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CreatedEvent {
    pub id: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TokenResponse {
    pub access_token: String,
    pub expires_in: i64,
}
