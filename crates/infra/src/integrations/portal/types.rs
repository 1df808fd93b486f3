//! Portal free-interval wire types

use serde::Deserialize;

/// Result code the portal uses for success.
pub(crate) const RESULT_OK: &str = "0";

#[derive(Debug, Deserialize)]
pub(crate) struct FreeSlotsResponse {
    #[serde(rename = "TipRezultat")]
    pub result_type: String,
    #[serde(rename = "Mesaj", default)]
    pub message: Option<String>,
    #[serde(rename = "Items", default)]
    pub items: Option<Vec<FreeDaySlots>>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct FreeDaySlots {
    /// `dd.mm.yyyy`
    #[serde(rename = "DATA")]
    pub date: String,
    /// Comma-separated `HH:MM` start times.
    #[serde(rename = "ORE", default)]
    pub hours: String,
}
