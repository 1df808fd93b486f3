//! Amelia `/slots` wire types

use std::collections::BTreeMap;

use serde::Deserialize;
use serde_json::Value;

#[derive(Debug, Deserialize)]
pub(crate) struct SlotsResponse {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub data: Option<SlotsData>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct SlotsData {
    #[serde(default)]
    pub occupied: Occupied,
}

/// `date -> time -> provider details`. PHP encodes an empty map as `[]`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum Occupied {
    Days(BTreeMap<String, BTreeMap<String, Value>>),
    Empty(Vec<Value>),
}

impl Default for Occupied {
    fn default() -> Self {
        Self::Empty(Vec::new())
    }
}

impl Occupied {
    /// `(date, time)` pairs, e.g. `("2024-02-19", "17:30")`.
    pub fn entries(&self) -> Vec<(&str, &str)> {
        match self {
            Self::Days(days) => days
                .iter()
                .flat_map(|(date, times)| {
                    times.keys().map(move |time| (date.as_str(), time.as_str()))
                })
                .collect(),
            Self::Empty(_) => Vec::new(),
        }
    }
}
