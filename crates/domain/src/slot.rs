//! Slots, slot sets and managed events
//!
//! A [`Slot`] is the instant a fixed-duration booking begins, kept at second
//! precision. A [`SlotSet`] maps slots to the backend identifier of the event
//! materializing them, when there is one.

use std::collections::btree_map::{self, BTreeMap};
use std::fmt;

use chrono::{DateTime, SecondsFormat, TimeDelta, TimeZone, Utc};

/// Start instant of a booking, in epoch seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Slot(i64);

impl Slot {
    pub const fn from_epoch_seconds(seconds: i64) -> Self {
        Self(seconds)
    }

    /// Build a slot from any zoned instant. Sub-second precision is dropped.
    pub fn from_datetime<Tz: TimeZone>(instant: &DateTime<Tz>) -> Self {
        Self(instant.timestamp())
    }

    pub const fn epoch_seconds(self) -> i64 {
        self.0
    }

    pub fn to_utc(self) -> DateTime<Utc> {
        DateTime::from_timestamp(self.0, 0).unwrap_or(DateTime::<Utc>::MIN_UTC)
    }

    /// Instant at which an event of `duration` starting at this slot ends.
    pub fn end(self, duration: SlotDuration) -> DateTime<Utc> {
        self.to_utc() + duration.as_time_delta()
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_utc().to_rfc3339_opts(SecondsFormat::Secs, true))
    }
}

impl<Tz: TimeZone> From<DateTime<Tz>> for Slot {
    fn from(value: DateTime<Tz>) -> Self {
        Self::from_datetime(&value)
    }
}

/// Length of a managed event, in whole minutes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotDuration(u32);

impl SlotDuration {
    pub const fn from_minutes(minutes: u32) -> Self {
        Self(minutes)
    }

    pub const fn minutes(self) -> u32 {
        self.0
    }

    pub fn as_time_delta(self) -> TimeDelta {
        TimeDelta::minutes(i64::from(self.0))
    }
}

/// Opaque identifier the calendar backend assigned to an event.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EventId(String);

impl EventId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for EventId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for EventId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// A calendar event owned by this system, as listed by the backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManagedEvent {
    pub id: EventId,
    pub slot: Slot,
}

impl ManagedEvent {
    pub fn new(id: impl Into<EventId>, slot: Slot) -> Self {
        Self { id: id.into(), slot }
    }
}

/// Lookup table of slots, each optionally backed by a calendar event.
///
/// Equality only compares the slots; identifiers are backend-assigned and
/// recomputed on every read, so they never take part in comparisons.
#[derive(Debug, Clone, Default)]
pub struct SlotSet {
    entries: BTreeMap<Slot, Option<EventId>>,
}

impl SlotSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, slot: Slot) -> bool {
        self.entries.contains_key(&slot)
    }

    pub fn identifier_for(&self, slot: Slot) -> Option<&EventId> {
        self.entries.get(&slot).and_then(Option::as_ref)
    }

    /// Insert or overwrite a slot. Returns `true` when the slot was new.
    pub fn insert(&mut self, slot: Slot, id: Option<EventId>) -> bool {
        self.entries.insert(slot, id).is_none()
    }

    pub fn remove(&mut self, slot: Slot) -> Option<EventId> {
        self.entries.remove(&slot).flatten()
    }

    /// Slots present in `self` but absent from `other`, keeping `self`'s
    /// identifiers.
    #[must_use]
    pub fn difference(&self, other: &SlotSet) -> SlotSet {
        self.entries
            .iter()
            .filter(|(slot, _)| !other.contains(**slot))
            .map(|(slot, id)| (*slot, id.clone()))
            .collect()
    }

    /// Number of slots present in both sets.
    pub fn intersection_len(&self, other: &SlotSet) -> usize {
        self.entries.keys().filter(|slot| other.contains(**slot)).count()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn slots(&self) -> impl Iterator<Item = Slot> + '_ {
        self.entries.keys().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Slot, Option<&EventId>)> + '_ {
        self.entries.iter().map(|(slot, id)| (*slot, id.as_ref()))
    }

    /// Drop every slot for which `keep` returns false.
    pub fn retain(&mut self, mut keep: impl FnMut(Slot) -> bool) {
        self.entries.retain(|slot, _| keep(*slot));
    }
}

impl PartialEq for SlotSet {
    fn eq(&self, other: &Self) -> bool {
        self.entries.len() == other.entries.len()
            && self.entries.keys().eq(other.entries.keys())
    }
}

impl Eq for SlotSet {}

impl FromIterator<Slot> for SlotSet {
    fn from_iter<I: IntoIterator<Item = Slot>>(iter: I) -> Self {
        iter.into_iter().map(|slot| (slot, None)).collect()
    }
}

impl FromIterator<(Slot, Option<EventId>)> for SlotSet {
    fn from_iter<I: IntoIterator<Item = (Slot, Option<EventId>)>>(iter: I) -> Self {
        Self { entries: iter.into_iter().collect() }
    }
}

impl FromIterator<(Slot, EventId)> for SlotSet {
    fn from_iter<I: IntoIterator<Item = (Slot, EventId)>>(iter: I) -> Self {
        iter.into_iter().map(|(slot, id)| (slot, Some(id))).collect()
    }
}

impl Extend<(Slot, Option<EventId>)> for SlotSet {
    fn extend<I: IntoIterator<Item = (Slot, Option<EventId>)>>(&mut self, iter: I) {
        self.entries.extend(iter);
    }
}

impl IntoIterator for SlotSet {
    type Item = (Slot, Option<EventId>);
    type IntoIter = btree_map::IntoIter<Slot, Option<EventId>>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use chrono_tz::Europe::Bucharest;

    use super::*;

    fn slot(seconds: i64) -> Slot {
        Slot::from_epoch_seconds(seconds)
    }

    #[test]
    fn sub_second_instants_collapse_into_one_slot() {
        let base = Utc.with_ymd_and_hms(2024, 2, 19, 17, 30, 0).unwrap();
        let later = base + TimeDelta::milliseconds(999);
        assert_eq!(Slot::from_datetime(&base), Slot::from_datetime(&later));
    }

    #[test]
    fn zoned_and_utc_instants_map_to_same_slot() {
        let local = Bucharest.with_ymd_and_hms(2024, 2, 19, 19, 30, 0).unwrap();
        let utc = Utc.with_ymd_and_hms(2024, 2, 19, 17, 30, 0).unwrap();
        assert_eq!(Slot::from(local), Slot::from(utc));
    }

    #[test]
    fn slot_end_adds_duration() {
        let start = slot(1_700_000_000);
        let end = start.end(SlotDuration::from_minutes(30));
        assert_eq!(end.timestamp(), 1_700_001_800);
    }

    #[test]
    fn duplicate_raw_records_form_one_logical_slot() {
        let mut set = SlotSet::new();
        assert!(set.insert(slot(10), Some("a".into())));
        assert!(!set.insert(slot(10), Some("b".into())));
        assert_eq!(set.len(), 1);
        assert_eq!(set.identifier_for(slot(10)), Some(&EventId::from("b")));
    }

    #[test]
    fn difference_keeps_left_identifiers() {
        let left: SlotSet =
            [(slot(1), EventId::from("a")), (slot(2), EventId::from("b"))].into_iter().collect();
        let right: SlotSet = [slot(1), slot(3)].into_iter().collect();

        let diff = left.difference(&right);
        assert_eq!(diff.len(), 1);
        assert_eq!(diff.identifier_for(slot(2)), Some(&EventId::from("b")));
        assert!(!diff.contains(slot(1)));
    }

    #[test]
    fn equality_ignores_identifiers() {
        let with_ids: SlotSet =
            [(slot(1), EventId::from("a")), (slot(2), EventId::from("b"))].into_iter().collect();
        let bare: SlotSet = [slot(2), slot(1)].into_iter().collect();
        assert_eq!(with_ids, bare);

        let other: SlotSet = [slot(1)].into_iter().collect();
        assert_ne!(with_ids, other);
    }

    #[test]
    fn display_is_utc_rfc3339() {
        assert_eq!(slot(0).to_string(), "1970-01-01T00:00:00Z");
    }
}
