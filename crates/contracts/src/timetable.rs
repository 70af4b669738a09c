//! Timetable - one calendar day of named prayer times
//!
//! `RawTimetable` is what a provider hands over (strings, possibly missing);
//! `Timetable` is the normalized, parsed form consumed by the schedule engine.

use std::collections::HashSet;

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::{ContractError, GeoPoint};

/// Canonical daily prayer names in chronological order
pub const CANONICAL_PRAYERS: [&str; 5] = ["Fajr", "Dhuhr", "Asr", "Maghrib", "Isha"];

/// Provider entry before parsing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawPrayerEntry {
    /// Prayer name
    pub name: String,

    /// Time string as received (`HH:MM`, `h:MM PM`, `05:12 (EET)`, ...)
    #[serde(default)]
    pub time: Option<String>,
}

impl RawPrayerEntry {
    pub fn new(name: impl Into<String>, time: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            time: Some(time.into()),
        }
    }

    /// Entry whose time is absent upstream
    pub fn missing(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            time: None,
        }
    }
}

/// Ordered raw entries for one day
pub type RawTimetable = Vec<RawPrayerEntry>;

/// Parsed prayer time
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrayerTime {
    /// Prayer name
    pub name: String,

    /// Local time of day
    pub time: NaiveTime,
}

impl PrayerTime {
    pub fn new(name: impl Into<String>, time: NaiveTime) -> Self {
        Self {
            name: name.into(),
            time,
        }
    }
}

/// Normalized timetable
///
/// Invariants: names are unique, times are non-decreasing.
/// Immutable once built; a newer timetable replaces it wholesale.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Timetable {
    entries: Vec<PrayerTime>,
}

impl Timetable {
    /// Build a timetable, dropping duplicate names (first wins) and
    /// stable-sorting by time of day
    pub fn new(entries: impl IntoIterator<Item = PrayerTime>) -> Self {
        let mut seen = HashSet::new();
        let mut entries: Vec<PrayerTime> = entries
            .into_iter()
            .filter(|entry| seen.insert(entry.name.clone()))
            .collect();
        entries.sort_by_key(|entry| entry.time);
        Self { entries }
    }

    /// Entries in chronological order
    pub fn entries(&self) -> &[PrayerTime] {
        &self.entries
    }

    pub fn iter(&self) -> impl Iterator<Item = &PrayerTime> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Look up a prayer by name
    pub fn get(&self, name: &str) -> Option<&PrayerTime> {
        self.entries.iter().find(|entry| entry.name == name)
    }
}

/// Timetable provider (external prayer-times API, file, fixture)
#[trait_variant::make(TimetableProvider: Send)]
pub trait LocalTimetableProvider {
    /// Provider name (used for logging)
    fn name(&self) -> &str;

    /// Fetch the timetable for `date` at `location`
    ///
    /// Partial timetables are returned as-is; only transport failures are errors.
    async fn fetch(&self, date: NaiveDate, location: GeoPoint)
        -> Result<Timetable, ContractError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    #[test]
    fn test_new_sorts_by_time() {
        let timetable = Timetable::new(vec![
            PrayerTime::new("Asr", at(15, 45)),
            PrayerTime::new("Fajr", at(5, 0)),
        ]);
        let names: Vec<_> = timetable.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["Fajr", "Asr"]);
    }

    #[test]
    fn test_new_drops_duplicate_names() {
        let timetable = Timetable::new(vec![
            PrayerTime::new("Fajr", at(5, 0)),
            PrayerTime::new("Fajr", at(6, 0)),
        ]);
        assert_eq!(timetable.len(), 1);
        assert_eq!(timetable.get("Fajr").unwrap().time, at(5, 0));
    }

    #[test]
    fn test_raw_entry_serde_missing_time() {
        let entry: RawPrayerEntry = serde_json::from_str(r#"{"name":"Isha"}"#).unwrap();
        assert_eq!(entry, RawPrayerEntry::missing("Isha"));
    }
}
