//! Provider-boundary adapter: raw JSON response -> `RawTimetable`
//!
//! Accepted shapes:
//! - `{"data": {"timings": {"Fajr": "05:00", ...}}}`
//! - `{"timings": {...}}`
//! - `{"Fajr": "05:00", ...}`
//! - `[{"name": "Fajr", "time": "05:00"}, ...]`
//!
//! Object shapes are read in canonical prayer order; other keys
//! (Sunrise, Imsak, Midnight, ...) are ignored. Anything else is "no data".

use serde_json::{Map, Value};
use tracing::debug;

use contracts::{RawPrayerEntry, RawTimetable, Timetable, CANONICAL_PRAYERS};

use crate::normalize_timetable;

/// Extract raw entries from any supported response shape
pub fn timetable_from_json(value: &Value) -> RawTimetable {
    if let Some(timings) = value
        .get("data")
        .and_then(|data| data.get("timings"))
        .and_then(Value::as_object)
    {
        return from_object(timings);
    }

    if let Some(timings) = value.get("timings").and_then(Value::as_object) {
        return from_object(timings);
    }

    match value {
        Value::Array(items) => from_array(items),
        Value::Object(map) if CANONICAL_PRAYERS.iter().any(|name| map.contains_key(*name)) => {
            from_object(map)
        }
        _ => {
            debug!("timetable response matches no known shape");
            Vec::new()
        }
    }
}

/// Extract and normalize in one step
pub fn parse_provider_response(value: &Value) -> Timetable {
    normalize_timetable(&timetable_from_json(value))
}

fn from_object(map: &Map<String, Value>) -> RawTimetable {
    CANONICAL_PRAYERS
        .iter()
        .map(|name| match map.get(*name).and_then(Value::as_str) {
            Some(time) => RawPrayerEntry::new(*name, time),
            None => RawPrayerEntry::missing(*name),
        })
        .collect()
}

fn from_array(items: &[Value]) -> RawTimetable {
    items
        .iter()
        .filter_map(|item| {
            let name = item.get("name").and_then(Value::as_str)?;
            Some(RawPrayerEntry {
                name: name.to_string(),
                time: item.get("time").and_then(Value::as_str).map(str::to_string),
            })
        })
        .collect()
}
