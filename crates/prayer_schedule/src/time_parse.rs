//! Time-of-day parsing for provider strings
//!
//! Upstream values are `HH:MM`, `h:MM AM/PM`, or either of those decorated
//! with timezone annotations (`05:12 (EET)`). The first `H{1,2}:MM` substring
//! wins.

use std::sync::OnceLock;

use chrono::NaiveTime;
use regex::Regex;
use tracing::debug;

use contracts::{PrayerTime, RawPrayerEntry, Timetable};

fn time_regex() -> &'static Regex {
    static TIME_REGEX: OnceLock<Regex> = OnceLock::new();
    TIME_REGEX.get_or_init(|| {
        // Matches:
        // - 05:00
        // - 5:30 pm / 5:30PM / 5:30 p.m.
        // - 05:12 (EET)
        // - 12:15 AMT (zone tag, not a meridiem)
        Regex::new(r"(?i)(\d{1,2}):(\d{2})(?:\s*([ap])\.?\s*m\b\.?)?").unwrap()
    })
}

/// Parse a provider time string into a local time of day
///
/// Returns `None` for anything without a valid `H:MM` substring. With an
/// AM/PM suffix the hour must be 1..=12 (12 AM is midnight, 12 PM is noon);
/// without one it must be 0..=23.
pub fn parse_time_of_day(input: &str) -> Option<NaiveTime> {
    let caps = time_regex().captures(input)?;
    let hour: u32 = caps.get(1)?.as_str().parse().ok()?;
    let minute: u32 = caps.get(2)?.as_str().parse().ok()?;

    let hour = match caps.get(3).map(|m| m.as_str().to_ascii_lowercase()) {
        Some(meridiem) => {
            if !(1..=12).contains(&hour) {
                return None;
            }
            match (meridiem.as_str(), hour) {
                ("a", 12) => 0,
                ("a", h) => h,
                (_, 12) => 12,
                (_, h) => h + 12,
            }
        }
        None => hour,
    };

    NaiveTime::from_hms_opt(hour, minute, 0)
}

/// Turn raw provider entries into a normalized timetable
///
/// Entries with a missing or unparseable time are skipped (partial
/// timetables are normal); duplicates keep the first parseable entry.
pub fn normalize_timetable(raw: &[RawPrayerEntry]) -> Timetable {
    let parsed = raw.iter().filter_map(|entry| {
        let Some(text) = entry.time.as_deref() else {
            debug!(prayer = %entry.name, "timetable entry has no time, skipping");
            return None;
        };
        match parse_time_of_day(text) {
            Some(time) => Some(PrayerTime::new(entry.name.clone(), time)),
            None => {
                debug!(prayer = %entry.name, raw = text, "unparseable prayer time, skipping");
                None
            }
        }
    });
    Timetable::new(parsed)
}
