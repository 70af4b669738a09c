//! # Prayer Schedule
//!
//! Prayer-time engine: turns one day's timetable and a reference instant into
//! {current window, next prayer, remaining time, progress}.
//!
//! Responsibilities:
//! - Parse decorated provider time strings (`05:12 (EET)`, `5:12 PM`)
//! - Normalize raw provider responses into a `Timetable`
//! - Compute `PrayerStatus`, including exact day rollover
//!
//! ## Example
//!
//! ```ignore
//! use prayer_schedule::{compute_status, parse_provider_response};
//!
//! let timetable = parse_provider_response(&response_json);
//! match compute_status(&timetable, clock.now()) {
//!     Some(status) => println!("{status}"), // Next: Asr, in 1h 45m
//!     None => println!("Loading prayer times..."),
//! }
//! ```

mod adapter;
mod engine;
mod time_parse;

pub use adapter::{parse_provider_response, timetable_from_json};
pub use engine::compute_status;
pub use time_parse::{normalize_timetable, parse_time_of_day};

// Re-export contracts types
pub use contracts::{PrayerStatus, PrayerTime, RawPrayerEntry, RawTimetable, RemainingTime, Timetable};
