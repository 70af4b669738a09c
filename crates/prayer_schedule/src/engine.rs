//! Prayer status computation.
//!
//! Pure: timetable + reference instant in, status out. Safe to call on every
//! tick from any thread.

use std::time::Duration;

use chrono::{NaiveDateTime, TimeDelta};
use tracing::{instrument, trace};

use contracts::{PrayerStatus, Timetable};

/// Compute the prayer status at `reference`
///
/// - `next` is the first entry strictly after `reference` today, otherwise the
///   first entry tomorrow (exactly +1 calendar day).
/// - `previous` is the entry before `next`; before the first prayer of the day
///   it is the last entry of the previous day. Timetables with fewer than two
///   entries have no previous and report a progress of 0.
///
/// Returns `None` ("no data") for an empty timetable.
#[instrument(
    level = "trace",
    name = "prayer_compute_status",
    skip(timetable),
    fields(entries = timetable.len())
)]
pub fn compute_status(timetable: &Timetable, reference: NaiveDateTime) -> Option<PrayerStatus> {
    let entries = timetable.entries();
    let first = entries.first()?;
    let today = reference.date();

    let upcoming = entries
        .iter()
        .position(|entry| today.and_time(entry.time) > reference);

    let (next_idx, next_instant) = match upcoming {
        Some(idx) => (idx, today.and_time(entries[idx].time)),
        None => {
            let tomorrow = today.and_time(first.time).checked_add_signed(TimeDelta::days(1))?;
            (0, tomorrow)
        }
    };

    let previous_instant = if entries.len() < 2 {
        None
    } else if next_idx > 0 {
        Some(next_instant.date().and_time(entries[next_idx - 1].time))
    } else {
        let last = &entries[entries.len() - 1];
        next_instant
            .date()
            .pred_opt()
            .map(|day| day.and_time(last.time))
    };

    let progress_fraction = match previous_instant {
        Some(previous) => progress(previous, next_instant, reference),
        None => 0.0,
    };

    // next_instant > reference by construction
    let remaining = (next_instant - reference)
        .to_std()
        .unwrap_or(Duration::ZERO);

    let next_name = entries[next_idx].name.clone();
    let current_or_next_name = match previous_instant {
        Some(_) if next_idx > 0 => entries[next_idx - 1].name.clone(),
        Some(_) => entries[entries.len() - 1].name.clone(),
        None => next_name.clone(),
    };

    trace!(
        next = %next_name,
        current = %current_or_next_name,
        progress = progress_fraction,
        remaining_s = remaining.as_secs(),
        "prayer status computed"
    );

    Some(PrayerStatus {
        current_or_next_name,
        next_name,
        next_instant,
        previous_instant,
        progress_fraction,
        remaining,
    })
}

fn progress(previous: NaiveDateTime, next: NaiveDateTime, reference: NaiveDateTime) -> f64 {
    let window_ms = (next - previous).num_milliseconds().max(1);
    let elapsed_ms = (reference - previous).num_milliseconds();
    (elapsed_ms as f64 / window_ms as f64).clamp(0.0, 1.0)
}
