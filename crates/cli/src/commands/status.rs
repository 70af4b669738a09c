//! `status` command implementation.

use anyhow::{Context, Result};
use chrono::NaiveDateTime;
use serde::Serialize;
use tracing::info;

use contracts::{Clock, PrayerStatus, SystemClock, TimetableProvider};
use prayer_schedule::compute_status;

use super::load_blueprint;
use crate::cli::StatusArgs;
use crate::error::CliError;
use qibla_compass::ConfiguredTimetable;

const REFERENCE_FORMATS: [&str; 4] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
];

/// Status output for JSON mode
#[derive(Serialize)]
struct StatusOutput {
    reference: NaiveDateTime,
    source: String,
    timetable: Vec<TimetableEntry>,
    status: Option<PrayerStatus>,
}

#[derive(Serialize)]
struct TimetableEntry {
    name: String,
    time: String,
}

/// Execute the `status` command
pub async fn run_status(args: &StatusArgs) -> Result<()> {
    let mut blueprint = load_blueprint(args.config.as_deref())?;
    if let Some(ref path) = args.timetable {
        blueprint.timetable.clear();
        blueprint.timetable_file = Some(path.clone());
    }

    let reference = match args.at {
        Some(ref input) => parse_reference_time(input)?,
        None => SystemClock.now(),
    };

    let provider = ConfiguredTimetable::from_blueprint(&blueprint);
    info!(source = %provider.describe(), reference = %reference, "Computing prayer status");

    let timetable = provider
        .fetch(reference.date(), blueprint.observer.point())
        .await
        .map_err(|e| CliError::timetable_fetch(provider.describe(), e))?;
    let status = compute_status(&timetable, reference);

    if args.json {
        let output = StatusOutput {
            reference,
            source: provider.describe(),
            timetable: timetable
                .iter()
                .map(|p| TimetableEntry {
                    name: p.name.clone(),
                    time: p.time.format("%H:%M").to_string(),
                })
                .collect(),
            status: status.clone(),
        };
        let json =
            serde_json::to_string_pretty(&output).context("Failed to serialize prayer status")?;
        println!("{}", json);
    } else {
        print_status(reference, &timetable, status.as_ref());
    }

    match status {
        Some(_) => Ok(()),
        None => Err(CliError::NoPrayerData.into()),
    }
}

/// Parse `--at` as local wall time
fn parse_reference_time(input: &str) -> Result<NaiveDateTime, CliError> {
    let input = input.trim();
    REFERENCE_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(input, format).ok())
        .ok_or_else(|| CliError::invalid_reference_time(input))
}

fn print_status(
    reference: NaiveDateTime,
    timetable: &contracts::Timetable,
    status: Option<&PrayerStatus>,
) {
    println!("🕌 Prayer times ({})", reference.format("%Y-%m-%d %H:%M"));
    for (i, prayer) in timetable.iter().enumerate() {
        let prefix = if i == timetable.len() - 1 { "└─" } else { "├─" };
        let marker = match status {
            Some(s) if s.next_name == prayer.name => "  ← next",
            _ => "",
        };
        println!(
            "   {} {:<8} {}{}",
            prefix,
            prayer.name,
            prayer.time.format("%H:%M"),
            marker
        );
    }

    match status {
        Some(status) => {
            println!("\n{}", status);
            println!(
                "   Window: {} ({:.0}% elapsed)",
                status.current_or_next_name,
                status.progress_fraction * 100.0
            );
        }
        None => println!("\nNo prayer data"),
    }
}
