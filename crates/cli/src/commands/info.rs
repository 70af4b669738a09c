//! `info` command implementation.

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::info;

use contracts::{NavigatorBlueprint, QiblaFix};
use prayer_schedule::normalize_timetable;

use crate::cli::InfoArgs;
use qibla_compass::ConfiguredTimetable;

/// Configuration info for JSON output
#[derive(Serialize)]
struct ConfigInfo {
    version: String,
    observer: ObserverInfo,
    sensors: SensorInfo,
    schedule: ScheduleInfo,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    sinks: Vec<SinkInfo>,
}

#[derive(Serialize)]
struct ObserverInfo {
    latitude: f64,
    longitude: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    qibla: Option<QiblaFix>,
}

#[derive(Serialize)]
struct SensorInfo {
    location_poll_interval_ms: u64,
    location_min_distance_m: f64,
    magnetometer_update_interval_ms: u64,
    fine_threshold: f64,
    coarse_threshold: f64,
    calibration_window_s: f64,
    smoothing: f64,
    calibrate_on_start: bool,
}

#[derive(Serialize)]
struct ScheduleInfo {
    tick_interval_ms: u64,
    timetable_source: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    timetable: Vec<PrayerInfo>,
}

#[derive(Serialize)]
struct PrayerInfo {
    name: String,
    time: String,
}

#[derive(Serialize)]
struct SinkInfo {
    name: String,
    sink_type: String,
    queue_capacity: usize,
}

/// Execute the `info` command
pub fn run_info(args: &InfoArgs) -> Result<()> {
    info!(config = %args.config.display(), "Loading configuration info");

    if !args.config.exists() {
        anyhow::bail!("Configuration file not found: {}", args.config.display());
    }

    let blueprint = config_loader::ConfigLoader::load_from_path(&args.config)
        .with_context(|| format!("Failed to load config from {}", args.config.display()))?;

    let info = build_config_info(&blueprint, args);
    if args.json {
        let json =
            serde_json::to_string_pretty(&info).context("Failed to serialize config info")?;
        println!("{}", json);
    } else {
        print_config_info(&info);
    }

    Ok(())
}

fn build_config_info(blueprint: &NavigatorBlueprint, args: &InfoArgs) -> ConfigInfo {
    let observer = blueprint.observer.point();
    let mag = &blueprint.magnetometer;

    // Only the inline timetable is known without I/O
    let timetable = if args.timetable {
        normalize_timetable(&blueprint.timetable)
            .iter()
            .map(|p| PrayerInfo {
                name: p.name.clone(),
                time: p.time.format("%H:%M").to_string(),
            })
            .collect()
    } else {
        Vec::new()
    };

    let sinks = if args.sinks {
        blueprint
            .sinks
            .iter()
            .map(|s| SinkInfo {
                name: s.name.clone(),
                sink_type: format!("{:?}", s.sink_type),
                queue_capacity: s.queue_capacity,
            })
            .collect()
    } else {
        Vec::new()
    };

    ConfigInfo {
        version: format!("{:?}", blueprint.version),
        observer: ObserverInfo {
            latitude: observer.latitude,
            longitude: observer.longitude,
            qibla: qibla_navigator::qibla_fix(observer).ok(),
        },
        sensors: SensorInfo {
            location_poll_interval_ms: blueprint.location.poll_interval_ms,
            location_min_distance_m: blueprint.location.min_distance_m,
            magnetometer_update_interval_ms: mag.update_interval_ms,
            fine_threshold: mag.fine_threshold,
            coarse_threshold: mag.coarse_threshold,
            calibration_window_s: mag.calibration_window_s,
            smoothing: mag.smoothing,
            calibrate_on_start: mag.calibrate_on_start,
        },
        schedule: ScheduleInfo {
            tick_interval_ms: blueprint.schedule.tick_interval_ms,
            timetable_source: ConfiguredTimetable::from_blueprint(blueprint).describe(),
            timetable,
        },
        sinks,
    }
}

fn print_config_info(info: &ConfigInfo) {
    println!("╔══════════════════════════════════════════════════════════════╗");
    println!("║               Qibla Compass Configuration                    ║");
    println!("╚══════════════════════════════════════════════════════════════╝\n");

    // Observer
    println!("📍 Observer");
    println!("   ├─ Version: {}", info.version);
    println!(
        "   ├─ Position: {:.4}, {:.4}",
        info.observer.latitude, info.observer.longitude
    );
    match info.observer.qibla {
        Some(ref fix) if fix.is_at_kaaba() => println!("   └─ Qibla: at the Kaaba"),
        Some(ref fix) => println!(
            "   └─ Qibla: {:.2}°, {:.2} km",
            fix.bearing_deg, fix.distance_km
        ),
        None => println!("   └─ Qibla: (invalid observer)"),
    }

    // Sensors
    let sensors = &info.sensors;
    println!("\n🧭 Sensors");
    println!(
        "   ├─ Location: every {} ms, min distance {} m",
        sensors.location_poll_interval_ms, sensors.location_min_distance_m
    );
    println!(
        "   ├─ Magnetometer: every {} ms, smoothing {}",
        sensors.magnetometer_update_interval_ms, sensors.smoothing
    );
    println!(
        "   └─ Dead zone: fine {} / coarse {} ({} s calibration{})",
        sensors.fine_threshold,
        sensors.coarse_threshold,
        sensors.calibration_window_s,
        if sensors.calibrate_on_start { ", on start" } else { "" }
    );

    // Schedule
    let schedule = &info.schedule;
    println!("\n🕌 Schedule");
    println!("   ├─ Tick: every {} ms", schedule.tick_interval_ms);
    println!("   └─ Timetable: {}", schedule.timetable_source);
    for (i, prayer) in schedule.timetable.iter().enumerate() {
        let prefix = if i == schedule.timetable.len() - 1 { "└─" } else { "├─" };
        println!("        {} {:<8} {}", prefix, prayer.name, prayer.time);
    }

    // Sinks
    if !info.sinks.is_empty() {
        println!("\n📤 Sinks ({})", info.sinks.len());
        for (i, sink) in info.sinks.iter().enumerate() {
            let prefix = if i == info.sinks.len() - 1 { "└─" } else { "├─" };
            println!(
                "   {} {} ({}, queue {})",
                prefix, sink.name, sink.sink_type, sink.queue_capacity
            );
        }
    }

    println!();
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::RawPrayerEntry;

    fn args(timetable: bool) -> InfoArgs {
        InfoArgs {
            config: "navigator.toml".into(),
            json: true,
            timetable,
            sinks: false,
        }
    }

    #[test]
    fn test_info_lists_normalized_timetable() {
        let blueprint = NavigatorBlueprint {
            timetable: vec![
                RawPrayerEntry::new("Isha", "8:45 PM"),
                RawPrayerEntry::new("Fajr", "05:12 (EET)"),
                RawPrayerEntry::missing("Dhuhr"),
            ],
            ..Default::default()
        };
        let info = build_config_info(&blueprint, &args(true));
        let names: Vec<_> = info.schedule.timetable.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["Fajr", "Isha"]);
        assert_eq!(info.schedule.timetable[1].time, "20:45");
    }

    #[test]
    fn test_default_observer_is_at_kaaba() {
        let info = build_config_info(&NavigatorBlueprint::default(), &args(false));
        assert!(info.observer.qibla.unwrap().is_at_kaaba());
        assert!(info.schedule.timetable.is_empty());
    }
}
