//! `qibla` command implementation.

use anyhow::{Context, Result};
use serde::Serialize;

use contracts::{GeoPoint, HeadingReading, QiblaFix};
use qibla_navigator::{heading_reading, normalize_degrees, qibla_fix};

use crate::cli::QiblaArgs;
use crate::error::CliError;

#[derive(Serialize)]
struct QiblaOutput {
    #[serde(flatten)]
    fix: QiblaFix,
    at_kaaba: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    alignment: Option<HeadingReading>,
}

/// Execute the `qibla` command
pub fn run_qibla(args: &QiblaArgs) -> Result<()> {
    let output = compute(args)?;

    if args.json {
        let json =
            serde_json::to_string_pretty(&output).context("Failed to serialize qibla fix")?;
        println!("{}", json);
    } else {
        print_fix(&output);
    }
    Ok(())
}

fn compute(args: &QiblaArgs) -> Result<QiblaOutput, CliError> {
    let fix = qibla_fix(GeoPoint::new(args.lat, args.lon)).map_err(CliError::InvalidObserver)?;
    let alignment = args
        .heading
        .map(|heading| heading_reading(Some(fix.bearing_deg), Some(normalize_degrees(heading)), false));

    Ok(QiblaOutput {
        fix,
        at_kaaba: fix.is_at_kaaba(),
        alignment,
    })
}

fn print_fix(output: &QiblaOutput) {
    let fix = &output.fix;
    println!("🧭 Qibla");
    println!("   ├─ Observer: {}", fix.observer);
    if output.at_kaaba {
        println!("   ├─ Bearing: - (at the Kaaba)");
    } else {
        println!("   ├─ Bearing: {:.2}°", fix.bearing_deg);
    }

    match output.alignment {
        Some(reading) => {
            println!("   ├─ Distance: {:.2} km", fix.distance_km);
            println!(
                "   └─ Alignment: {} (Δ {:.1}°)",
                reading.tier.label(),
                reading.delta_deg.unwrap_or_default()
            );
        }
        None => println!("   └─ Distance: {:.2} km", fix.distance_km),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::AlignmentTier;

    fn args(lat: f64, lon: f64, heading: Option<f64>) -> QiblaArgs {
        QiblaArgs {
            lat,
            lon,
            heading,
            json: false,
        }
    }

    #[test]
    fn test_london_fix_with_alignment() {
        let output = compute(&args(51.5074, -0.1278, Some(120.0))).unwrap();
        assert!((output.fix.bearing_deg - 118.99).abs() < 0.05);
        assert!(!output.at_kaaba);
        assert_eq!(output.alignment.unwrap().tier, AlignmentTier::Perfect);
    }

    #[test]
    fn test_heading_is_normalized() {
        let output = compute(&args(51.5074, -0.1278, Some(-240.0))).unwrap();
        // -240 == 120
        assert_eq!(output.alignment.unwrap().tier, AlignmentTier::Perfect);
    }

    #[test]
    fn test_invalid_observer() {
        assert!(matches!(
            compute(&args(95.0, 0.0, None)),
            Err(CliError::InvalidObserver(_))
        ));
    }
}
