//! `validate` command implementation.

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::info;

use contracts::{NavigatorBlueprint, SinkType};

use crate::cli::ValidateArgs;
use qibla_compass::ConfiguredTimetable;

/// Validation result for JSON output
#[derive(Serialize)]
struct ValidationResult {
    valid: bool,
    config_path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    warnings: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    summary: Option<ConfigSummary>,
}

#[derive(Serialize)]
struct ConfigSummary {
    version: String,
    observer: String,
    timetable_source: String,
    timetable_entries: usize,
    sink_count: usize,
}

/// Execute the `validate` command
pub fn run_validate(args: &ValidateArgs) -> Result<()> {
    info!(config = %args.config.display(), "Validating configuration");

    let result = validate_config(args);

    if args.json {
        let json = serde_json::to_string_pretty(&result)
            .context("Failed to serialize validation result")?;
        println!("{}", json);
    } else {
        print_validation_result(&result);
    }

    if result.valid {
        Ok(())
    } else {
        anyhow::bail!("Configuration validation failed")
    }
}

fn validate_config(args: &ValidateArgs) -> ValidationResult {
    let config_path = args.config.display().to_string();

    // Check file exists
    if !args.config.exists() {
        return ValidationResult {
            valid: false,
            config_path,
            error: Some(format!("File not found: {}", args.config.display())),
            warnings: None,
            summary: None,
        };
    }

    // Try to load and validate
    match config_loader::ConfigLoader::load_from_path(&args.config) {
        Ok(blueprint) => {
            let warnings = collect_warnings(&blueprint);
            let timetable = ConfiguredTimetable::from_blueprint(&blueprint);

            ValidationResult {
                valid: true,
                config_path,
                error: None,
                warnings: if warnings.is_empty() {
                    None
                } else {
                    Some(warnings)
                },
                summary: Some(ConfigSummary {
                    version: format!("{:?}", blueprint.version),
                    observer: blueprint.observer.point().to_string(),
                    timetable_source: timetable.describe(),
                    timetable_entries: blueprint.timetable.len(),
                    sink_count: blueprint.sinks.len(),
                }),
            }
        }
        Err(e) => ValidationResult {
            valid: false,
            config_path,
            error: Some(e.to_string()),
            warnings: None,
            summary: None,
        },
    }
}

/// Collect configuration warnings (non-fatal issues)
fn collect_warnings(blueprint: &NavigatorBlueprint) -> Vec<String> {
    let mut warnings = Vec::new();

    if blueprint.sinks.is_empty() {
        warnings.push("No sinks configured - frames will only be logged".to_string());
    }

    if blueprint.timetable.is_empty() && blueprint.timetable_file.is_none() {
        warnings.push("No timetable configured - prayer status will report no data".to_string());
    }

    if !blueprint.timetable.is_empty() && blueprint.timetable_file.is_some() {
        warnings.push("Both timetable and timetable_file set - inline timetable wins".to_string());
    }

    let missing: Vec<&str> = blueprint
        .timetable
        .iter()
        .filter(|entry| entry.time.is_none())
        .map(|entry| entry.name.as_str())
        .collect();
    if !missing.is_empty() {
        warnings.push(format!("Timetable entries without a time: {}", missing.join(", ")));
    }

    if let Some(ref path) = blueprint.timetable_file {
        if !path.exists() {
            warnings.push(format!("timetable_file not found: {}", path.display()));
        }
    }

    let file_sinks = blueprint
        .sinks
        .iter()
        .filter(|s| s.sink_type == SinkType::File)
        .count();
    if file_sinks > 1 {
        warnings.push(format!("{file_sinks} file sinks configured - check base_path/file_name"));
    }

    warnings
}

fn print_validation_result(result: &ValidationResult) {
    if result.valid {
        println!("✓ Configuration is valid: {}", result.config_path);

        if let Some(ref summary) = result.summary {
            println!("\n  Version: {}", summary.version);
            println!("  Observer: {}", summary.observer);
            println!("  Timetable: {}", summary.timetable_source);
            println!("  Inline entries: {}", summary.timetable_entries);
            println!("  Sinks: {}", summary.sink_count);
        }

        if let Some(ref warnings) = result.warnings {
            println!("\n⚠ Warnings:");
            for warning in warnings {
                println!("  - {}", warning);
            }
        }
    } else {
        println!("✗ Configuration is invalid: {}", result.config_path);
        if let Some(ref error) = result.error {
            println!("\n  Error: {}", error);
        }
    }
}
