//! # Config Loader
//!
//! Configuration loading and parsing module.
//!
//! Responsibilities:
//! - Parse TOML/JSON configuration files
//! - Validate configuration legality
//! - Generate `NavigatorBlueprint`
//!
//! # Example
//!
//! ```no_run
//! use config_loader::ConfigLoader;
//! use std::path::Path;
//!
//! let blueprint = ConfigLoader::load_from_path(Path::new("navigator.toml")).unwrap();
//! println!("Observer: {}", blueprint.observer.point());
//! ```

mod parser;
mod validator;

pub use contracts::NavigatorBlueprint;
pub use parser::ConfigFormat;

use contracts::ContractError;
use std::path::Path;

/// Configuration loader
///
/// Provides static methods to load configuration from files or strings.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from file path
    ///
    /// Automatically detects format from file extension (.toml / .json).
    /// A relative `timetable_file` is resolved against the config file's directory.
    ///
    /// # Errors
    /// - File read failure
    /// - Unsupported format
    /// - Parse failure
    /// - Validation failure
    pub fn load_from_path(path: &Path) -> Result<NavigatorBlueprint, ContractError> {
        let format = Self::detect_format(path)?;
        let content = Self::read_file(path)?;
        let mut blueprint = Self::load_from_str(&content, format)?;
        Self::resolve_relative_paths(&mut blueprint, path);
        Ok(blueprint)
    }

    /// Load configuration from string
    ///
    /// # Errors
    /// - Parse failure
    /// - Validation failure
    pub fn load_from_str(
        content: &str,
        format: ConfigFormat,
    ) -> Result<NavigatorBlueprint, ContractError> {
        Self::parse_and_validate(content, format)
    }

    /// Validate an already-built blueprint (e.g. after CLI overrides)
    pub fn validate(blueprint: &NavigatorBlueprint) -> Result<(), ContractError> {
        validator::validate(blueprint)
    }

    /// Serialize NavigatorBlueprint to TOML string
    pub fn to_toml(blueprint: &NavigatorBlueprint) -> Result<String, ContractError> {
        toml::to_string_pretty(blueprint)
            .map_err(|e| ContractError::config_parse(format!("TOML serialize error: {e}")))
    }

    /// Serialize NavigatorBlueprint to JSON string
    pub fn to_json(blueprint: &NavigatorBlueprint) -> Result<String, ContractError> {
        serde_json::to_string_pretty(blueprint)
            .map_err(|e| ContractError::config_parse(format!("JSON serialize error: {e}")))
    }
}

impl ConfigLoader {
    /// Infer configuration format from file extension
    fn detect_format(path: &Path) -> Result<ConfigFormat, ContractError> {
        let ext = path.extension().and_then(|e| e.to_str()).ok_or_else(|| {
            ContractError::config_parse("cannot determine file format from extension")
        })?;

        ConfigFormat::from_extension(ext).ok_or_else(|| {
            ContractError::config_parse(format!("unsupported config format: .{ext}"))
        })
    }

    /// Read configuration file content
    fn read_file(path: &Path) -> Result<String, ContractError> {
        Ok(std::fs::read_to_string(path)?)
    }

    fn resolve_relative_paths(blueprint: &mut NavigatorBlueprint, config_path: &Path) {
        let Some(base) = config_path.parent() else {
            return;
        };
        if let Some(file) = blueprint.timetable_file.as_mut() {
            if file.is_relative() {
                *file = base.join(&*file);
            }
        }
    }

    /// Parse and validate configuration content
    fn parse_and_validate(
        content: &str,
        format: ConfigFormat,
    ) -> Result<NavigatorBlueprint, ContractError> {
        let blueprint = parser::parse(content, format)?;
        validator::validate(&blueprint)?;
        Ok(blueprint)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const MINIMAL_TOML: &str = r#"
version = "V1"

[observer]
latitude = 21.4225
longitude = 39.8262

[location]
poll_interval_ms = 5000
min_distance_m = 10.0

[magnetometer]
update_interval_ms = 100
fine_threshold = 2.0
coarse_threshold = 5.0
calibration_window_s = 10.0

[schedule]
tick_interval_ms = 1000

[[timetable]]
name = "Fajr"
time = "05:00"

[[timetable]]
name = "Dhuhr"
time = "12:15"

[[sinks]]
name = "console"
sink_type = "log"
"#;

    #[test]
    fn test_load_from_str_toml() {
        let result = ConfigLoader::load_from_str(MINIMAL_TOML, ConfigFormat::Toml);
        assert!(result.is_ok(), "Failed: {:?}", result.err());
        let bp = result.unwrap();
        assert_eq!(bp.timetable.len(), 2);
        assert_eq!(bp.sinks[0].name, "console");
    }

    #[test]
    fn test_round_trip_toml() {
        let bp = ConfigLoader::load_from_str(MINIMAL_TOML, ConfigFormat::Toml).unwrap();
        let serialized = ConfigLoader::to_toml(&bp).unwrap();
        let bp2 = ConfigLoader::load_from_str(&serialized, ConfigFormat::Toml).unwrap();
        assert_eq!(bp, bp2);
    }

    #[test]
    fn test_round_trip_json() {
        let bp = ConfigLoader::load_from_str(MINIMAL_TOML, ConfigFormat::Toml).unwrap();
        let json = ConfigLoader::to_json(&bp).unwrap();
        let bp2 = ConfigLoader::load_from_str(&json, ConfigFormat::Json).unwrap();
        assert_eq!(bp, bp2);
    }

    #[test]
    fn test_validation_runs_after_parse() {
        let content = r#"
[[timetable]]
name = "Fajr"
time = "05:00"

[[timetable]]
name = "Fajr"
time = "05:10"
"#;
        let result = ConfigLoader::load_from_str(content, ConfigFormat::Toml);
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("duplicate"));
    }

    #[test]
    fn test_load_from_path_resolves_timetable_file() {
        let dir = tempfile::tempdir().unwrap();
        let config_path = dir.path().join("navigator.toml");
        let mut file = std::fs::File::create(&config_path).unwrap();
        writeln!(file, "timetable_file = \"timings.json\"").unwrap();

        let bp = ConfigLoader::load_from_path(&config_path).unwrap();
        assert_eq!(bp.timetable_file, Some(dir.path().join("timings.json")));
    }

    #[test]
    fn test_load_from_path_unsupported_extension() {
        let err = ConfigLoader::load_from_path(Path::new("navigator.yaml")).unwrap_err();
        assert!(err.to_string().contains("unsupported config format"));
    }
}
