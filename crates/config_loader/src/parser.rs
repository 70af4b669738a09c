//! 配置解析模块
//!
//! 支持 TOML (主要) 和 JSON (可选) 格式。

use contracts::{ContractError, NavigatorBlueprint};

/// 配置文件格式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    /// TOML 格式 (推荐)
    Toml,
    /// JSON 格式
    Json,
}

impl ConfigFormat {
    /// 从文件扩展名推断格式
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "toml" => Some(Self::Toml),
            "json" => Some(Self::Json),
            _ => None,
        }
    }
}

/// 解析 TOML 格式配置
pub fn parse_toml(content: &str) -> Result<NavigatorBlueprint, ContractError> {
    toml::from_str(content).map_err(|e| ContractError::ConfigParse {
        message: format!("TOML parse error: {e}"),
        source: Some(Box::new(e)),
    })
}

/// 解析 JSON 格式配置
pub fn parse_json(content: &str) -> Result<NavigatorBlueprint, ContractError> {
    serde_json::from_str(content).map_err(|e| ContractError::ConfigParse {
        message: format!("JSON parse error: {e}"),
        source: Some(Box::new(e)),
    })
}

/// 根据格式解析配置
pub fn parse(content: &str, format: ConfigFormat) -> Result<NavigatorBlueprint, ContractError> {
    match format {
        ConfigFormat::Toml => parse_toml(content),
        ConfigFormat::Json => parse_json(content),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::{SinkType, KAABA};

    #[test]
    fn test_parse_toml_minimal() {
        let content = r#"
[observer]
latitude = 51.5074
longitude = -0.1278

[[timetable]]
name = "Fajr"
time = "05:00"

[[timetable]]
name = "Isha"

[[sinks]]
name = "console"
sink_type = "log"
"#;
        let result = parse_toml(content);
        assert!(result.is_ok(), "Failed: {:?}", result.err());
        let bp = result.unwrap();
        assert_eq!(bp.observer.latitude, 51.5074);
        assert_eq!(bp.timetable.len(), 2);
        assert_eq!(bp.timetable[1].time, None);
        assert_eq!(bp.sinks[0].sink_type, SinkType::Log);
        assert_eq!(bp.magnetometer.fine_threshold, 2.0);
    }

    #[test]
    fn test_parse_empty_toml_uses_defaults() {
        let bp = parse_toml("").unwrap();
        assert_eq!(bp.observer.point(), KAABA);
        assert!(bp.timetable.is_empty());
        assert!(bp.timetable_file.is_none());
    }

    #[test]
    fn test_parse_json_minimal() {
        let content = r#"{
            "observer": { "latitude": -6.2088, "longitude": 106.8456 },
            "magnetometer": { "smoothing": 0.5, "calibrate_on_start": true },
            "timetable_file": "timings.json",
            "sinks": [{ "name": "out", "sink_type": "file", "params": { "base_path": "./out" } }]
        }"#;
        let result = parse_json(content);
        assert!(result.is_ok(), "Failed: {:?}", result.err());
        let bp = result.unwrap();
        assert_eq!(bp.magnetometer.smoothing, 0.5);
        assert!(bp.magnetometer.calibrate_on_start);
        assert_eq!(bp.sinks[0].queue_capacity, 100);
    }

    #[test]
    fn test_parse_toml_syntax_error() {
        let content = "invalid toml [[[";
        let result = parse_toml(content);
        assert!(result.is_err());
        let err = result.unwrap_err();
        assert!(matches!(err, ContractError::ConfigParse { .. }));
    }

    #[test]
    fn test_parse_unknown_sink_type() {
        let content = r#"
[[sinks]]
name = "udp"
sink_type = "network"
"#;
        assert!(matches!(
            parse_toml(content),
            Err(ContractError::ConfigParse { .. })
        ));
    }

    #[test]
    fn test_format_from_extension() {
        assert_eq!(
            ConfigFormat::from_extension("toml"),
            Some(ConfigFormat::Toml)
        );
        assert_eq!(
            ConfigFormat::from_extension("TOML"),
            Some(ConfigFormat::Toml)
        );
        assert_eq!(
            ConfigFormat::from_extension("json"),
            Some(ConfigFormat::Json)
        );
        assert_eq!(ConfigFormat::from_extension("yaml"), None);
    }
}
