//! 配置校验模块
//!
//! 校验规则：
//! - observer 坐标有限且在范围内
//! - 各 interval > 0
//! - 0 <= fine_threshold <= coarse_threshold, 0 < calibration_window_s <= MAX_CALIBRATION_WINDOW_S
//! - 0 < smoothing <= 1, min_distance_m >= 0
//! - timetable 名称非空且唯一
//! - sink 名称非空且唯一, file sink 需要 base_path

use std::collections::HashSet;

use contracts::{ContractError, NavigatorBlueprint, SinkType, MAX_CALIBRATION_WINDOW_S};

/// 校验 NavigatorBlueprint 配置
///
/// 返回第一个遇到的错误，或 Ok(())。
pub fn validate(blueprint: &NavigatorBlueprint) -> Result<(), ContractError> {
    validate_observer(blueprint)?;
    validate_intervals(blueprint)?;
    validate_magnetometer(blueprint)?;
    validate_location(blueprint)?;
    validate_timetable(blueprint)?;
    validate_sinks(blueprint)?;
    Ok(())
}

/// 校验 fallback observer 坐标
fn validate_observer(blueprint: &NavigatorBlueprint) -> Result<(), ContractError> {
    blueprint
        .observer
        .point()
        .validated()
        .map(|_| ())
        .map_err(|e| ContractError::config_validation("observer", e.to_string()))
}

/// 校验轮询间隔
fn validate_intervals(blueprint: &NavigatorBlueprint) -> Result<(), ContractError> {
    let intervals = [
        ("location.poll_interval_ms", blueprint.location.poll_interval_ms),
        (
            "magnetometer.update_interval_ms",
            blueprint.magnetometer.update_interval_ms,
        ),
        ("schedule.tick_interval_ms", blueprint.schedule.tick_interval_ms),
    ];
    for (field, value) in intervals {
        if value == 0 {
            return Err(ContractError::config_validation(
                field,
                "interval must be > 0",
            ));
        }
    }
    Ok(())
}

/// 校验磁力计校准参数
fn validate_magnetometer(blueprint: &NavigatorBlueprint) -> Result<(), ContractError> {
    let mag = &blueprint.magnetometer;

    if !mag.fine_threshold.is_finite() || mag.fine_threshold < 0.0 {
        return Err(ContractError::config_validation(
            "magnetometer.fine_threshold",
            format!("fine_threshold must be >= 0, got {}", mag.fine_threshold),
        ));
    }

    if !mag.coarse_threshold.is_finite() || mag.fine_threshold > mag.coarse_threshold {
        return Err(ContractError::config_validation(
            "magnetometer.fine_threshold / magnetometer.coarse_threshold",
            format!(
                "fine_threshold ({}) must be <= coarse_threshold ({})",
                mag.fine_threshold, mag.coarse_threshold
            ),
        ));
    }

    if !(mag.calibration_window_s > 0.0 && mag.calibration_window_s <= MAX_CALIBRATION_WINDOW_S) {
        return Err(ContractError::config_validation(
            "magnetometer.calibration_window_s",
            format!(
                "calibration_window_s must be in (0, {}], got {}",
                MAX_CALIBRATION_WINDOW_S, mag.calibration_window_s
            ),
        ));
    }

    // NaN 不满足任何比较，单独排除
    if !(mag.smoothing > 0.0 && mag.smoothing <= 1.0) {
        return Err(ContractError::config_validation(
            "magnetometer.smoothing",
            format!("smoothing must be in (0, 1], got {}", mag.smoothing),
        ));
    }

    Ok(())
}

/// 校验位置过滤距离
fn validate_location(blueprint: &NavigatorBlueprint) -> Result<(), ContractError> {
    let min_distance = blueprint.location.min_distance_m;
    if !min_distance.is_finite() || min_distance < 0.0 {
        return Err(ContractError::config_validation(
            "location.min_distance_m",
            format!("min_distance_m must be >= 0, got {min_distance}"),
        ));
    }
    Ok(())
}

/// 校验内联时间表
fn validate_timetable(blueprint: &NavigatorBlueprint) -> Result<(), ContractError> {
    let mut seen = HashSet::new();
    for (idx, entry) in blueprint.timetable.iter().enumerate() {
        if entry.name.trim().is_empty() {
            return Err(ContractError::config_validation(
                format!("timetable[{idx}].name"),
                "prayer name cannot be empty",
            ));
        }
        if !seen.insert(entry.name.as_str()) {
            return Err(ContractError::config_validation(
                format!("timetable[name={}]", entry.name),
                "duplicate prayer name",
            ));
        }
    }
    Ok(())
}

/// 校验 sink 配置
fn validate_sinks(blueprint: &NavigatorBlueprint) -> Result<(), ContractError> {
    let mut seen = HashSet::new();
    for (idx, sink) in blueprint.sinks.iter().enumerate() {
        if sink.name.is_empty() {
            return Err(ContractError::config_validation(
                format!("sinks[{}].name", idx),
                "sink name cannot be empty",
            ));
        }
        if !seen.insert(sink.name.as_str()) {
            return Err(ContractError::config_validation(
                format!("sinks[name={}]", sink.name),
                "duplicate sink name",
            ));
        }
        if sink.sink_type == SinkType::File && !sink.params.contains_key("base_path") {
            return Err(ContractError::config_validation(
                format!("sinks[{}].params.base_path", sink.name),
                "file sink requires base_path",
            ));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::{ObserverConfig, RawPrayerEntry, SinkConfig};

    fn minimal_blueprint() -> NavigatorBlueprint {
        NavigatorBlueprint {
            observer: ObserverConfig {
                latitude: 51.5074,
                longitude: -0.1278,
            },
            timetable: vec![
                RawPrayerEntry::new("Fajr", "05:00"),
                RawPrayerEntry::new("Dhuhr", "12:15"),
            ],
            sinks: vec![SinkConfig {
                name: "log".into(),
                sink_type: SinkType::Log,
                queue_capacity: 100,
                params: Default::default(),
            }],
            ..Default::default()
        }
    }

    #[test]
    fn test_valid_config() {
        let bp = minimal_blueprint();
        assert!(validate(&bp).is_ok());
    }

    #[test]
    fn test_observer_out_of_range() {
        let mut bp = minimal_blueprint();
        bp.observer.latitude = 95.0;
        let err = validate(&bp).unwrap_err().to_string();
        assert!(err.contains("observer"), "got: {err}");
        assert!(err.contains("latitude"), "got: {err}");
    }

    #[test]
    fn test_zero_interval() {
        let mut bp = minimal_blueprint();
        bp.schedule.tick_interval_ms = 0;
        let err = validate(&bp).unwrap_err().to_string();
        assert!(err.contains("schedule.tick_interval_ms"), "got: {err}");
    }

    #[test]
    fn test_threshold_ordering() {
        let mut bp = minimal_blueprint();
        bp.magnetometer.fine_threshold = 6.0;
        let err = validate(&bp).unwrap_err().to_string();
        assert!(err.contains("must be <= coarse_threshold"), "got: {err}");
    }

    #[test]
    fn test_calibration_window_range() {
        let mut bp = minimal_blueprint();
        bp.magnetometer.calibration_window_s = 1e19;
        let err = validate(&bp).unwrap_err().to_string();
        assert!(err.contains("calibration_window_s"), "got: {err}");
        bp.magnetometer.calibration_window_s = f64::INFINITY;
        assert!(validate(&bp).is_err());
        bp.magnetometer.calibration_window_s = 0.0;
        assert!(validate(&bp).is_err());
        bp.magnetometer.calibration_window_s = MAX_CALIBRATION_WINDOW_S;
        assert!(validate(&bp).is_ok());
    }

    #[test]
    fn test_smoothing_range() {
        let mut bp = minimal_blueprint();
        bp.magnetometer.smoothing = 0.0;
        assert!(validate(&bp).is_err());
        bp.magnetometer.smoothing = f64::NAN;
        assert!(validate(&bp).is_err());
        bp.magnetometer.smoothing = 1.0;
        assert!(validate(&bp).is_ok());
    }

    #[test]
    fn test_negative_min_distance() {
        let mut bp = minimal_blueprint();
        bp.location.min_distance_m = -1.0;
        let err = validate(&bp).unwrap_err().to_string();
        assert!(err.contains("min_distance_m"), "got: {err}");
    }

    #[test]
    fn test_duplicate_prayer_name() {
        let mut bp = minimal_blueprint();
        bp.timetable.push(RawPrayerEntry::new("Fajr", "05:30"));
        let err = validate(&bp).unwrap_err().to_string();
        assert!(err.contains("duplicate prayer name"), "got: {err}");
    }

    #[test]
    fn test_empty_sink_name() {
        let mut bp = minimal_blueprint();
        bp.sinks[0].name = String::new();
        let result = validate(&bp);
        assert!(result.is_err());
        let err = result.unwrap_err().to_string();
        assert!(err.contains("cannot be empty"), "got: {err}");
    }

    #[test]
    fn test_file_sink_requires_base_path() {
        let mut bp = minimal_blueprint();
        bp.sinks.push(SinkConfig {
            name: "jsonl".into(),
            sink_type: SinkType::File,
            queue_capacity: 10,
            params: Default::default(),
        });
        let err = validate(&bp).unwrap_err().to_string();
        assert!(err.contains("requires base_path"), "got: {err}");
    }
}
