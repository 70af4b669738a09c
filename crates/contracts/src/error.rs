//! Layered error definitions
//!
//! Categorized by source: config / coordinate / sensor / provider / sink

use thiserror::Error;

/// Unified error type
#[derive(Debug, Error)]
pub enum ContractError {
    // ===== Configuration Errors =====
    /// Configuration parse error
    #[error("config parse error: {message}")]
    ConfigParse {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Configuration validation error
    #[error("config validation error at '{field}': {message}")]
    ConfigValidation { field: String, message: String },

    // ===== Geodesy Errors =====
    /// Latitude/longitude is non-finite or outside its valid range
    #[error("invalid coordinate: {field} = {value}")]
    InvalidCoordinate { field: &'static str, value: f64 },

    // ===== Collaborator Errors =====
    /// A sensor failed the capability check
    #[error("sensor unavailable: {sensor}")]
    SensorUnavailable { sensor: String },

    /// Location / timetable provider failure
    #[error("provider '{provider}' failed: {message}")]
    Provider { provider: String, message: String },

    // ===== Sink Errors =====
    /// Sink write error
    #[error("sink '{sink_name}' write error: {message}")]
    SinkWrite { sink_name: String, message: String },

    // ===== General Errors =====
    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Other error
    #[error("{0}")]
    Other(String),
}

impl ContractError {
    /// Create configuration parse error
    pub fn config_parse(message: impl Into<String>) -> Self {
        Self::ConfigParse {
            message: message.into(),
            source: None,
        }
    }

    /// Create configuration validation error
    pub fn config_validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ConfigValidation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create invalid coordinate error
    pub fn invalid_coordinate(field: &'static str, value: f64) -> Self {
        Self::InvalidCoordinate { field, value }
    }

    /// Create sensor unavailable error
    pub fn sensor_unavailable(sensor: impl Into<String>) -> Self {
        Self::SensorUnavailable {
            sensor: sensor.into(),
        }
    }

    /// Create provider error
    pub fn provider(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Provider {
            provider: provider.into(),
            message: message.into(),
        }
    }

    /// Create sink write error
    pub fn sink_write(sink_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::SinkWrite {
            sink_name: sink_name.into(),
            message: message.into(),
        }
    }
}
