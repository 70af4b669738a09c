//! Dispatcher error types

use thiserror::Error;

/// Dispatcher-specific errors
#[derive(Debug, Error)]
pub enum DispatcherError {
    /// Sink creation error
    #[error("failed to create sink '{name}': {message}")]
    SinkCreation { name: String, message: String },

    /// Required sink parameter absent from `params`
    #[error("sink '{sink_name}' requires parameter '{param}'")]
    MissingParam {
        sink_name: String,
        param: &'static str,
    },

    /// Sink write error (from contract)
    #[error("sink error: {0}")]
    Contract(#[from] contracts::ContractError),

    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl DispatcherError {
    /// Create a sink creation error
    pub fn sink_creation(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::SinkCreation {
            name: name.into(),
            message: message.into(),
        }
    }

    pub fn missing_param(sink_name: impl Into<String>, param: &'static str) -> Self {
        Self::MissingParam {
            sink_name: sink_name.into(),
            param,
        }
    }
}
