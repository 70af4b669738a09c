//! Ingestion 错误类型

use std::path::PathBuf;

use thiserror::Error;

/// Ingestion 错误
#[derive(Debug, Error)]
pub enum IngestionError {
    /// 传感器能力检查失败
    #[error("sensor {source_name} is not available")]
    SensorUnavailable {
        /// 数据源名称
        source_name: String,
    },

    /// 回放文件加载失败
    #[error("failed to load replay file {path:?}: {message}")]
    ReplayLoad {
        /// 文件路径
        path: PathBuf,
        /// 错误消息
        message: String,
    },

    /// 数据源已在监听
    #[error("source {source_name} is already attached")]
    AlreadyAttached {
        /// 数据源名称
        source_name: String,
    },
}

impl IngestionError {
    pub fn replay_load(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::ReplayLoad {
            path: path.into(),
            message: message.into(),
        }
    }
}

impl From<IngestionError> for contracts::ContractError {
    fn from(err: IngestionError) -> Self {
        match err {
            IngestionError::SensorUnavailable { source_name } => {
                contracts::ContractError::sensor_unavailable(source_name)
            }
            other => contracts::ContractError::Other(other.to_string()),
        }
    }
}

/// Ingestion Result 类型别名
pub type Result<T> = std::result::Result<T, IngestionError>;
