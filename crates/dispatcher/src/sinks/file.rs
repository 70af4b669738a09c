//! FileSink - appends frames to disk as JSON lines

use contracts::{ContractError, NavigationFrame, SnapshotSink};
use std::collections::HashMap;
use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, error, instrument};

use crate::error::DispatcherError;

const DEFAULT_FILE_NAME: &str = "frames.jsonl";

/// Configuration for FileSink
#[derive(Debug, Clone)]
pub struct FileSinkConfig {
    /// Output directory
    pub base_path: PathBuf,
    /// File name inside `base_path`
    pub file_name: String,
}

impl FileSinkConfig {
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
            file_name: DEFAULT_FILE_NAME.to_string(),
        }
    }

    /// Create config from params map (`base_path` required, `file_name` optional)
    pub fn from_params(
        sink_name: &str,
        params: &HashMap<String, String>,
    ) -> Result<Self, DispatcherError> {
        let base_path = params
            .get("base_path")
            .map(PathBuf::from)
            .ok_or_else(|| DispatcherError::missing_param(sink_name, "base_path"))?;
        let file_name = params
            .get("file_name")
            .cloned()
            .unwrap_or_else(|| DEFAULT_FILE_NAME.to_string());

        Ok(Self {
            base_path,
            file_name,
        })
    }

    pub fn file_path(&self) -> PathBuf {
        self.base_path.join(&self.file_name)
    }
}

/// Sink that writes one JSON object per frame
pub struct FileSink {
    name: String,
    path: PathBuf,
    writer: Option<BufWriter<File>>,
    lines: u64,
}

impl FileSink {
    /// Create a new FileSink, appending to an existing file
    pub fn new(name: impl Into<String>, config: FileSinkConfig) -> std::io::Result<Self> {
        // Create base directory if it doesn't exist
        fs::create_dir_all(&config.base_path)?;
        let path = config.file_path();
        let file = OpenOptions::new().create(true).append(true).open(&path)?;

        Ok(Self {
            name: name.into(),
            path,
            writer: Some(BufWriter::new(file)),
            lines: 0,
        })
    }

    /// Create from params map (for factory)
    pub fn from_params(
        name: impl Into<String>,
        params: &HashMap<String, String>,
    ) -> Result<Self, DispatcherError> {
        let name = name.into();
        let config = FileSinkConfig::from_params(&name, params)?;
        Ok(Self::new(name, config)?)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Frames written since open
    pub fn lines_written(&self) -> u64 {
        self.lines
    }

    fn append_line(&mut self, frame: &NavigationFrame) -> std::io::Result<()> {
        let writer = self
            .writer
            .as_mut()
            .ok_or_else(|| std::io::Error::other("sink already closed"))?;
        serde_json::to_writer(&mut *writer, frame)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        writer.write_all(b"\n")?;
        self.lines += 1;
        Ok(())
    }

    fn persist_frame(&mut self, frame: &NavigationFrame) -> Result<(), ContractError> {
        self.append_line(frame).map_err(|e| {
            error!(sink = %self.name, frame_id = frame.frame_id, error = %e, "Write failed");
            ContractError::sink_write(&self.name, e.to_string())
        })
    }
}

impl SnapshotSink for FileSink {
    fn name(&self) -> &str {
        &self.name
    }

    #[instrument(
        name = "file_sink_write",
        skip(self, frame),
        fields(sink = %self.name, frame_id = frame.frame_id)
    )]
    async fn write(&mut self, frame: &NavigationFrame) -> Result<(), ContractError> {
        self.persist_frame(frame)
    }

    #[instrument(name = "file_sink_flush", skip(self))]
    async fn flush(&mut self) -> Result<(), ContractError> {
        if let Some(writer) = self.writer.as_mut() {
            writer
                .flush()
                .map_err(|e| ContractError::sink_write(&self.name, e.to_string()))?;
        }
        Ok(())
    }

    #[instrument(name = "file_sink_close", skip(self))]
    async fn close(&mut self) -> Result<(), ContractError> {
        if let Some(mut writer) = self.writer.take() {
            writer
                .flush()
                .map_err(|e| ContractError::sink_write(&self.name, e.to_string()))?;
        }
        debug!(sink = %self.name, lines = self.lines, path = ?self.path, "FileSink closed");
        Ok(())
    }
}
