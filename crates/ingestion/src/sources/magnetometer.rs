//! Mock and replay magnetometer sources
//!
//! Used for testing and development without a physical sensor.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use contracts::{MagnetometerCallback, MagnetometerSource, RawMagnetometerSample, Subscription};
use tracing::info;

use crate::error::{IngestionError, Result};
use crate::sources::stream::{spawn_stream, SharedInterval};

/// Field strength used by generated samples (µT)
const DEFAULT_FIELD_STRENGTH: f64 = 40.0;

/// Heading pattern of a mock magnetometer
#[derive(Debug, Clone, PartialEq)]
pub enum HeadingPattern {
    /// Constant heading (degrees)
    Fixed(f64),
    /// Start at `start_deg`, turn `step_deg` per sample
    Rotating { start_deg: f64, step_deg: f64 },
    /// Cycle through explicit samples
    Sequence(Vec<RawMagnetometerSample>),
}

/// Mock magnetometer configuration
#[derive(Debug, Clone)]
pub struct MockMagnetometerConfig {
    /// Source name
    pub name: String,
    /// Heading pattern
    pub pattern: HeadingPattern,
    /// Horizontal field magnitude
    pub field_strength: f64,
    /// Result of the capability check
    pub available: bool,
    /// Initial delivery interval
    pub interval: Duration,
}

impl Default for MockMagnetometerConfig {
    fn default() -> Self {
        Self {
            name: "mock_magnetometer".to_string(),
            pattern: HeadingPattern::Fixed(0.0),
            field_strength: DEFAULT_FIELD_STRENGTH,
            available: true,
            interval: Duration::from_millis(100),
        }
    }
}

/// Mock magnetometer
///
/// Generates samples at the requested interval on a tokio task; samples are
/// delivered through the callback, like a platform sensor.
pub struct MockMagnetometer {
    config: MockMagnetometerConfig,
    interval: SharedInterval,
}

impl MockMagnetometer {
    pub fn new(config: MockMagnetometerConfig) -> Self {
        let interval = SharedInterval::new(config.interval);
        Self { config, interval }
    }

    /// Constant heading
    pub fn fixed(heading_deg: f64) -> Self {
        Self::new(MockMagnetometerConfig {
            pattern: HeadingPattern::Fixed(heading_deg),
            ..Default::default()
        })
    }

    /// Slowly turning device
    pub fn rotating(start_deg: f64, step_deg: f64) -> Self {
        Self::new(MockMagnetometerConfig {
            pattern: HeadingPattern::Rotating {
                start_deg,
                step_deg,
            },
            ..Default::default()
        })
    }

    /// Device without a magnetometer
    pub fn unavailable() -> Self {
        Self::new(MockMagnetometerConfig {
            available: false,
            ..Default::default()
        })
    }

    /// Sample pointing at `heading_deg` with the given field strength
    pub fn sample_for_heading(heading_deg: f64, field_strength: f64) -> RawMagnetometerSample {
        let rad = heading_deg.to_radians();
        RawMagnetometerSample::new(field_strength * rad.cos(), field_strength * rad.sin(), 0.0)
    }

    fn generate(pattern: &HeadingPattern, strength: f64, index: u64) -> RawMagnetometerSample {
        match pattern {
            HeadingPattern::Fixed(heading) => Self::sample_for_heading(*heading, strength),
            HeadingPattern::Rotating {
                start_deg,
                step_deg,
            } => Self::sample_for_heading(start_deg + step_deg * index as f64, strength),
            HeadingPattern::Sequence(samples) if samples.is_empty() => {
                Self::sample_for_heading(0.0, strength)
            }
            HeadingPattern::Sequence(samples) => samples[(index as usize) % samples.len()],
        }
    }
}

impl MagnetometerSource for MockMagnetometer {
    fn name(&self) -> &str {
        &self.config.name
    }

    fn is_available(&self) -> bool {
        self.config.available
    }

    fn set_update_interval(&self, interval: Duration) {
        self.interval.set(interval);
    }

    fn watch(&self, callback: MagnetometerCallback) -> Subscription {
        if !self.config.available {
            return Subscription::noop(self.config.name.clone());
        }
        let pattern = self.config.pattern.clone();
        let strength = self.config.field_strength;
        let mut index = 0u64;
        spawn_stream(&self.config.name, self.interval.clone(), move || {
            callback(Self::generate(&pattern, strength, index));
            index += 1;
            true
        })
    }
}

/// Replay configuration
#[derive(Debug, Clone)]
pub struct ReplayConfig {
    /// Delivery interval
    pub interval: Duration,
    /// Restart from the first sample at the end
    pub loop_playback: bool,
}

impl Default for ReplayConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_millis(100),
            loop_playback: false,
        }
    }
}

/// Replay magnetometer - plays back recorded samples
///
/// File format: JSON lines, one `{"x": .., "y": .., "z": ..}` per line.
pub struct ReplayMagnetometer {
    name: String,
    samples: Arc<Vec<RawMagnetometerSample>>,
    config: ReplayConfig,
    interval: SharedInterval,
}

impl ReplayMagnetometer {
    /// Load a recording
    pub fn load(path: &Path, config: ReplayConfig) -> Result<Self> {
        let file = File::open(path).map_err(|e| IngestionError::replay_load(path, e.to_string()))?;
        let reader = BufReader::new(file);

        let mut samples = Vec::new();
        for (line_no, line) in reader.lines().enumerate() {
            let line = line.map_err(|e| IngestionError::replay_load(path, e.to_string()))?;
            if line.trim().is_empty() {
                continue;
            }
            let sample: RawMagnetometerSample = serde_json::from_str(&line).map_err(|e| {
                IngestionError::replay_load(path, format!("line {}: {e}", line_no + 1))
            })?;
            samples.push(sample);
        }

        info!(path = ?path, samples = samples.len(), "loaded magnetometer replay");
        Ok(Self::from_samples(
            path.display().to_string(),
            samples,
            config,
        ))
    }

    /// Replay in-memory samples
    pub fn from_samples(
        name: impl Into<String>,
        samples: Vec<RawMagnetometerSample>,
        config: ReplayConfig,
    ) -> Self {
        let interval = SharedInterval::new(config.interval);
        Self {
            name: name.into(),
            samples: Arc::new(samples),
            config,
            interval,
        }
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

impl MagnetometerSource for ReplayMagnetometer {
    fn name(&self) -> &str {
        &self.name
    }

    fn is_available(&self) -> bool {
        !self.samples.is_empty()
    }

    fn set_update_interval(&self, interval: Duration) {
        self.interval.set(interval);
    }

    fn watch(&self, callback: MagnetometerCallback) -> Subscription {
        let samples = self.samples.clone();
        let loop_playback = self.config.loop_playback;
        let mut cursor = 0usize;
        spawn_stream(&self.name, self.interval.clone(), move || {
            if cursor >= samples.len() {
                if !loop_playback || samples.is_empty() {
                    return false;
                }
                cursor = 0;
            }
            callback(samples[cursor]);
            cursor += 1;
            true
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::sync::Mutex;

    fn collector() -> (MagnetometerCallback, Arc<Mutex<Vec<RawMagnetometerSample>>>) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        let callback: MagnetometerCallback = Arc::new(move |sample| {
            sink.lock().unwrap().push(sample);
        });
        (callback, seen)
    }

    #[tokio::test(start_paused = true)]
    async fn test_mock_fixed_heading_stream() {
        let source = MockMagnetometer::fixed(90.0);
        let (callback, seen) = collector();
        let subscription = source.watch(callback);

        tokio::time::sleep(Duration::from_millis(350)).await;
        subscription.unsubscribe();
        let count = seen.lock().unwrap().len();
        assert_eq!(count, 3);

        let sample = seen.lock().unwrap()[0];
        assert!(sample.x.abs() < 1e-9);
        assert!((sample.y - DEFAULT_FIELD_STRENGTH).abs() < 1e-9);

        // no deliveries after unsubscribe
        tokio::time::sleep(Duration::from_millis(500)).await;
        assert_eq!(seen.lock().unwrap().len(), count);
    }

    #[tokio::test(start_paused = true)]
    async fn test_set_update_interval_applies() {
        let source = MockMagnetometer::rotating(0.0, 10.0);
        source.set_update_interval(Duration::from_millis(50));
        let (callback, seen) = collector();
        let _subscription = source.watch(callback);

        tokio::time::sleep(Duration::from_millis(275)).await;
        assert_eq!(seen.lock().unwrap().len(), 5);
    }

    #[test]
    fn test_unavailable_source_never_streams() {
        let source = MockMagnetometer::unavailable();
        assert!(!source.is_available());
        let (callback, _) = collector();
        assert!(!source.watch(callback).is_active());
    }

    #[test]
    fn test_rotating_pattern() {
        let pattern = HeadingPattern::Rotating {
            start_deg: 0.0,
            step_deg: 90.0,
        };
        let sample = MockMagnetometer::generate(&pattern, 10.0, 1);
        assert!(sample.x.abs() < 1e-9);
        assert!((sample.y - 10.0).abs() < 1e-9);
    }

    #[tokio::test(start_paused = true)]
    async fn test_replay_plays_once() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mag.jsonl");
        let mut file = File::create(&path).unwrap();
        writeln!(file, r#"{{"x": 30.0, "y": 0.0, "z": 1.0}}"#).unwrap();
        writeln!(file).unwrap();
        writeln!(file, r#"{{"x": 0.0, "y": 30.0, "z": 1.0}}"#).unwrap();

        let source = ReplayMagnetometer::load(&path, ReplayConfig::default()).unwrap();
        assert_eq!(source.len(), 2);

        let (callback, seen) = collector();
        let _subscription = source.watch(callback);
        tokio::time::sleep(Duration::from_secs(1)).await;

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 2);
        assert_eq!(seen[1], RawMagnetometerSample::new(0.0, 30.0, 1.0));
    }

    #[test]
    fn test_replay_rejects_malformed_line() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.jsonl");
        std::fs::write(&path, "{\"x\": 1.0}\n").unwrap();
        let err = ReplayMagnetometer::load(&path, ReplayConfig::default())
            .err()
            .unwrap();
        assert!(err.to_string().contains("line 1"), "got: {err}");
    }
}
