//! Timetable providers

use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::NaiveDate;
use contracts::{ContractError, GeoPoint, RawTimetable, Timetable, TimetableProvider};
use prayer_schedule::{normalize_timetable, parse_provider_response};
use tracing::{debug, instrument};

/// Serves one fixed timetable for every date and location
#[derive(Debug)]
pub struct StaticTimetableProvider {
    timetable: Timetable,
    fetches: AtomicU64,
}

impl StaticTimetableProvider {
    pub fn new(timetable: Timetable) -> Self {
        Self {
            timetable,
            fetches: AtomicU64::new(0),
        }
    }

    /// Normalize raw entries first; unparseable ones are skipped
    pub fn from_raw(raw: &RawTimetable) -> Self {
        Self::new(normalize_timetable(raw))
    }

    /// Number of `fetch` calls served
    pub fn fetch_count(&self) -> u64 {
        self.fetches.load(Ordering::Relaxed)
    }
}

impl TimetableProvider for StaticTimetableProvider {
    fn name(&self) -> &str {
        "static_timetable"
    }

    async fn fetch(&self, date: NaiveDate, _location: GeoPoint) -> Result<Timetable, ContractError> {
        self.fetches.fetch_add(1, Ordering::Relaxed);
        debug!(%date, entries = self.timetable.len(), "serving static timetable");
        Ok(self.timetable.clone())
    }
}

/// Reads a provider response (any supported JSON shape) from disk on every fetch
#[derive(Debug, Clone)]
pub struct JsonFileTimetableProvider {
    path: PathBuf,
    name: String,
}

impl JsonFileTimetableProvider {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let name = format!("json_file:{}", path.display());
        Self { path, name }
    }
}

impl TimetableProvider for JsonFileTimetableProvider {
    fn name(&self) -> &str {
        &self.name
    }

    #[instrument(name = "timetable_file_fetch", skip(self, _location), fields(path = ?self.path))]
    async fn fetch(&self, date: NaiveDate, _location: GeoPoint) -> Result<Timetable, ContractError> {
        let content = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|e| ContractError::provider(&self.name, e.to_string()))?;
        let value: serde_json::Value = serde_json::from_str(&content)
            .map_err(|e| ContractError::provider(&self.name, format!("invalid JSON: {e}")))?;
        let timetable = parse_provider_response(&value);
        debug!(%date, entries = timetable.len(), "timetable loaded from file");
        Ok(timetable)
    }
}
