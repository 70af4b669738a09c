//! Timetable source chosen from configuration

use chrono::NaiveDate;
use contracts::{ContractError, GeoPoint, NavigatorBlueprint, Timetable, TimetableProvider};
use ingestion::{JsonFileTimetableProvider, StaticTimetableProvider};

/// Inline timetable or provider response file
#[derive(Debug)]
pub enum ConfiguredTimetable {
    Inline(StaticTimetableProvider),
    File(JsonFileTimetableProvider),
}

impl ConfiguredTimetable {
    /// Inline entries win; otherwise `timetable_file`; otherwise an empty
    /// timetable ("no data" on every tick)
    pub fn from_blueprint(blueprint: &NavigatorBlueprint) -> Self {
        match (&blueprint.timetable_file, blueprint.timetable.is_empty()) {
            (Some(path), true) => Self::File(JsonFileTimetableProvider::new(path)),
            _ => Self::Inline(StaticTimetableProvider::from_raw(&blueprint.timetable)),
        }
    }

    pub fn describe(&self) -> String {
        match self {
            Self::Inline(provider) => format!("{} (inline)", provider.name()),
            Self::File(provider) => provider.name().to_string(),
        }
    }
}

impl TimetableProvider for ConfiguredTimetable {
    fn name(&self) -> &str {
        match self {
            Self::Inline(provider) => provider.name(),
            Self::File(provider) => provider.name(),
        }
    }

    async fn fetch(&self, date: NaiveDate, location: GeoPoint) -> Result<Timetable, ContractError> {
        match self {
            Self::Inline(provider) => provider.fetch(date, location).await,
            Self::File(provider) => provider.fetch(date, location).await,
        }
    }
}
