use crate::types::station::{Location, StationKey};
use chrono::{DateTime, FixedOffset};

/// Prefix of every reading column in a [`crate::HumidityFrame`].
pub const READING_COLUMN_PREFIX: &str = "reading_";

/// Builds the name of the reading column holding values taken at `timestamp`.
///
/// ```
/// use humidity_visualizer::reading_column_name;
///
/// assert_eq!(
///     reading_column_name("2023-04-30T08:45:00+08:00"),
///     "reading_2023-04-30T08:45:00+08:00"
/// );
/// ```
pub fn reading_column_name(timestamp: &str) -> String {
    format!("{}{}", READING_COLUMN_PREFIX, timestamp)
}

/// A single humidity reading joined with the metadata of the station that produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct StationReading {
    pub station_name: String,
    pub latitude: f64,
    pub longitude: f64,
    /// Relative humidity in percent.
    pub reading: f64,
    /// The raw ISO-8601 timestamp of the batch this reading belongs to.
    pub timestamp: String,
}

impl StationReading {
    pub fn key(&self) -> StationKey {
        StationKey::new(
            self.station_name.clone(),
            Location {
                latitude: self.latitude,
                longitude: self.longitude,
            },
        )
    }
}

/// The reshaped result of one fetch: one reading per station, all at the same timestamp.
///
/// Readings are sorted by station name, then latitude, then longitude.
#[derive(Debug, Clone, PartialEq)]
pub struct ReadingBatch {
    /// Timestamp exactly as the API returned it.
    pub timestamp: String,
    pub observed_at: DateTime<FixedOffset>,
    pub readings: Vec<StationReading>,
}

impl ReadingBatch {
    /// Name of the column this batch contributes to a [`crate::HumidityFrame`].
    pub fn reading_column(&self) -> String {
        reading_column_name(&self.timestamp)
    }

    pub fn len(&self) -> usize {
        self.readings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.readings.is_empty()
    }
}
