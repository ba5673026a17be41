//! Contains the `HumidityFrame` wide table that accumulates readings across refresh cycles.

use crate::frame::error::FrameError;
use crate::types::reading::{ReadingBatch, READING_COLUMN_PREFIX};
use crate::types::station::StationKey;
use chrono::{DateTime, FixedOffset};
use log::debug;
use polars::prelude::*;
use std::fmt;

pub const STATION_NAME_COLUMN: &str = "station_name";
pub const LATITUDE_COLUMN: &str = "latitude";
pub const LONGITUDE_COLUMN: &str = "longitude";

/// The columns that together identify a station.
pub const KEY_COLUMNS: [&str; 3] = [STATION_NAME_COLUMN, LATITUDE_COLUMN, LONGITUDE_COLUMN];

/// A reading column of a [`HumidityFrame`] together with the timestamp encoded in its name.
#[derive(Debug, Clone, PartialEq)]
pub struct ReadingColumn {
    pub name: String,
    pub timestamp: DateTime<FixedOffset>,
}

impl ReadingColumn {
    /// Parses a `reading_<timestamp>` column name.
    ///
    /// # Errors
    ///
    /// Returns [`FrameError::NotAReadingColumn`] if the prefix is missing and
    /// [`FrameError::InvalidReadingTimestamp`] if the remainder is not RFC 3339.
    pub fn parse(name: &str) -> Result<Self, FrameError> {
        let raw = name
            .strip_prefix(READING_COLUMN_PREFIX)
            .ok_or_else(|| FrameError::NotAReadingColumn(name.to_string()))?;
        let timestamp = DateTime::parse_from_rfc3339(raw).map_err(|e| {
            FrameError::InvalidReadingTimestamp {
                column: name.to_string(),
                source: e,
            }
        })?;
        Ok(Self {
            name: name.to_string(),
            timestamp,
        })
    }
}

/// A wrapper around a Polars `DataFrame` holding humidity readings in wide format.
///
/// The frame always starts with the key columns `station_name` (str), `latitude` (f64)
/// and `longitude` (f64), followed by one nullable f64 `reading_<timestamp>` column per
/// timestamp, oldest first. Rows are sorted by station key.
///
/// ```text
///  station_name        latitude  longitude  reading_2023-04-30T08:45:00+08:00
///  Banyan Road         1.256     103.679    90.6
///  Clementi Road       1.3337    103.7768   87.6
///  ...
/// ```
#[derive(Debug, Clone)]
pub struct HumidityFrame {
    /// The underlying Polars DataFrame.
    pub frame: DataFrame,
}

impl HumidityFrame {
    pub fn new(frame: DataFrame) -> Self {
        Self { frame }
    }

    /// Builds the single-timestamp table for one fetched batch.
    pub fn from_batch(batch: &ReadingBatch) -> Result<Self, FrameError> {
        let names: Vec<&str> = batch
            .readings
            .iter()
            .map(|r| r.station_name.as_str())
            .collect();
        let latitudes: Vec<f64> = batch.readings.iter().map(|r| r.latitude).collect();
        let longitudes: Vec<f64> = batch.readings.iter().map(|r| r.longitude).collect();
        let values: Vec<f64> = batch.readings.iter().map(|r| r.reading).collect();
        let reading_column = batch.reading_column();

        let frame = df!(
            STATION_NAME_COLUMN => names,
            LATITUDE_COLUMN => latitudes,
            LONGITUDE_COLUMN => longitudes,
            reading_column.as_str() => values
        )?;
        Ok(Self { frame })
    }

    /// Merges `incoming` into this table on the station key and returns the result.
    ///
    /// Reading columns of `incoming` that this table already has are ignored, so merging
    /// the same timestamp twice returns an unchanged table. The merge is a full outer join:
    /// stations missing from `incoming` get a null in the new column, stations new in
    /// `incoming` get nulls in every older column. Reading columns stay ordered by
    /// timestamp even when `incoming` is older than readings already held.
    pub fn accumulate(&self, incoming: &HumidityFrame) -> Result<HumidityFrame, FrameError> {
        let new_columns: Vec<String> = incoming
            .reading_column_names()
            .into_iter()
            .filter(|name| !self.has_column(name))
            .collect();

        if new_columns.is_empty() {
            debug!("Incoming readings are already accumulated, keeping table as is");
            return Ok(self.clone());
        }

        let keys: Vec<Expr> = KEY_COLUMNS.iter().map(|name| col(*name)).collect();
        let selection: Vec<Expr> = keys
            .iter()
            .cloned()
            .chain(new_columns.iter().map(|name| col(name.as_str())))
            .collect();

        // Reading columns are kept in timestamp order whatever order batches arrive in.
        let mut ordered = self.reading_columns()?;
        for name in &new_columns {
            ordered.push(ReadingColumn::parse(name)?);
        }
        ordered.sort_by_key(|column| column.timestamp);
        let output: Vec<Expr> = keys
            .iter()
            .cloned()
            .chain(ordered.iter().map(|column| col(column.name.as_str())))
            .collect();

        let frame = self
            .frame
            .clone()
            .lazy()
            .join(
                incoming.frame.clone().lazy().select(selection),
                keys.clone(),
                keys,
                JoinArgs::new(JoinType::Full).with_coalesce(JoinCoalesce::CoalesceColumns),
            )
            .select(output)
            .sort(KEY_COLUMNS, SortMultipleOptions::default())
            .collect()?;

        debug!(
            "Accumulated {} new reading column(s), table is now {} x {}",
            new_columns.len(),
            frame.height(),
            frame.width()
        );
        Ok(Self { frame })
    }

    /// Number of stations (rows).
    pub fn height(&self) -> usize {
        self.frame.height()
    }

    /// Number of reading columns, i.e. distinct timestamps accumulated so far.
    pub fn reading_count(&self) -> usize {
        self.reading_column_names().len()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.frame
            .get_column_names()
            .iter()
            .any(|c| c.as_str() == name)
    }

    pub fn reading_column_names(&self) -> Vec<String> {
        self.frame
            .get_column_names()
            .into_iter()
            .filter(|name| name.starts_with(READING_COLUMN_PREFIX))
            .map(|name| name.to_string())
            .collect()
    }

    /// All reading columns in table order, oldest first.
    pub fn reading_columns(&self) -> Result<Vec<ReadingColumn>, FrameError> {
        self.reading_column_names()
            .iter()
            .map(|name| ReadingColumn::parse(name))
            .collect()
    }

    /// The most recent reading column, which is always the last column of the table.
    pub fn latest_reading_column(&self) -> Result<Option<ReadingColumn>, FrameError> {
        self.reading_column_names()
            .last()
            .map(|name| ReadingColumn::parse(name))
            .transpose()
    }

    /// Station keys in row order.
    pub fn stations(&self) -> Result<Vec<StationKey>, FrameError> {
        let names = self.column(STATION_NAME_COLUMN)?.str()?;
        let latitudes = self.float_column(LATITUDE_COLUMN)?;
        let longitudes = self.float_column(LONGITUDE_COLUMN)?;

        names
            .into_iter()
            .zip(latitudes.into_iter())
            .zip(longitudes.into_iter())
            .enumerate()
            .map(|(row, ((name, latitude), longitude))| -> Result<StationKey, FrameError> {
                Ok(StationKey {
                    station_name: name
                        .ok_or(FrameError::NullKey {
                            column: STATION_NAME_COLUMN,
                            row,
                        })?
                        .to_string(),
                    latitude: latitude.ok_or(FrameError::NullKey {
                        column: LATITUDE_COLUMN,
                        row,
                    })?,
                    longitude: longitude.ok_or(FrameError::NullKey {
                        column: LONGITUDE_COLUMN,
                        row,
                    })?,
                })
            })
            .collect()
    }

    /// Values of one reading column in row order. Null means the station did not report
    /// at that timestamp.
    pub fn readings(&self, column: &str) -> Result<Vec<Option<f64>>, FrameError> {
        Ok(self.float_column(column)?.into_iter().collect())
    }

    fn column(&self, name: &str) -> Result<&Column, FrameError> {
        self.frame
            .column(name)
            .map_err(|e| FrameError::ColumnNotFound(name.to_string(), e))
    }

    fn float_column(&self, name: &str) -> Result<&Float64Chunked, FrameError> {
        Ok(self.column(name)?.f64()?)
    }
}

impl fmt::Display for HumidityFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.frame)
    }
}
