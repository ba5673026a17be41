//! Defines the data structures describing humidity stations: the metadata entries
//! delivered by the API and the key used to identify a station once readings have
//! been reshaped into a table.

use serde::{Deserialize, Serialize};
use std::fmt;

// --- Data Structures ---

/// A single station entry from the `metadata.stations` list of the API payload.
///
/// The `id` is only used to join readings to stations. Once a payload has been
/// reshaped, stations are identified by their [`StationKey`] instead.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct StationMetadata {
    /// The API station identifier (e.g., "S117").
    pub id: String,
    /// Identifier of the physical device. Usually equal to `id`.
    #[serde(default)]
    pub device_id: Option<String>,
    /// Human readable station name (e.g., "Banyan Road").
    pub name: String,
    /// Geographical location of the station.
    pub location: Location,
}

/// Represents the geographical location of a station.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
pub struct Location {
    /// Latitude in decimal degrees (positive for North, negative for South).
    pub latitude: f64,
    /// Longitude in decimal degrees (positive for East, negative for West).
    pub longitude: f64,
}

/// The identity of a station in the visualization layer.
///
/// Two rows describe the same station when name, latitude and longitude are all equal.
#[derive(Debug, Clone, PartialEq)]
pub struct StationKey {
    pub station_name: String,
    pub latitude: f64,
    pub longitude: f64,
}

impl StationKey {
    pub fn new(station_name: impl Into<String>, location: Location) -> Self {
        Self {
            station_name: station_name.into(),
            latitude: location.latitude,
            longitude: location.longitude,
        }
    }

    pub fn location(&self) -> Location {
        Location {
            latitude: self.latitude,
            longitude: self.longitude,
        }
    }
}

impl fmt::Display for StationKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({:.5}, {:.5})",
            self.station_name, self.latitude, self.longitude
        )
    }
}
