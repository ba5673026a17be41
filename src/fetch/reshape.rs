//! Turns one endpoint payload into a [`ReadingBatch`] by joining the station metadata
//! to the readings on station id.

use crate::fetch::error::FetchError;
use crate::types::payload::Payload;
use crate::types::reading::{ReadingBatch, StationReading};
use crate::types::station::StationMetadata;
use chrono::DateTime;
use log::{debug, warn};
use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};

impl ReadingBatch {
    /// Parses a response body and reshapes it.
    ///
    /// The body is read as newline-delimited JSON and only the first document is used,
    /// which also accepts a plain single-document body.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::JsonParse`] if the first document does not match the payload
    /// shape, [`FetchError::EmptyPayload`] if the body holds no document at all, and any
    /// error of [`ReadingBatch::from_payload`].
    pub fn from_payload_bytes(bytes: &[u8]) -> Result<ReadingBatch, FetchError> {
        let payload = serde_json::Deserializer::from_slice(bytes)
            .into_iter::<Payload>()
            .next()
            .ok_or(FetchError::EmptyPayload)??;
        Self::from_payload(payload)
    }

    /// Joins the stations of `payload` to the readings of its first batch.
    ///
    /// Only stations that have a reading, and readings whose station is known, end up
    /// in the batch.
    ///
    /// # Errors
    ///
    /// * [`FetchError::MissingReadings`] if `items` is empty.
    /// * [`FetchError::InvalidTimestamp`] if the batch timestamp is not RFC 3339.
    /// * [`FetchError::EmptyJoin`] if no station matched any reading.
    pub fn from_payload(payload: Payload) -> Result<ReadingBatch, FetchError> {
        let Payload { metadata, items } = payload;
        let item = items
            .into_iter()
            .next()
            .ok_or(FetchError::MissingReadings)?;

        let observed_at = DateTime::parse_from_rfc3339(&item.timestamp).map_err(|e| {
            FetchError::InvalidTimestamp {
                timestamp: item.timestamp.clone(),
                source: e,
            }
        })?;

        let mut null_readings = 0;
        let mut values: HashMap<&str, f64> = HashMap::with_capacity(item.readings.len());
        for raw in &item.readings {
            match raw.value {
                Some(value) => {
                    values.insert(raw.station_id.as_str(), value);
                }
                None => null_readings += 1,
            }
        }
        if null_readings > 0 {
            warn!(
                "{} readings at {} have no value and are skipped",
                null_readings, item.timestamp
            );
        }

        let mut readings: Vec<StationReading> = metadata
            .stations
            .iter()
            .filter_map(|station| {
                values.get(station.id.as_str()).map(|value| StationReading {
                    station_name: station.name.clone(),
                    latitude: station.location.latitude,
                    longitude: station.location.longitude,
                    reading: *value,
                    timestamp: item.timestamp.clone(),
                })
            })
            .collect();

        if readings.is_empty() {
            return Err(FetchError::EmptyJoin {
                timestamp: item.timestamp,
                stations: metadata.stations.len(),
            });
        }

        let (unknown_stations, silent_stations) = unmatched_counts(&metadata.stations, &values);
        if unknown_stations > 0 {
            warn!(
                "{} readings at {} have no matching station metadata",
                unknown_stations, item.timestamp
            );
        }
        if silent_stations > 0 {
            warn!(
                "{} stations have no reading at {}",
                silent_stations, item.timestamp
            );
        }

        readings.sort_by(|a, b| {
            a.station_name
                .cmp(&b.station_name)
                .then(a.latitude.partial_cmp(&b.latitude).unwrap_or(Ordering::Equal))
                .then(a.longitude.partial_cmp(&b.longitude).unwrap_or(Ordering::Equal))
        });
        debug!(
            "Reshaped {} readings for timestamp {}",
            readings.len(),
            item.timestamp
        );

        Ok(ReadingBatch {
            timestamp: item.timestamp,
            observed_at,
            readings,
        })
    }
}

/// Counts readings whose station id is unknown and stations that have no reading.
fn unmatched_counts(stations: &[StationMetadata], values: &HashMap<&str, f64>) -> (usize, usize) {
    let known: HashSet<&str> = stations.iter().map(|s| s.id.as_str()).collect();
    let unknown_stations = values.keys().filter(|id| !known.contains(*id)).count();
    let silent_stations = stations
        .iter()
        .filter(|s| !values.contains_key(s.id.as_str()))
        .count();
    (unknown_stations, silent_stations)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::payload::{Metadata, RawReading, ReadingItem};
    use crate::types::station::{Location, StationMetadata};

    const SAMPLE: &str = include_str!("../../data/relative_humidity_0845.json");

    fn station(id: &str, name: &str, latitude: f64, longitude: f64) -> StationMetadata {
        StationMetadata {
            id: id.to_string(),
            device_id: Some(id.to_string()),
            name: name.to_string(),
            location: Location {
                latitude,
                longitude,
            },
        }
    }

    fn reading(station_id: &str, value: f64) -> RawReading {
        RawReading {
            station_id: station_id.to_string(),
            value: Some(value),
        }
    }

    fn payload(stations: Vec<StationMetadata>, readings: Vec<RawReading>) -> Payload {
        Payload {
            metadata: Metadata {
                stations,
                reading_type: Some("RH%".to_string()),
                reading_unit: Some("percentage".to_string()),
            },
            items: vec![ReadingItem {
                timestamp: "2023-04-30T08:45:00+08:00".to_string(),
                readings,
            }],
        }
    }

    #[test]
    fn test_sample_payload_one_row_per_station() -> Result<(), FetchError> {
        let batch = ReadingBatch::from_payload_bytes(SAMPLE.as_bytes())?;

        assert_eq!(batch.len(), 6);
        assert_eq!(batch.timestamp, "2023-04-30T08:45:00+08:00");
        assert_eq!(batch.reading_column(), "reading_2023-04-30T08:45:00+08:00");

        let names: Vec<&str> = batch
            .readings
            .iter()
            .map(|r| r.station_name.as_str())
            .collect();
        assert_eq!(
            names,
            [
                "Banyan Road",
                "Clementi Road",
                "Nanyang Avenue",
                "Pulau Ubin",
                "Sentosa",
                "West Coast Highway"
            ]
        );

        let sentosa = &batch.readings[4];
        assert_eq!(sentosa.latitude, 1.25);
        assert_eq!(sentosa.longitude, 103.8279);
        assert_eq!(sentosa.reading, 74.2);
        Ok(())
    }

    #[test]
    fn test_observed_at_keeps_offset() -> Result<(), FetchError> {
        let batch = ReadingBatch::from_payload_bytes(SAMPLE.as_bytes())?;
        assert_eq!(batch.observed_at.offset().local_minus_utc(), 8 * 3600);
        assert_eq!(batch.observed_at.to_rfc3339(), "2023-04-30T08:45:00+08:00");
        Ok(())
    }

    #[test]
    fn test_only_first_line_of_ndjson_is_used() -> Result<(), FetchError> {
        let body = format!("{}\n{{\"unrelated\": true}}\n", SAMPLE.trim());
        let batch = ReadingBatch::from_payload_bytes(body.as_bytes())?;
        assert_eq!(batch.len(), 6);
        Ok(())
    }

    #[test]
    fn test_join_drops_unmatched_on_both_sides() -> Result<(), FetchError> {
        let payload = payload(
            vec![
                station("S1", "Alpha", 1.30, 103.80),
                station("S2", "Bravo", 1.31, 103.81),
            ],
            vec![reading("S2", 81.5), reading("S9", 70.0)],
        );
        let batch = ReadingBatch::from_payload(payload)?;

        assert_eq!(batch.len(), 1);
        assert_eq!(batch.readings[0].station_name, "Bravo");
        assert_eq!(batch.readings[0].reading, 81.5);
        Ok(())
    }

    #[test]
    fn test_unmatched_counts_both_sides() {
        let stations = vec![
            station("S1", "Alpha", 1.30, 103.80),
            station("S2", "Bravo", 1.31, 103.81),
            station("S3", "Charlie", 1.32, 103.82),
        ];
        let values: HashMap<&str, f64> = [("S2", 81.5), ("S8", 70.0), ("S9", 71.0)]
            .into_iter()
            .collect();
        assert_eq!(unmatched_counts(&stations, &values), (2, 2));
    }

    #[test]
    fn test_null_reading_skips_only_that_station() -> Result<(), FetchError> {
        let body = SAMPLE.replacen(r#""value":74.2"#, r#""value":null"#, 1);
        assert_ne!(body, SAMPLE);
        let batch = ReadingBatch::from_payload_bytes(body.as_bytes())?;

        assert_eq!(batch.len(), 5);
        assert!(batch.readings.iter().all(|r| r.station_name != "Sentosa"));

        let payload = payload(
            vec![
                station("S1", "Alpha", 1.30, 103.80),
                station("S2", "Bravo", 1.31, 103.81),
            ],
            vec![
                RawReading {
                    station_id: "S1".to_string(),
                    value: None,
                },
                reading("S2", 81.5),
            ],
        );
        let batch = ReadingBatch::from_payload(payload)?;
        assert_eq!(batch.len(), 1);
        assert_eq!(batch.readings[0].station_name, "Bravo");
        Ok(())
    }

    #[test]
    fn test_empty_join_fails() {
        let payload = payload(
            vec![station("S1", "Alpha", 1.30, 103.80)],
            vec![reading("S2", 81.5)],
        );
        let result = ReadingBatch::from_payload(payload);
        assert!(matches!(
            result,
            Err(FetchError::EmptyJoin { stations: 1, .. })
        ));
    }

    #[test]
    fn test_missing_items_fails() {
        let mut payload = payload(vec![station("S1", "Alpha", 1.30, 103.80)], vec![]);
        payload.items.clear();
        assert!(matches!(
            ReadingBatch::from_payload(payload),
            Err(FetchError::MissingReadings)
        ));
    }

    #[test]
    fn test_invalid_timestamp_fails() {
        let mut payload = payload(
            vec![station("S1", "Alpha", 1.30, 103.80)],
            vec![reading("S1", 80.0)],
        );
        payload.items[0].timestamp = "yesterday".to_string();
        assert!(matches!(
            ReadingBatch::from_payload(payload),
            Err(FetchError::InvalidTimestamp { .. })
        ));
    }

    #[test]
    fn test_shape_mismatch_fails() {
        let result = ReadingBatch::from_payload_bytes(br#"{"metadata": {}, "items": []}"#);
        assert!(matches!(result, Err(FetchError::JsonParse(_))));
    }

    #[test]
    fn test_blank_body_fails() {
        let result = ReadingBatch::from_payload_bytes(b"  \n");
        assert!(matches!(result, Err(FetchError::EmptyPayload)));
    }
}
