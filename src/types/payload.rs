//! Serde model of the relative humidity endpoint response.
//!
//! Only the fields needed for reshaping are required. Everything else in the
//! document (`api_info`, unknown keys) is ignored.

use crate::types::station::StationMetadata;
use serde::{Deserialize, Serialize};

/// One JSON document returned by the endpoint.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Payload {
    pub metadata: Metadata,
    /// Reading batches. The endpoint returns a single batch for the latest timestamp.
    pub items: Vec<ReadingItem>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Metadata {
    pub stations: Vec<StationMetadata>,
    /// Kind of reading, "RH%" for relative humidity.
    pub reading_type: Option<String>,
    pub reading_unit: Option<String>,
}

/// All readings taken at one timestamp.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ReadingItem {
    /// ISO-8601 timestamp with offset, e.g. `2023-04-30T08:45:00+08:00`.
    pub timestamp: String,
    pub readings: Vec<RawReading>,
}

/// A reading keyed by station id, before it is joined to the station metadata.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct RawReading {
    pub station_id: String,
    /// `null` when the station reported no value for this timestamp.
    pub value: Option<f64>,
}
