use thiserror::Error;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Failed to build HTTP client")]
    ClientBuild(#[source] reqwest::Error),

    #[error("Network request failed for {0}")]
    NetworkRequest(String, #[source] reqwest::Error),

    #[error("HTTP request failed for {url} with status {status}")]
    HttpStatus {
        url: String,
        status: reqwest::StatusCode,
        #[source]
        source: reqwest::Error,
    },

    #[error("Failed to read response body from {0}")]
    ResponseBody(String, #[source] reqwest::Error),

    #[error("Failed to parse JSON payload")]
    JsonParse(#[from] serde_json::Error),

    #[error("Response body contained no JSON document")]
    EmptyPayload,

    #[error("Payload contains no reading batch")]
    MissingReadings,

    #[error("Reading timestamp '{timestamp}' is not valid RFC 3339")]
    InvalidTimestamp {
        timestamp: String,
        #[source]
        source: chrono::ParseError,
    },

    // Neither side of the station/reading join matched
    #[error("No readings matched any of the {stations} stations at {timestamp}")]
    EmptyJoin { timestamp: String, stations: usize },
}
