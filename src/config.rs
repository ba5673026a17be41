//! Runtime settings of the visualizer.

use bon::Builder;
use std::time::Duration;

/// Relative humidity endpoint polled by default.
pub const DEFAULT_URL: &str = "https://api.data.gov.sg/v1/environment/relative-humidity";
pub const DEFAULT_REFRESH_INTERVAL: Duration = Duration::from_secs(5 * 60);
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
pub const DEFAULT_WINDOW_TITLE: &str = "Relative Humidity Visualizer";

/// Settings for the fetch client, refresh loop and window.
///
/// Every field has a default, so `VisualizerConfig::default()` is the configuration the
/// binary runs with.
///
/// # Examples
///
/// ```
/// use humidity_visualizer::VisualizerConfig;
/// use std::time::Duration;
///
/// let config = VisualizerConfig::builder()
///     .refresh_interval(Duration::from_secs(60))
///     .build();
/// assert_eq!(config.refresh_interval, Duration::from_secs(60));
/// assert_eq!(config.request_timeout, Duration::from_secs(30));
/// ```
#[derive(Debug, Clone, PartialEq, Builder)]
pub struct VisualizerConfig {
    /// Endpoint returning the station metadata and latest readings.
    #[builder(into, default = DEFAULT_URL.to_string())]
    pub url: String,
    /// Delay between two refresh cycles.
    #[builder(default = DEFAULT_REFRESH_INTERVAL)]
    pub refresh_interval: Duration,
    /// Upper bound for a single HTTP request.
    #[builder(default = DEFAULT_REQUEST_TIMEOUT)]
    pub request_timeout: Duration,
    #[builder(into, default = DEFAULT_WINDOW_TITLE.to_string())]
    pub window_title: String,
}

impl Default for VisualizerConfig {
    fn default() -> Self {
        Self::builder().build()
    }
}
