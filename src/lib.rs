mod app;
mod charts;
mod config;
mod error;
mod fetch;
mod frame;
mod refresh;
mod types;

pub use app::{status_text, VisualizerApp};
pub use config::*;
pub use error::HumidityError;

pub use fetch::error::FetchError;
pub use fetch::loader::HumidityClient;
pub use fetch::ReadingSource;

pub use frame::error::FrameError;
pub use frame::humidity_frame::*;

pub use refresh::{RefreshHandle, RefreshState, Refresher};

pub use types::payload::*;
pub use types::reading::*;
pub use types::station::*;

pub use charts::bar::{StationBar, StationBarChart, BAR_TITLE};
pub use charts::colormap::red_white_blue;
pub use charts::extremum::{format_reading, mark_extremum, Extremum, ValueRange};
pub use charts::line::{clock_tick, StationSeries, TimeSeriesChart, LINE_TITLE};
pub use charts::scatter::{ScatterChart, ScatterPoint, SCATTER_TITLE};
pub use charts::{ChartKind, ChartSet, HUMIDITY_AXIS_LABEL};
