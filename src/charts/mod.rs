//! The three chart views of the accumulated humidity table.
//!
//! Each chart is a plain model built from a [`HumidityFrame`] (so it can be tested
//! without a window) plus a `show` method drawing it with `egui_plot`.

pub mod bar;
pub mod colormap;
pub mod extremum;
pub mod line;
pub mod scatter;

use crate::charts::bar::{StationBarChart, BAR_TITLE};
use crate::charts::line::{TimeSeriesChart, LINE_TITLE};
use crate::charts::scatter::{ScatterChart, SCATTER_TITLE};
use crate::frame::error::FrameError;
use crate::frame::humidity_frame::HumidityFrame;
use eframe::egui::Ui;

pub const HUMIDITY_AXIS_LABEL: &str = "Relative Humidity (%)";

/// Identifies one chart tab.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ChartKind {
    #[default]
    Scatter,
    Bar,
    Line,
}

impl ChartKind {
    pub const ALL: [ChartKind; 3] = [ChartKind::Scatter, ChartKind::Bar, ChartKind::Line];

    pub fn title(&self) -> &'static str {
        match self {
            ChartKind::Scatter => SCATTER_TITLE,
            ChartKind::Bar => BAR_TITLE,
            ChartKind::Line => LINE_TITLE,
        }
    }
}

/// All chart models for one snapshot of the accumulated table.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChartSet {
    pub scatter: ScatterChart,
    pub bar: StationBarChart,
    pub line: TimeSeriesChart,
}

impl ChartSet {
    pub fn from_frame(frame: &HumidityFrame) -> Result<Self, FrameError> {
        Ok(Self {
            scatter: ScatterChart::from_frame(frame)?,
            bar: StationBarChart::from_frame(frame)?,
            line: TimeSeriesChart::from_frame(frame)?,
        })
    }

    pub fn show(&self, kind: ChartKind, ui: &mut Ui) {
        match kind {
            ChartKind::Scatter => self.scatter.show(ui),
            ChartKind::Bar => self.bar.show(ui),
            ChartKind::Line => self.line.show(ui),
        }
    }
}
