use crate::charts::extremum::{format_reading, Extremum, ValueRange};
use crate::charts::HUMIDITY_AXIS_LABEL;
use crate::frame::error::FrameError;
use crate::frame::humidity_frame::HumidityFrame;
use crate::types::station::StationKey;
use chrono::{DateTime, FixedOffset};
use eframe::egui::{Color32, Ui};
use egui_plot::{
    uniform_grid_spacer, HLine, Legend, Line, LineStyle, MarkerShape, Plot, PlotPoints, Points,
};

pub const LINE_TITLE: &str = "Relative Humidity over Time";

const LINE_WIDTH: f32 = 2.0;

// matplotlib's default cycle, so stations keep their colors between refreshes.
const SERIES_COLORS: [Color32; 10] = [
    Color32::from_rgb(31, 119, 180),
    Color32::from_rgb(255, 127, 14),
    Color32::from_rgb(44, 160, 44),
    Color32::from_rgb(214, 39, 40),
    Color32::from_rgb(148, 103, 189),
    Color32::from_rgb(140, 86, 75),
    Color32::from_rgb(227, 119, 194),
    Color32::from_rgb(127, 127, 127),
    Color32::from_rgb(188, 189, 34),
    Color32::from_rgb(23, 190, 207),
];

/// Readings of one station over time. `x` is seconds since the Unix epoch.
#[derive(Debug, Clone, PartialEq)]
pub struct StationSeries {
    pub station: StationKey,
    pub points: Vec<[f64; 2]>,
    pub color: Color32,
}

/// One line per station across every accumulated timestamp, plus max/min reference lines.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TimeSeriesChart {
    pub series: Vec<StationSeries>,
    /// Range over all readings of all stations.
    pub range: Option<ValueRange>,
    /// Offset of the most recent timestamp, used to print wall-clock ticks.
    pub offset: Option<FixedOffset>,
}

impl TimeSeriesChart {
    pub fn from_frame(frame: &HumidityFrame) -> Result<Self, FrameError> {
        let columns = frame.reading_columns()?;
        let stations = frame.stations()?;

        let mut points: Vec<Vec<[f64; 2]>> = vec![Vec::with_capacity(columns.len()); stations.len()];
        for column in &columns {
            let x = column.timestamp.timestamp() as f64;
            for (row, reading) in frame.readings(&column.name)?.into_iter().enumerate() {
                if let (Some(value), Some(series)) = (reading, points.get_mut(row)) {
                    series.push([x, value]);
                }
            }
        }

        let range = ValueRange::of(points.iter().flatten().map(|point| point[1]));
        let series = stations
            .into_iter()
            .zip(points)
            .enumerate()
            .map(|(i, (station, points))| StationSeries {
                station,
                points,
                color: SERIES_COLORS[i % SERIES_COLORS.len()],
            })
            .collect();

        Ok(Self {
            series,
            range,
            offset: columns.last().map(|column| *column.timestamp.offset()),
        })
    }

    /// Legend text of the reference line for `extremum`, e.g. `"90.6 <max>"`.
    pub fn reference_label(&self, extremum: Extremum) -> Option<String> {
        let range = self.range?;
        let value = match extremum {
            Extremum::Max => range.max,
            Extremum::Min => range.min,
        };
        Some(format!("{} {}", format_reading(value), extremum.marker()))
    }

    pub fn show(&self, ui: &mut Ui) {
        ui.heading(LINE_TITLE);

        let offset = self.offset;
        let reference_color = ui.visuals().text_color();

        Plot::new("line_plot")
            .legend(Legend::default())
            .x_axis_label("Time")
            .y_axis_label(HUMIDITY_AXIS_LABEL)
            .x_grid_spacer(uniform_grid_spacer(|_| [300.0, 900.0, 3600.0]))
            .x_axis_formatter(move |mark, _range| clock_tick(mark.value, offset))
            .show(ui, |plot_ui| {
                for series in &self.series {
                    let name = series.station.station_name.clone();
                    plot_ui.line(
                        Line::new(name.clone(), PlotPoints::from(series.points.clone()))
                            .color(series.color)
                            .width(LINE_WIDTH),
                    );
                    plot_ui.points(
                        Points::new(name, PlotPoints::from(series.points.clone()))
                            .shape(MarkerShape::Circle)
                            .radius(3.0)
                            .color(series.color),
                    );
                }

                for extremum in [Extremum::Max, Extremum::Min] {
                    if let (Some(range), Some(label)) = (self.range, self.reference_label(extremum)) {
                        let y = match extremum {
                            Extremum::Max => range.max,
                            Extremum::Min => range.min,
                        };
                        plot_ui.hline(
                            HLine::new(label, y)
                                .color(reference_color)
                                .style(LineStyle::dashed_loose()),
                        );
                    }
                }
            });
    }
}

/// Formats an epoch-seconds axis value as `HH:MM` in the readings' own offset.
pub fn clock_tick(seconds: f64, offset: Option<FixedOffset>) -> String {
    let Some(utc) = DateTime::from_timestamp(seconds.round() as i64, 0) else {
        return String::new();
    };
    match offset {
        Some(offset) => utc.with_timezone(&offset).format("%H:%M").to_string(),
        None => utc.format("%H:%M").to_string(),
    }
}
