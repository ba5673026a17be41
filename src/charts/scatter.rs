use crate::charts::colormap::red_white_blue;
use crate::charts::extremum::{format_reading, mark_extremum, ValueRange};
use crate::charts::HUMIDITY_AXIS_LABEL;
use crate::frame::error::FrameError;
use crate::frame::humidity_frame::{HumidityFrame, ReadingColumn};
use crate::types::station::StationKey;
use eframe::egui::{pos2, vec2, Align2, Color32, CornerRadius, Rect, RichText, Sense, Ui};
use egui_plot::{MarkerShape, Plot, PlotPoint, PlotPoints, Points, Text};

pub const SCATTER_TITLE: &str = "Scatterplot of Stations";

/// One station drawn at its coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct ScatterPoint {
    pub station: StationKey,
    pub reading: f64,
    /// `"<name> (<reading>%)"`, with the extremum marker appended when applicable.
    pub label: String,
    pub color: Color32,
}

/// Stations placed by longitude/latitude and colored by their most recent reading.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScatterChart {
    pub points: Vec<ScatterPoint>,
    /// Range of the most recent readings, drives the colormap and the color bar.
    pub range: Option<ValueRange>,
    pub column: Option<ReadingColumn>,
}

impl ScatterChart {
    /// Builds the chart from the latest reading column of `frame`. Stations without a
    /// value in that column are left out.
    pub fn from_frame(frame: &HumidityFrame) -> Result<Self, FrameError> {
        let Some(column) = frame.latest_reading_column()? else {
            return Ok(Self::default());
        };
        let stations = frame.stations()?;
        let readings = frame.readings(&column.name)?;

        let range = ValueRange::of(readings.iter().flatten().copied());
        let points = match range {
            Some(range) => stations
                .into_iter()
                .zip(readings)
                .filter_map(|(station, reading)| {
                    let reading = reading?;
                    let label = mark_extremum(
                        format!("{} ({}%)", station.station_name, format_reading(reading)),
                        reading,
                        range,
                    );
                    Some(ScatterPoint {
                        station,
                        reading,
                        label,
                        color: red_white_blue(range.normalize(reading)),
                    })
                })
                .collect(),
            None => Vec::new(),
        };

        Ok(Self {
            points,
            range,
            column: Some(column),
        })
    }

    pub fn show(&self, ui: &mut Ui) {
        ui.heading(SCATTER_TITLE);
        if let Some(range) = self.range {
            color_bar(ui, range);
        }

        Plot::new("scatter_plot")
            .x_axis_label("Longitude")
            .y_axis_label("Latitude")
            .data_aspect(1.0)
            .show(ui, |plot_ui| {
                for point in &self.points {
                    let position = [point.station.longitude, point.station.latitude];
                    plot_ui.points(
                        Points::new(
                            point.station.station_name.clone(),
                            PlotPoints::from(vec![position]),
                        )
                        .shape(MarkerShape::Circle)
                        .radius(6.0)
                        .color(point.color),
                    );
                    plot_ui.text(
                        Text::new(
                            point.station.station_name.clone(),
                            PlotPoint::new(position[0], position[1]),
                            RichText::new(&point.label).small(),
                        )
                        .anchor(Align2::CENTER_TOP),
                    );
                }
            });
    }
}

/// Horizontal gradient legend for the colormap, labelled with the range ends.
fn color_bar(ui: &mut Ui, range: ValueRange) {
    const STEPS: usize = 32;

    ui.horizontal(|ui| {
        ui.label(HUMIDITY_AXIS_LABEL);
        ui.label(format_reading(range.min));
        let (rect, _) = ui.allocate_exact_size(vec2(180.0, 12.0), Sense::hover());
        let painter = ui.painter();
        let step_width = rect.width() / STEPS as f32;
        for i in 0..STEPS {
            let left = rect.left() + step_width * i as f32;
            let segment = Rect::from_min_max(
                pos2(left, rect.top()),
                pos2(left + step_width, rect.bottom()),
            );
            let t = (i as f64 + 0.5) / STEPS as f64;
            painter.rect_filled(segment, CornerRadius::ZERO, red_white_blue(t));
        }
        ui.label(format_reading(range.max));
    });
}
