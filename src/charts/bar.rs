use crate::charts::extremum::{format_reading, mark_extremum, ValueRange};
use crate::charts::HUMIDITY_AXIS_LABEL;
use crate::frame::error::FrameError;
use crate::frame::humidity_frame::HumidityFrame;
use crate::types::station::StationKey;
use eframe::egui::{Align2, Color32, RichText, Ui};
use egui_plot::{uniform_grid_spacer, Bar, BarChart, Plot, PlotPoint, Text};

pub const BAR_TITLE: &str = "Relative Humidity at Each Station";

const BAR_WIDTH: f64 = 0.6;
const BAR_COLOR: Color32 = Color32::from_rgb(31, 119, 180);

#[derive(Debug, Clone, PartialEq)]
pub struct StationBar {
    /// Slot on the x axis, one per station in table order.
    pub position: usize,
    pub station: StationKey,
    /// Most recent reading, `None` draws no bar.
    pub reading: Option<f64>,
    /// Reading value with the extremum marker appended when applicable.
    pub label: String,
}

/// One bar per station showing its most recent reading on a fixed 0..100 % axis.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StationBarChart {
    pub bars: Vec<StationBar>,
    pub range: Option<ValueRange>,
}

impl StationBarChart {
    pub fn from_frame(frame: &HumidityFrame) -> Result<Self, FrameError> {
        let Some(column) = frame.latest_reading_column()? else {
            return Ok(Self::default());
        };
        let readings = frame.readings(&column.name)?;
        let range = ValueRange::of(readings.iter().flatten().copied());

        let bars = frame
            .stations()?
            .into_iter()
            .zip(readings)
            .enumerate()
            .map(|(position, (station, reading))| {
                let label = match (reading, range) {
                    (Some(value), Some(range)) => mark_extremum(format_reading(value), value, range),
                    _ => String::new(),
                };
                StationBar {
                    position,
                    station,
                    reading,
                    label,
                }
            })
            .collect();

        Ok(Self { bars, range })
    }

    pub fn station_names(&self) -> Vec<String> {
        self.bars
            .iter()
            .map(|bar| bar.station.station_name.clone())
            .collect()
    }

    pub fn show(&self, ui: &mut Ui) {
        ui.heading(BAR_TITLE);

        let names = self.station_names();
        let bars: Vec<Bar> = self
            .bars
            .iter()
            .filter_map(|bar| {
                bar.reading.map(|reading| {
                    Bar::new(bar.position as f64, reading)
                        .name(&bar.station.station_name)
                        .width(BAR_WIDTH)
                        .fill(BAR_COLOR)
                })
            })
            .collect();

        Plot::new("bar_plot")
            .x_axis_label("Station")
            .y_axis_label(HUMIDITY_AXIS_LABEL)
            .include_y(0.0)
            .include_y(100.0)
            .x_grid_spacer(uniform_grid_spacer(|_| [1.0, 5.0, 10.0]))
            .x_axis_formatter(move |mark, _range| station_tick(&names, mark.value))
            .show(ui, |plot_ui| {
                plot_ui.bar_chart(BarChart::new("Relative Humidity", bars));
                for bar in &self.bars {
                    if let Some(reading) = bar.reading {
                        plot_ui.text(
                            Text::new(
                                bar.station.station_name.clone(),
                                PlotPoint::new(bar.position as f64, reading),
                                RichText::new(&bar.label).small(),
                            )
                            .anchor(Align2::CENTER_BOTTOM),
                        );
                    }
                }
            });
    }
}

/// Station name for a tick sitting on a bar slot, empty for ticks in between.
fn station_tick(names: &[String], value: f64) -> String {
    let slot = value.round();
    if (value - slot).abs() > 1e-6 || slot < 0.0 {
        return String::new();
    }
    names.get(slot as usize).cloned().unwrap_or_default()
}
