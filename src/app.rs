//! The desktop window: one tab per chart, a refresh button and a status bar.

use crate::charts::{ChartKind, ChartSet};
use crate::fetch::ReadingSource;
use crate::refresh::{RefreshHandle, RefreshState, Refresher};
use eframe::egui::{self, Align, Layout};
use log::error;
use std::time::Duration;

pub struct VisualizerApp {
    handle: RefreshHandle,
    state: RefreshState,
    charts: ChartSet,
    chart_error: Option<String>,
    active: ChartKind,
}

impl VisualizerApp {
    pub fn new(handle: RefreshHandle) -> Self {
        Self {
            handle,
            state: RefreshState::default(),
            charts: ChartSet::default(),
            chart_error: None,
            active: ChartKind::default(),
        }
    }

    /// Spawns the refresh loop for `source` on `runtime` and builds the window state.
    ///
    /// The loop repaints the window after every cycle, so the UI never polls.
    pub fn start<S: ReadingSource>(
        cc: &eframe::CreationContext<'_>,
        runtime: &tokio::runtime::Handle,
        source: S,
        interval: Duration,
    ) -> Self {
        let (refresher, handle) = Refresher::new(source, interval);
        let ctx = cc.egui_ctx.clone();
        runtime.spawn(refresher.run(move || ctx.request_repaint()));
        Self::new(handle)
    }

    /// Pulls the latest published state and rebuilds the chart models when it changed.
    fn apply_update(&mut self) {
        let Some(state) = self.handle.take_update() else {
            return;
        };
        if let Some(frame) = &state.frame {
            match ChartSet::from_frame(frame) {
                Ok(charts) => {
                    self.charts = charts;
                    self.chart_error = None;
                }
                Err(e) => {
                    error!("Failed to build charts: {}", e);
                    self.chart_error = Some(e.to_string());
                }
            }
        }
        self.state = state;
    }
}

impl eframe::App for VisualizerApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.apply_update();

        egui::TopBottomPanel::top("chart_tabs").show(ctx, |ui| {
            ui.horizontal(|ui| {
                for kind in ChartKind::ALL {
                    ui.selectable_value(&mut self.active, kind, kind.title());
                }
                ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                    if ui.button("Refresh now").clicked() {
                        self.handle.refresh_now();
                    }
                });
            });
        });

        egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.label(status_text(&self.state));
                if let Some(message) = self.state.last_error.as_ref().or(self.chart_error.as_ref()) {
                    ui.separator();
                    ui.colored_label(ui.visuals().error_fg_color, message.as_str());
                }
            });
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            if self.state.frame.is_some() {
                self.charts.show(self.active, ui);
            } else {
                ui.centered_and_justified(|ui| {
                    ui.label("Waiting for the first readings…");
                });
            }
        });
    }
}

/// Summary line for the status bar.
pub fn status_text(state: &RefreshState) -> String {
    match (&state.frame, state.last_success) {
        (Some(frame), Some(updated)) => format!(
            "Updated {} · {} · {}",
            updated.format("%H:%M:%S"),
            counted(frame.height(), "station"),
            counted(frame.reading_count(), "timestamp")
        ),
        _ if state.failed_cycles > 0 => {
            format!("No readings yet, {} failed attempt(s)", state.failed_cycles)
        }
        _ => "Fetching readings…".to_string(),
    }
}

fn counted(count: usize, noun: &str) -> String {
    if count == 1 {
        format!("{} {}", count, noun)
    } else {
        format!("{} {}s", count, noun)
    }
}
