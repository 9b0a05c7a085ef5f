//! ganttry is an interactive viewer for build timing reports.
//!
//! A report is one immutable [`Snapshot`]: per-unit start/duration/phase
//! timings, the dependency-unlock edges between units, and sampled
//! concurrency and CPU data. The viewer draws a Gantt-style pipeline chart
//! (one bar per unit, phase overlays, unlock connectors, hover highlighting)
//! and a concurrency chart (stepped count lines with a CPU fill), both
//! reacting to a duration filter and a time-scale control.
//!
//! The charts are ordinary [`egui`] widgets and can be embedded in any egui
//! application; [`Report`] wraps them in a ready-made [`eframe`] app:
//!
//! ```no_run
//! let snapshot = ganttry::Snapshot::load(std::path::Path::new("timings.json"))?;
//! ganttry::Report::new(snapshot).run("my build")?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod axis;
pub mod graph;
pub mod prelude;
pub mod snapshot;
pub mod themes;
pub mod view;
pub mod widgets;

use eframe::egui::{self, CollapsingHeader};

use crate::axis::{scale_for_width, MAX_GRAPH_WIDTH, MIN_GRAPH_WIDTH};
use crate::snapshot::derive_concurrency;
use crate::view::ReportState;
use crate::widgets::{ConcurrencyGraph, PipelineGraph};

pub use crate::graph::ReverseDeps;
pub use crate::snapshot::{ConcurrencyPoint, Snapshot, SnapshotError, Unit};
pub use crate::themes::ChartMetrics;
pub use crate::view::ViewState;

/// A complete report viewer: one snapshot, its view state, and an
/// [`eframe::App`] that lays out controls, charts, and the unit table.
pub struct Report {
    snapshot: Snapshot,
    state: ReportState,
    scale_fitted: bool,
}

impl Report {
    pub fn new(mut snapshot: Snapshot) -> Self {
        let state = ReportState::new(&snapshot);
        if snapshot.concurrency.is_empty() {
            log::info!("snapshot has no concurrency samples; deriving them from unit timings");
            snapshot.concurrency = derive_concurrency(&snapshot.units, &state.reverse);
        }
        Self {
            snapshot,
            state,
            scale_fitted: false,
        }
    }

    /// Open a native window showing this report.
    pub fn run(self, name: &str) -> eframe::Result {
        let mut native_options = eframe::NativeOptions::default();
        native_options.persist_window = true;

        eframe::run_native(
            name,
            native_options,
            Box::new(|cc| {
                let ctx = cc.egui_ctx.clone();
                ctrlc::set_handler(move || ctx.send_viewport_cmd(egui::ViewportCommand::Close))
                    .expect("failed to set exit signal handler");

                let theme = match dark_light::detect() {
                    Ok(dark_light::Mode::Light) => egui::ThemePreference::Light,
                    Ok(dark_light::Mode::Dark) => egui::ThemePreference::Dark,
                    Ok(dark_light::Mode::Unspecified) | Err(_) => egui::ThemePreference::System,
                };
                cc.egui_ctx.set_theme(theme);

                Ok(Box::new(self))
            }),
        )
    }

    /// The two range controls with their live readouts. Changes take effect
    /// on this same frame; both charts re-render from scratch below.
    fn controls(&mut self, ui: &mut egui::Ui) {
        let duration = self.snapshot.duration;
        let min_scale = scale_for_width(MIN_GRAPH_WIDTH, duration);
        let max_scale = scale_for_width(MAX_GRAPH_WIDTH, duration).max(min_scale);
        let view = &mut self.state.view;
        view.scale = view.scale.clamp(min_scale, max_scale);

        ui.horizontal(|ui| {
            ui.label("Min unit time:");
            ui.add(
                egui::Slider::new(&mut view.min_unit_duration, 0.0..=30.0)
                    .step_by(0.1)
                    .show_value(false),
            );
            ui.monospace(format!("{:.1}s", view.min_unit_duration));

            ui.separator();

            ui.label("Scale:")
                .on_hover_text("Pixels per second, fitted to the viewport on startup.");
            ui.add(egui::Slider::new(&mut view.scale, min_scale..=max_scale).show_value(false));
            ui.monospace(format!("{}", view.scale));
        });
    }
}

impl eframe::App for Report {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        egui::CentralPanel::default().show(ctx, |ui| {
            egui::ScrollArea::both().auto_shrink(false).show(ui, |ui| {
                ui.heading("Build Timings");
                widgets::summary::summary(ui, &self.snapshot);
                ui.separator();

                if !self.scale_fitted {
                    // Start with the pipeline chart filling the viewport.
                    self.state.view.scale =
                        scale_for_width(ui.available_width(), self.snapshot.duration);
                    self.scale_fitted = true;
                }
                self.controls(ui);

                ui.add(PipelineGraph::new(&self.snapshot, &mut self.state));
                ui.add_space(10.0);
                ui.add(ConcurrencyGraph::new(&self.snapshot, self.state.view.scale));

                CollapsingHeader::new("Units by total time").show(ui, |ui| {
                    widgets::summary::unit_table(ui, &self.snapshot);
                });
            });
        });
    }
}
