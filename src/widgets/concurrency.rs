//! The concurrency chart: stepped active/waiting/inactive counts over time
//! with a CPU-utilization fill sharing the vertical scale.

use eframe::egui::{
    self, pos2, vec2, Align2, Response, Sense, Shape, Stroke, TextStyle, Ui, Widget,
};

use crate::axis::{choose_ticks, width_for_scale};
use crate::snapshot::{ConcurrencyPoint, Snapshot};
use crate::themes::{ChartMetrics, ConcurrencyStyle, Styled};
use crate::widgets::legend::{self, LegendEntry, LegendMark};

/// Highest count across all three series; the shared vertical bound.
pub fn max_count(concurrency: &[ConcurrencyPoint]) -> usize {
    concurrency
        .iter()
        .flat_map(|point| [point.active, point.waiting, point.inactive])
        .max()
        .unwrap_or(0)
}

/// Turn samples of a discrete state count into a stepped polyline:
/// horizontal to each new time, then vertical to the new value. Emits
/// `2n - 1` points for `n` samples.
pub fn stepped_path(samples: &[(f64, f64)]) -> Vec<(f64, f64)> {
    let mut points = Vec::with_capacity(samples.len() * 2);
    for &(t, value) in samples {
        if let Some(&(_, previous)) = points.last() {
            points.push((t, previous));
        }
        points.push((t, value));
    }
    points
}

/// Outline of the CPU fill in value space, scaled into the count range and
/// anchored at zero at the first and last sample times. `None` below two
/// samples, since a single reading spans no area.
pub fn cpu_fill_outline(samples: &[(f64, f64)], max_count: f64) -> Option<Vec<(f64, f64)>> {
    let (first, rest) = samples.split_first()?;
    let last = rest.last()?;

    let mut points = Vec::with_capacity(samples.len() + 2);
    points.push((first.0, 0.0));
    points.extend(
        samples
            .iter()
            .map(|&(t, usage)| (t, usage / 100.0 * max_count)),
    );
    points.push((last.0, 0.0));
    Some(points)
}

#[must_use = "You should put this widget in a ui with `ui.add(widget);`"]
pub struct ConcurrencyGraph<'a> {
    snapshot: &'a Snapshot,
    scale: u32,
    metrics: ChartMetrics,
    style: Option<ConcurrencyStyle>,
}

impl<'a> ConcurrencyGraph<'a> {
    pub fn new(snapshot: &'a Snapshot, scale: u32) -> Self {
        Self {
            snapshot,
            scale,
            metrics: ChartMetrics::default(),
            style: None,
        }
    }

    pub fn metrics(mut self, metrics: ChartMetrics) -> Self {
        self.metrics = metrics;
        self
    }
}

impl Widget for ConcurrencyGraph<'_> {
    fn ui(self, ui: &mut Ui) -> Response {
        let ConcurrencyGraph {
            snapshot,
            scale,
            metrics,
            style,
        } = self;

        let style = style.unwrap_or_else(|| ConcurrencyStyle::from(ui.style().as_ref()));
        let concurrency = &snapshot.concurrency;
        let top = max_count(concurrency);
        if top == 0 {
            return ui.weak("No concurrency samples recorded.");
        }

        let graph_width = width_for_scale(scale, snapshot.duration);
        let px_per_sec = if snapshot.duration > 0.0 {
            graph_width / snapshot.duration as f32
        } else {
            graph_width
        };
        let plot_height = metrics.concurrency_height;
        let px_per_count = plot_height / top as f32;

        let desired = vec2(
            metrics.x_line + graph_width + 30.0,
            metrics.margin + plot_height + metrics.y_line,
        );
        let (rect, response) = ui.allocate_exact_size(desired, Sense::hover());
        if !ui.is_rect_visible(rect) {
            return response;
        }

        let painter = ui.painter_at(rect);
        let font_id = TextStyle::Small.resolve(ui.style());
        painter.rect_filled(rect, 0.0, style.background);

        let axis_left = rect.left() + metrics.x_line;
        let axis_bottom = rect.bottom() - metrics.y_line;
        let plot_top = rect.top() + metrics.margin;
        let axis_stroke = Stroke::new(1.0, style.axes);
        painter.line_segment([pos2(axis_left, plot_top), pos2(axis_left, axis_bottom)], axis_stroke);
        painter.line_segment(
            [
                pos2(axis_left, axis_bottom),
                pos2(rect.right() - metrics.margin, axis_bottom),
            ],
            axis_stroke,
        );

        let to_screen =
            |t: f64, v: f64| pos2(axis_left + t as f32 * px_per_sec, axis_bottom - v as f32 * px_per_count);

        // Count axis: horizontal gridlines and labels on the left.
        match choose_ticks(top as f64, px_per_count, plot_height, &metrics) {
            Ok(ticks) => {
                for i in 1..=ticks.count {
                    let y = axis_bottom - ticks.spacing_px * i as f32;
                    painter.line_segment(
                        [pos2(axis_left, y), pos2(axis_left + graph_width, y)],
                        Stroke::new(1.0, style.grid),
                    );
                    painter.text(
                        pos2(axis_left - 4.0, y),
                        Align2::RIGHT_CENTER,
                        format!("{}", ticks.step * i as f64),
                        font_id.clone(),
                        style.ink,
                    );
                }
            }
            Err(err) => log::error!("concurrency count axis unrenderable: {err}"),
        }

        // Time axis ticks along the bottom.
        match choose_ticks(snapshot.duration.ceil(), px_per_sec, graph_width, &metrics) {
            Ok(ticks) => {
                for i in 1..=ticks.count {
                    let x = axis_left + ticks.spacing_px * i as f32;
                    painter.line_segment([pos2(x, axis_bottom), pos2(x, axis_bottom + 5.0)], axis_stroke);
                    painter.text(
                        pos2(x, axis_bottom + 7.0),
                        Align2::CENTER_TOP,
                        format!("{}s", ticks.step * i as f64),
                        font_id.clone(),
                        style.ink,
                    );
                }
            }
            Err(err) => log::error!("concurrency time axis unrenderable: {err}"),
        }

        // CPU fill first so the count lines stay readable on top of it.
        if let Some(outline) = cpu_fill_outline(&snapshot.cpu_usage, top as f64) {
            let scaled: Vec<_> = outline.iter().map(|&(t, v)| to_screen(t, v)).collect();
            // The outline is anchored at zero on both ends; fill it one
            // trapezoid per sample segment to stay convex.
            for pair in scaled[1..scaled.len() - 1].windows(2) {
                let quad = vec![
                    pos2(pair[0].x, axis_bottom),
                    pos2(pair[0].x, pair[0].y),
                    pos2(pair[1].x, pair[1].y),
                    pos2(pair[1].x, axis_bottom),
                ];
                painter.add(Shape::convex_polygon(quad, style.cpu_fill, Stroke::NONE));
            }
        }

        // Discrete counts change instantaneously, so the lines are stepped
        // rather than interpolated.
        type Extract = fn(&ConcurrencyPoint) -> usize;
        let series: [(Extract, egui::Color32); 3] = [
            (|p| p.active, style.active),
            (|p| p.waiting, style.waiting),
            (|p| p.inactive, style.inactive),
        ];
        for (extract, color) in series {
            let samples: Vec<(f64, f64)> = concurrency
                .iter()
                .map(|point| (point.t, extract(point) as f64))
                .collect();
            let points = stepped_path(&samples)
                .into_iter()
                .map(|(t, v)| to_screen(t, v))
                .collect();
            painter.add(Shape::line(points, Stroke::new(2.0, color)));
        }

        legend::draw(
            &painter,
            pos2(rect.right() - metrics.margin, rect.top() + metrics.margin),
            &[
                LegendEntry::new("Waiting", LegendMark::Line(style.waiting)),
                LegendEntry::new("Inactive", LegendMark::Line(style.inactive)),
                LegendEntry::new("Active", LegendMark::Line(style.active)),
                LegendEntry::new("CPU usage", LegendMark::Fill(style.cpu_fill)),
            ],
            font_id,
            &style.legend_style(),
            &metrics,
        );

        response
    }
}

impl Styled for ConcurrencyGraph<'_> {
    type Style = ConcurrencyStyle;

    fn styled(mut self, style: Self::Style) -> Self {
        self.style = Some(style);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stepped_path_emits_two_n_minus_one_points() {
        let samples = [(0.0, 1.0), (2.0, 3.0), (5.0, 0.0)];
        let points = stepped_path(&samples);
        assert_eq!(points.len(), 5);
        assert_eq!(
            points,
            vec![(0.0, 1.0), (2.0, 1.0), (2.0, 3.0), (5.0, 3.0), (5.0, 0.0)]
        );
    }

    #[test]
    fn stepped_path_of_one_sample_is_a_point() {
        assert_eq!(stepped_path(&[(1.0, 2.0)]), vec![(1.0, 2.0)]);
        assert!(stepped_path(&[]).is_empty());
    }

    #[test]
    fn cpu_fill_needs_two_samples() {
        assert!(cpu_fill_outline(&[], 4.0).is_none());
        assert!(cpu_fill_outline(&[(0.0, 50.0)], 4.0).is_none());
    }

    #[test]
    fn cpu_fill_scales_into_the_count_range_and_anchors_at_zero() {
        let outline = cpu_fill_outline(&[(0.0, 50.0), (10.0, 100.0)], 4.0).unwrap();
        assert_eq!(
            outline,
            vec![(0.0, 0.0), (0.0, 2.0), (10.0, 4.0), (10.0, 0.0)]
        );
    }

    #[test]
    fn max_count_spans_all_three_series() {
        let concurrency = vec![
            ConcurrencyPoint {
                t: 0.0,
                active: 2,
                waiting: 0,
                inactive: 7,
            },
            ConcurrencyPoint {
                t: 1.0,
                active: 4,
                waiting: 5,
                inactive: 1,
            },
        ];
        assert_eq!(max_count(&concurrency), 7);
        assert_eq!(max_count(&[]), 0);
    }
}
