//! The pipeline (Gantt) chart: one bar per visible unit, phase overlays,
//! unlock connectors, and the hover highlight layer.

use std::collections::HashMap;

use eframe::egui::{
    self, pos2, vec2, Align2, Color32, LayerId, Order, Painter, Pos2, Rect, Response, Sense, Shape,
    Stroke, TextStyle, Ui, Widget,
};

use crate::axis::{choose_ticks, width_for_scale};
use crate::snapshot::{SectionName, Snapshot, Unit, UnitId};
use crate::themes::{ChartMetrics, PipelineStyle, Styled};
use crate::view::{PipelineLayout, ReportState, SectionLayout, UnitLayout, ViewState};
use crate::widgets::legend::{self, LegendEntry, LegendMark};

/// Units surviving the duration filter, in their original order.
pub fn visible_units(units: &[Unit], min_duration: f64) -> Vec<&Unit> {
    units
        .iter()
        .filter(|unit| unit.duration >= min_duration)
        .collect()
}

/// Occurrences of each name among the visible units. Labels carry the
/// version only for names that appear more than once.
pub fn name_counts<'a>(visible: &[&'a Unit]) -> HashMap<&'a str, usize> {
    let mut counts = HashMap::new();
    for unit in visible {
        *counts.entry(unit.name.as_str()).or_insert(0) += 1;
    }
    counts
}

/// Lay the visible units out in chart-local pixels.
pub fn compute_layout(
    snapshot: &Snapshot,
    view: &ViewState,
    metrics: &ChartMetrics,
) -> PipelineLayout {
    let graph_width = width_for_scale(view.scale, snapshot.duration);
    let px_per_sec = if snapshot.duration > 0.0 {
        graph_width / snapshot.duration as f32
    } else {
        graph_width
    };

    let units = visible_units(&snapshot.units, view.min_unit_duration)
        .iter()
        .enumerate()
        .map(|(row, unit)| {
            let x = metrics.x_line + px_per_sec * unit.start as f32;
            let y = metrics.margin + row as f32 * metrics.row_pitch();
            // A 1 px floor keeps near-zero units visible.
            let width = (px_per_sec * unit.duration as f32).max(1.0);
            let sections = unit
                .effective_sections()
                .map(|sections| {
                    sections
                        .iter()
                        .filter(|(name, _)| *name != SectionName::Frontend)
                        .map(|(name, span)| SectionLayout {
                            name: name.clone(),
                            x: x + px_per_sec * span.start as f32,
                            width: px_per_sec * span.duration() as f32,
                        })
                        .collect()
                })
                .unwrap_or_default();
            let rmeta_x = unit
                .codegen_start()
                .map(|start| x + px_per_sec * start as f32);
            UnitLayout {
                id: unit.i,
                x,
                y,
                width,
                rmeta_x,
                sections,
            }
        })
        .collect();

    PipelineLayout::new(graph_width, px_per_sec, units)
}

/// Legend entries for what actually got drawn: the base bar entry always,
/// section categories only when they occurred.
pub fn legend_entries(layout: &PipelineLayout, style: &PipelineStyle) -> Vec<LegendEntry> {
    let mut entries = vec![LegendEntry::new(
        "Frontend / rest",
        LegendMark::Swatch(style.not_custom_build),
    )];
    for (label, key, color) in [
        ("Codegen", "codegen", style.codegen),
        ("Link", "link", style.link),
        ("Other", "other", style.other),
    ] {
        let occurred = layout
            .units
            .iter()
            .flat_map(|unit| &unit.sections)
            .any(|section| section.name.name() == key);
        if occurred {
            entries.push(LegendEntry::new(label, LegendMark::Swatch(color)));
        }
    }
    entries
}

/// Three-segment elbow from a connector origin to a target bar's start.
fn elbow(from: Pos2, to: Pos2) -> Vec<Pos2> {
    vec![
        from,
        pos2(to.x - 5.0, from.y),
        pos2(to.x - 5.0, to.y),
        to,
    ]
}

#[must_use = "You should put this widget in a ui with `ui.add(widget);`"]
pub struct PipelineGraph<'a> {
    snapshot: &'a Snapshot,
    state: &'a mut ReportState,
    metrics: ChartMetrics,
    style: Option<PipelineStyle>,
}

impl<'a> PipelineGraph<'a> {
    pub fn new(snapshot: &'a Snapshot, state: &'a mut ReportState) -> Self {
        Self {
            snapshot,
            state,
            metrics: ChartMetrics::default(),
            style: None,
        }
    }

    pub fn metrics(mut self, metrics: ChartMetrics) -> Self {
        self.metrics = metrics;
        self
    }

    fn draw_connectors(
        painter: &Painter,
        origin: egui::Vec2,
        layout: &PipelineLayout,
        unit: &Unit,
        unit_layout: &UnitLayout,
        box_height: f32,
        color: Color32,
    ) {
        let stroke = Stroke::new(1.0, color);
        let center = |l: &UnitLayout| l.y + box_height / 2.0;

        for &target in &unit.unlocked_units {
            // Filtered-out targets are routine, not an error.
            let Some(target_layout) = layout.unit(target) else {
                continue;
            };
            let from = pos2(unit_layout.right(), center(unit_layout)) + origin;
            let to = pos2(target_layout.x, center(target_layout)) + origin;
            painter.add(Shape::line(elbow(from, to), stroke));
        }

        // Metadata unlocks hang off the codegen boundary; a unit that never
        // reached codegen (e.g. a check-only build) has no origin to draw
        // from.
        let Some(rmeta_x) = unit_layout.rmeta_x else {
            return;
        };
        for &target in &unit.unlocked_rmeta_units {
            let Some(target_layout) = layout.unit(target) else {
                continue;
            };
            let from = pos2(rmeta_x, center(unit_layout)) + origin;
            let to = pos2(target_layout.x, center(target_layout)) + origin;
            painter.add(Shape::line(elbow(from, to), stroke));
        }
    }
}

impl Widget for PipelineGraph<'_> {
    fn ui(self, ui: &mut Ui) -> Response {
        let PipelineGraph {
            snapshot,
            state,
            metrics,
            style,
        } = self;

        let style = style.unwrap_or_else(|| PipelineStyle::from(ui.style().as_ref()));
        let mut layout = compute_layout(snapshot, &state.view, &metrics);
        let visible = visible_units(&snapshot.units, state.view.min_unit_duration);
        let counts = name_counts(&visible);

        let desired = vec2(
            metrics.x_line + layout.graph_width + 30.0,
            metrics.margin + visible.len() as f32 * metrics.row_pitch() + metrics.y_line,
        );
        let (rect, response) = ui.allocate_exact_size(desired, Sense::hover());
        if !ui.is_rect_visible(rect) {
            state.pipeline = layout;
            state.hover.update(None);
            return response;
        }

        let origin = rect.min.to_vec2();
        let painter = ui.painter_at(rect);
        let font_id = TextStyle::Small.resolve(ui.style());

        painter.rect_filled(rect, 0.0, style.background);

        // Axes and time gridlines.
        let axis_stroke = Stroke::new(1.0, style.axes);
        let axis_left = rect.left() + metrics.x_line;
        let axis_bottom = rect.bottom() - metrics.y_line;
        painter.line_segment(
            [
                pos2(axis_left, rect.top() + metrics.margin),
                pos2(axis_left, axis_bottom),
            ],
            axis_stroke,
        );
        painter.line_segment(
            [
                pos2(axis_left, axis_bottom),
                pos2(rect.right() - metrics.margin, axis_bottom),
            ],
            axis_stroke,
        );
        match choose_ticks(
            snapshot.duration.ceil(),
            layout.px_per_sec,
            layout.graph_width,
            &metrics,
        ) {
            Ok(ticks) => {
                for i in 1..=ticks.count {
                    let x = axis_left + ticks.spacing_px * i as f32;
                    painter.line_segment(
                        [pos2(x, rect.top() + metrics.margin), pos2(x, axis_bottom)],
                        Stroke::new(1.0, style.grid),
                    );
                    painter.line_segment(
                        [pos2(x, axis_bottom), pos2(x, axis_bottom + 5.0)],
                        axis_stroke,
                    );
                    painter.text(
                        pos2(x, axis_bottom + 7.0),
                        Align2::CENTER_TOP,
                        format!("{}s", ticks.step * i as f64),
                        font_id.clone(),
                        style.ink,
                    );
                }
            }
            Err(err) => log::error!("pipeline time axis unrenderable: {err}"),
        }

        // Base connector lines go under the bars.
        for (unit, unit_layout) in visible.iter().zip(&layout.units) {
            Self::draw_connectors(
                &painter,
                origin,
                &layout,
                unit,
                unit_layout,
                metrics.box_height,
                style.dep_line,
            );
        }

        // Bars, section overlays, labels, hit boxes.
        let mut hitboxes = Vec::with_capacity(layout.units.len());
        for (unit, unit_layout) in visible.iter().zip(&layout.units) {
            let bar = Rect::from_min_size(
                pos2(unit_layout.x, unit_layout.y) + origin,
                vec2(unit_layout.width, metrics.box_height),
            );
            let base = if unit.is_custom_build() {
                style.custom_build
            } else {
                style.not_custom_build
            };
            painter.rect_filled(bar, metrics.radius, base);

            for section in &unit_layout.sections {
                let section_rect = Rect::from_min_size(
                    pos2(section.x, unit_layout.y) + origin,
                    vec2(section.width, metrics.box_height),
                );
                painter.rect_filled(
                    section_rect,
                    metrics.radius,
                    style.section_color(&section.name.name()),
                );
            }

            let label = unit.label(counts.get(unit.name.as_str()).copied().unwrap_or(0) > 1);
            let galley = painter.layout_no_wrap(label, font_id.clone(), style.ink);
            // Clamp so long labels never run off the right edge.
            let text_x = (bar.left() + 5.0)
                .min(rect.right() - metrics.margin - galley.size().x)
                .max(rect.left() + metrics.margin);
            painter.galley(
                pos2(text_x, bar.center().y - galley.size().y / 2.0),
                galley,
                style.ink,
            );

            hitboxes.push(crate::view::HitBox {
                rect: bar,
                id: unit_layout.id,
            });
        }
        layout.hitboxes = hitboxes;

        legend::draw(
            &painter,
            pos2(rect.right() - metrics.margin, rect.top() + metrics.margin),
            &legend_entries(&layout, &style),
            font_id.clone(),
            &style.legend_style(),
            &metrics,
        );

        // Hover tracking against this frame's hit boxes. The highlight is
        // painted on a foreground layer clipped to the chart, so the base
        // shapes above stay untouched between hover changes.
        let hit = response.hover_pos().and_then(|pos| layout.hit(pos));
        if state.hover.update(hit) {
            log::trace!("pipeline hover changed to {:?}", state.hover.unit());
        }
        if let Some(hovered) = state.hover.unit() {
            if let Some(hovered_layout) = layout.unit(hovered) {
                let overlay = ui
                    .ctx()
                    .layer_painter(LayerId::new(
                        Order::Foreground,
                        response.id.with("overlay"),
                    ))
                    .with_clip_rect(rect);
                let highlight = style.dep_line_highlighted;
                let center = |l: &UnitLayout| l.y + metrics.box_height / 2.0;

                if let Some(unit) = snapshot.units.iter().find(|unit| unit.i == hovered) {
                    Self::draw_connectors(
                        &overlay,
                        origin,
                        &layout,
                        unit,
                        hovered_layout,
                        metrics.box_height,
                        highlight,
                    );
                }

                let stroke = Stroke::new(1.0, highlight);
                if let Some(source) = state
                    .reverse
                    .full_unlocker(hovered)
                    .and_then(|id| layout.unit(id))
                {
                    let from = pos2(source.right(), center(source)) + origin;
                    let to = pos2(hovered_layout.x, center(hovered_layout)) + origin;
                    overlay.add(Shape::line(elbow(from, to), stroke));
                }
                if let Some(source) = state
                    .reverse
                    .rmeta_unlocker(hovered)
                    .and_then(|id| layout.unit(id))
                {
                    if let Some(rmeta_x) = source.rmeta_x {
                        let from = pos2(rmeta_x, center(source)) + origin;
                        let to = pos2(hovered_layout.x, center(hovered_layout)) + origin;
                        overlay.add(Shape::line(elbow(from, to), stroke));
                    }
                }
            }
        }

        state.pipeline = layout;
        response
    }
}

impl Styled for PipelineGraph<'_> {
    type Style = PipelineStyle;

    fn styled(mut self, style: Self::Style) -> Self {
        self.style = Some(style);
        self
    }
}
