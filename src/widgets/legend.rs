//! Labeled-swatch legend box shared by both charts.

use egui::{pos2, vec2, Align2, Color32, FontId, Painter, Pos2, Rect, Stroke, StrokeKind};

use crate::themes::{ChartMetrics, LegendStyle};

/// How one legend entry marks its category.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum LegendMark {
    /// Solid square with an outline; used for bar categories.
    Swatch(Color32),
    /// Horizontal line sample; used for line series.
    Line(Color32),
    /// Borderless filled square; used for area fills.
    Fill(Color32),
}

#[derive(Clone, Debug)]
pub struct LegendEntry {
    pub label: String,
    pub mark: LegendMark,
}

impl LegendEntry {
    pub fn new(label: impl Into<String>, mark: LegendMark) -> Self {
        Self {
            label: label.into(),
            mark,
        }
    }
}

/// Draw a legend box with its top-right corner at `top_right`.
///
/// Entries are measured first so the box hugs its widest label. Returns the
/// painted rect.
pub fn draw(
    painter: &Painter,
    top_right: Pos2,
    entries: &[LegendEntry],
    font_id: FontId,
    style: &LegendStyle,
    metrics: &ChartMetrics,
) -> Rect {
    if entries.is_empty() {
        return Rect::NOTHING;
    }

    let galleys: Vec<_> = entries
        .iter()
        .map(|entry| painter.layout_no_wrap(entry.label.clone(), font_id.clone(), style.ink))
        .collect();

    let swatch = metrics.legend_swatch;
    let pad = metrics.legend_pad;
    let gap = 4.0;
    let row_h = galleys
        .iter()
        .map(|galley| galley.size().y)
        .fold(swatch, f32::max)
        + 2.0;
    let text_w = galleys
        .iter()
        .map(|galley| galley.size().x)
        .fold(0.0, f32::max);

    let size = vec2(
        pad + swatch + gap + text_w + pad,
        pad + entries.len() as f32 * row_h + pad,
    );
    let rect = Rect::from_min_size(pos2(top_right.x - size.x, top_right.y), size);

    painter.rect_filled(rect, 0.0, style.background);
    painter.rect_stroke(rect, 0.0, Stroke::new(1.0, style.outline), StrokeKind::Inside);

    for (i, (entry, galley)) in entries.iter().zip(galleys).enumerate() {
        let row_top = rect.top() + pad + i as f32 * row_h;
        let mark_center_y = row_top + row_h / 2.0;
        let mark_rect = Rect::from_center_size(
            pos2(rect.left() + pad + swatch / 2.0, mark_center_y),
            vec2(swatch, swatch),
        );
        match entry.mark {
            LegendMark::Swatch(color) => {
                painter.rect_filled(mark_rect, 0.0, color);
                painter.rect_stroke(
                    mark_rect,
                    0.0,
                    Stroke::new(1.0, style.outline),
                    StrokeKind::Inside,
                );
            }
            LegendMark::Line(color) => {
                painter.line_segment(
                    [
                        pos2(mark_rect.left(), mark_center_y),
                        pos2(mark_rect.right(), mark_center_y),
                    ],
                    Stroke::new(2.0, color),
                );
            }
            LegendMark::Fill(color) => {
                painter.rect_filled(mark_rect, 0.0, color);
            }
        }
        painter.text(
            pos2(mark_rect.right() + gap, mark_center_y),
            Align2::LEFT_CENTER,
            &entry.label,
            font_id.clone(),
            style.ink,
        );
    }

    rect
}
