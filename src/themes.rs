//! Semantic styles and layout metrics for the chart widgets.
//!
//! Each widget owns one style struct derived from the application
//! [`egui::Style`] (with a light/dark split) and overridable per widget via
//! [`Styled`]. Layout constants live in [`ChartMetrics`] so the geometry of
//! both charts is tuned in one place.

use egui::{Color32, Style};

/// Provide a per-widget style override API.
pub trait Styled {
    type Style: Clone;
    fn styled(self, style: Self::Style) -> Self;
}

/// Layout constants shared by the pipeline and concurrency charts.
#[derive(Clone, Copy, Debug)]
pub struct ChartMetrics {
    /// Offset of the vertical axis from the chart's left edge.
    pub x_line: f32,
    /// General-purpose margin.
    pub margin: f32,
    /// Height reserved below the horizontal axis for tick labels.
    pub y_line: f32,
    /// Minimum pixel distance between tick labels.
    pub min_tick_dist: f32,
    /// Corner radius of unit bars.
    pub radius: f32,
    /// Height of one unit bar.
    pub box_height: f32,
    /// Vertical gap between unit bars.
    pub box_gap: f32,
    /// Plot height of the concurrency chart.
    pub concurrency_height: f32,
    /// Side length of a legend swatch.
    pub legend_swatch: f32,
    /// Padding inside the legend box.
    pub legend_pad: f32,
}

impl ChartMetrics {
    /// Vertical distance between the tops of two adjacent unit rows.
    pub fn row_pitch(&self) -> f32 {
        self.box_height + self.box_gap
    }
}

impl Default for ChartMetrics {
    fn default() -> Self {
        Self {
            x_line: 50.0,
            margin: 5.0,
            y_line: 35.0,
            min_tick_dist: 50.0,
            radius: 3.0,
            box_height: 25.0,
            box_gap: 2.0,
            concurrency_height: 200.0,
            legend_swatch: 10.0,
            legend_pad: 5.0,
        }
    }
}

/// Style of the pipeline (Gantt) chart.
#[derive(Clone, Debug)]
pub struct PipelineStyle {
    pub background: Color32,
    pub axes: Color32,
    pub grid: Color32,
    pub ink: Color32,
    /// Base bar color for build-script runs.
    pub custom_build: Color32,
    /// Base bar color for everything else; also the fallback for sections
    /// with unrecognized names.
    pub not_custom_build: Color32,
    pub codegen: Color32,
    pub link: Color32,
    pub other: Color32,
    pub dep_line: Color32,
    pub dep_line_highlighted: Color32,
}

impl PipelineStyle {
    /// Overlay color for a named section. Frontend time is the base bar
    /// itself and unknown names fall back to the base color.
    pub fn section_color(&self, name: &str) -> Color32 {
        match name {
            "codegen" => self.codegen,
            "link" => self.link,
            "other" => self.other,
            _ => self.not_custom_build,
        }
    }

    pub fn legend_style(&self) -> LegendStyle {
        LegendStyle {
            background: self.background,
            outline: self.axes,
            ink: self.ink,
        }
    }
}

impl From<&Style> for PipelineStyle {
    fn from(style: &Style) -> Self {
        let dark_mode = style.visuals.dark_mode;
        Self {
            background: hex(if dark_mode { "#1a1a1a" } else { "#f7f7f7" }),
            axes: hex(if dark_mode { "#b0b0b0" } else { "#303030" }),
            grid: hex(if dark_mode { "#333333" } else { "#e6e6e6" }),
            ink: style.visuals.text_color(),
            custom_build: hex("#f0b165"),
            not_custom_build: hex("#95cce8"),
            codegen: hex("#aa95e8"),
            link: hex("#95e8aa"),
            other: hex("#e895aa"),
            dep_line: hex(if dark_mode { "#444444" } else { "#dddddd" }),
            dep_line_highlighted: hex(if dark_mode { "#ffffff" } else { "#000000" }),
        }
    }
}

/// Style of the concurrency/CPU chart.
#[derive(Clone, Debug)]
pub struct ConcurrencyStyle {
    pub background: Color32,
    pub axes: Color32,
    pub grid: Color32,
    pub ink: Color32,
    pub active: Color32,
    pub waiting: Color32,
    pub inactive: Color32,
    pub cpu_fill: Color32,
}

impl ConcurrencyStyle {
    pub fn legend_style(&self) -> LegendStyle {
        LegendStyle {
            background: self.background,
            outline: self.axes,
            ink: self.ink,
        }
    }
}

impl From<&Style> for ConcurrencyStyle {
    fn from(style: &Style) -> Self {
        let dark_mode = style.visuals.dark_mode;
        Self {
            background: hex(if dark_mode { "#1a1a1a" } else { "#f7f7f7" }),
            axes: hex(if dark_mode { "#b0b0b0" } else { "#303030" }),
            grid: hex(if dark_mode { "#333333" } else { "#e6e6e6" }),
            ink: style.visuals.text_color(),
            active: hex(if dark_mode { "#4fca4f" } else { "#008000" }),
            waiting: hex(if dark_mode { "#ff5c5c" } else { "#e80000" }),
            inactive: hex(if dark_mode { "#6f9bff" } else { "#0000e8" }),
            cpu_fill: Color32::from_rgba_unmultiplied(250, 119, 0, 51),
        }
    }
}

/// Style of the labeled-swatch legend box shared by both charts.
#[derive(Clone, Debug)]
pub struct LegendStyle {
    pub background: Color32,
    pub outline: Color32,
    pub ink: Color32,
}

// Color utilities: simple sRGB linear interpolation for quick palette derivation
pub fn blend(a: Color32, b: Color32, t: f32) -> Color32 {
    let r = (a.r() as f32 * (1.0 - t) + b.r() as f32 * t).round() as u8;
    let g = (a.g() as f32 * (1.0 - t) + b.g() as f32 * t).round() as u8;
    let bch = (a.b() as f32 * (1.0 - t) + b.b() as f32 * t).round() as u8;
    Color32::from_rgb(r, g, bch)
}

fn hex(code: &str) -> Color32 {
    Color32::from_hex(code).expect("palette hex codes are well-formed")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_sections_fall_back_to_the_base_color() {
        let style = PipelineStyle::from(&Style::default());
        assert_eq!(style.section_color("codegen"), style.codegen);
        assert_eq!(style.section_color("link"), style.link);
        assert_eq!(style.section_color("other"), style.other);
        assert_eq!(style.section_color("mystery"), style.not_custom_build);
    }

    #[test]
    fn blend_endpoints() {
        let a = Color32::from_rgb(0, 0, 0);
        let b = Color32::from_rgb(200, 100, 50);
        assert_eq!(blend(a, b, 0.0), a);
        assert_eq!(blend(a, b, 1.0), b);
    }
}
