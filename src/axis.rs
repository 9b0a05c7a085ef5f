//! Tick layout and scale mapping shared by both charts.

use crate::themes::ChartMetrics;

/// Pixels one scale step adds per second of report time.
pub const PX_PER_SEC_PER_SCALE: f32 = 8.0;
/// Narrowest a chart is allowed to get.
pub const MIN_GRAPH_WIDTH: f32 = 200.0;
/// Widest a chart is allowed to get.
pub const MAX_GRAPH_WIDTH: f32 = 4096.0;

/// Result of laying out ticks along one bounded axis.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Ticks {
    /// Value covered between two adjacent ticks.
    pub step: f64,
    /// Pixel distance between two adjacent ticks.
    pub spacing_px: f32,
    /// Number of ticks drawn after the axis origin.
    pub count: u32,
}

#[derive(Debug, thiserror::Error)]
pub enum AxisError {
    /// The step search ran off the end of its ladder. This only happens for
    /// pathological inputs (a huge `max_value` against a tiny axis), so the
    /// axis is treated as unrenderable rather than approximated.
    #[error("no tick step found for max value {max_value} within {max_ticks} ticks")]
    TickSearchOverflow { max_value: f64, max_ticks: u32 },
}

/// Pick a "nice" tick step for an axis spanning `max_value` units drawn at
/// `px_per_unit`, so that adjacent tick labels stay at least
/// [`ChartMetrics::min_tick_dist`] pixels apart within `max_px`.
///
/// Steps are searched in the order 1, 2, 4, 5, then multiples of 10. The
/// multiples search gives up after 100 rounds; see [`AxisError`].
pub fn choose_ticks(
    max_value: f64,
    px_per_unit: f32,
    max_px: f32,
    metrics: &ChartMetrics,
) -> Result<Ticks, AxisError> {
    let max_ticks = (max_px / metrics.min_tick_dist).floor() as u32;
    if max_ticks <= 1 {
        // The axis is too narrow for more than a single span.
        return Ok(Ticks {
            step: max_value,
            spacing_px: max_px,
            count: 1,
        });
    }

    let ticks = max_ticks as f64;
    let step = if max_value <= ticks {
        1.0
    } else if max_value <= ticks * 2.0 {
        2.0
    } else if max_value <= ticks * 4.0 {
        4.0
    } else if max_value <= ticks * 5.0 {
        5.0
    } else {
        let mut step = 10.0;
        let mut rounds = 0;
        loop {
            if rounds > 100 {
                return Err(AxisError::TickSearchOverflow {
                    max_value,
                    max_ticks,
                });
            }
            rounds += 1;
            if max_value <= ticks * step {
                break;
            }
            step += 10.0;
        }
        step
    };

    Ok(Ticks {
        step,
        spacing_px: px_per_unit * step as f32,
        count: ((max_value / step).floor() as u32).max(1),
    })
}

/// Chart width for a scale slider position.
pub fn width_for_scale(scale: u32, duration: f64) -> f32 {
    (scale as f32 * PX_PER_SEC_PER_SCALE * duration as f32).clamp(MIN_GRAPH_WIDTH, MAX_GRAPH_WIDTH)
}

/// Approximate inverse of [`width_for_scale`]: the scale whose chart width
/// is closest to `width`. The width is clamped into the legal range first
/// and the scale rounded to the nearest integer, floored at 1.
pub fn scale_for_width(width: f32, duration: f64) -> u32 {
    if duration <= 0.0 {
        return 1;
    }
    let width = width.clamp(MIN_GRAPH_WIDTH, MAX_GRAPH_WIDTH);
    let scale = width / (PX_PER_SEC_PER_SCALE * duration as f32);
    (scale.round() as u32).max(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn metrics() -> ChartMetrics {
        ChartMetrics::default()
    }

    #[test]
    fn narrow_axis_collapses_to_one_tick() {
        let ticks = choose_ticks(120.0, 1.0, 60.0, &metrics()).unwrap();
        assert_eq!(ticks.count, 1);
        assert_eq!(ticks.step, 120.0);
        assert_eq!(ticks.spacing_px, 60.0);
    }

    #[test]
    fn step_ladder_picks_smallest_fit() {
        // 800 px / 50 px min distance = 16 ticks available.
        let m = metrics();
        assert_eq!(choose_ticks(10.0, 8.0, 800.0, &m).unwrap().step, 1.0);
        assert_eq!(choose_ticks(30.0, 8.0, 800.0, &m).unwrap().step, 2.0);
        assert_eq!(choose_ticks(60.0, 8.0, 800.0, &m).unwrap().step, 4.0);
        assert_eq!(choose_ticks(78.0, 8.0, 800.0, &m).unwrap().step, 5.0);
        assert_eq!(choose_ticks(100.0, 8.0, 800.0, &m).unwrap().step, 10.0);
        assert_eq!(choose_ticks(400.0, 8.0, 800.0, &m).unwrap().step, 30.0);
    }

    #[test]
    fn tick_count_is_at_least_one() {
        // A sub-step axis still reports one tick.
        let ticks = choose_ticks(0.5, 100.0, 800.0, &metrics()).unwrap();
        assert_eq!(ticks.count, 1);
        assert_eq!(ticks.step, 1.0);
    }

    #[test]
    fn count_times_step_stays_bounded() {
        let m = metrics();
        for max_value in [1.0, 3.0, 17.0, 99.0, 1234.0, 9999.0] {
            let ticks = choose_ticks(max_value, 4.0, 1000.0, &m).unwrap();
            assert!(ticks.count >= 1);
            assert!(ticks.count as f64 * ticks.step <= max_value + ticks.step);
        }
    }

    #[test]
    fn runaway_value_fails_instead_of_looping() {
        // Two usable ticks against a millionfold range: nothing on the
        // ladder fits within 100 rounds.
        let err = choose_ticks(1.0e7, 0.001, 100.0, &metrics()).unwrap_err();
        assert!(matches!(err, AxisError::TickSearchOverflow { .. }));
    }

    #[test]
    fn width_for_scale_scenario() {
        assert_eq!(width_for_scale(8, 10.0), 640.0);
    }

    #[test]
    fn width_for_scale_clamps_both_ends() {
        assert_eq!(width_for_scale(1, 0.1), MIN_GRAPH_WIDTH);
        assert_eq!(width_for_scale(100, 3600.0), MAX_GRAPH_WIDTH);
    }

    #[test]
    fn scale_round_trips_into_legal_widths() {
        for width in [0.0, 50.0, 200.0, 640.0, 1234.5, 4096.0, 100_000.0] {
            let w = width_for_scale(scale_for_width(width, 10.0), 10.0);
            assert!((MIN_GRAPH_WIDTH..=MAX_GRAPH_WIDTH).contains(&w));
        }
    }

    #[test]
    fn scale_for_width_floors_at_one() {
        assert_eq!(scale_for_width(0.0, 3600.0), 1);
        assert_eq!(scale_for_width(200.0, 0.0), 1);
    }
}
