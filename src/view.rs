//! Mutable view state and the per-render layout caches.
//!
//! Everything the charts mutate lives here, owned by one [`ReportState`]
//! per viewer instance. The chart widgets themselves are pure functions of
//! `(snapshot, state)`: they repopulate the caches on every render and keep
//! nothing of their own.

use std::collections::HashMap;

use egui::{Pos2, Rect};

use crate::graph::ReverseDeps;
use crate::snapshot::{SectionName, Snapshot, UnitId};

/// The two user-driven controls.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ViewState {
    /// Scale slider position; pixels per second grow linearly with it.
    pub scale: u32,
    /// Units shorter than this many seconds are hidden.
    pub min_unit_duration: f64,
}

impl Default for ViewState {
    fn default() -> Self {
        Self {
            scale: 50,
            min_unit_duration: 0.0,
        }
    }
}

/// Hover state machine of the pipeline chart.
///
/// Transitions happen only when the pointer's containing hit box changes;
/// a pointer over empty chart space clears back to [`Hover::Idle`].
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum Hover {
    #[default]
    Idle,
    Hovering(UnitId),
}

impl Hover {
    /// Feed the unit under the pointer (if any). Returns whether a
    /// transition occurred, i.e. whether the highlight overlay is stale.
    pub fn update(&mut self, hit: Option<UnitId>) -> bool {
        let next = match hit {
            Some(id) => Hover::Hovering(id),
            None => Hover::Idle,
        };
        if next == *self {
            return false;
        }
        *self = next;
        true
    }

    pub fn unit(&self) -> Option<UnitId> {
        match self {
            Hover::Idle => None,
            Hover::Hovering(id) => Some(*id),
        }
    }
}

/// Where one section of a unit landed, in chart-local pixels.
#[derive(Clone, Debug)]
pub struct SectionLayout {
    pub name: SectionName,
    pub x: f32,
    pub width: f32,
}

/// Where one visible unit's bar landed, in chart-local pixels.
#[derive(Clone, Debug)]
pub struct UnitLayout {
    pub id: UnitId,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    /// Absolute x of the codegen section start; origin of metadata-unlock
    /// connectors. `None` for units that never reached codegen.
    pub rmeta_x: Option<f32>,
    pub sections: Vec<SectionLayout>,
}

impl UnitLayout {
    pub fn right(&self) -> f32 {
        self.x + self.width
    }
}

/// Screen-space rectangle used to test pointer hits on one unit's bar.
#[derive(Clone, Copy, Debug)]
pub struct HitBox {
    pub rect: Rect,
    pub id: UnitId,
}

/// Per-render geometry cache of the pipeline chart.
///
/// Rebuilt from scratch on every render; hit boxes are only meaningful for
/// the frame they were computed in.
#[derive(Clone, Debug, Default)]
pub struct PipelineLayout {
    pub graph_width: f32,
    pub px_per_sec: f32,
    /// Visible units in their original snapshot order.
    pub units: Vec<UnitLayout>,
    pub hitboxes: Vec<HitBox>,
    by_id: HashMap<UnitId, usize>,
}

impl PipelineLayout {
    pub fn new(graph_width: f32, px_per_sec: f32, units: Vec<UnitLayout>) -> Self {
        let by_id = units.iter().enumerate().map(|(i, u)| (u.id, i)).collect();
        Self {
            graph_width,
            px_per_sec,
            units,
            hitboxes: Vec::new(),
            by_id,
        }
    }

    /// Layout of a unit, or `None` if it is filtered out of view.
    pub fn unit(&self, id: UnitId) -> Option<&UnitLayout> {
        self.by_id.get(&id).map(|&i| &self.units[i])
    }

    /// Linear scan of the hit boxes. Deliberately unoptimized; the visible
    /// unit count is small.
    pub fn hit(&self, pos: Pos2) -> Option<UnitId> {
        self.hitboxes
            .iter()
            .find(|hit| hit.rect.contains(pos))
            .map(|hit| hit.id)
    }
}

/// All mutable state of one open report, and the index built at load time.
pub struct ReportState {
    pub view: ViewState,
    pub hover: Hover,
    pub reverse: ReverseDeps,
    pub pipeline: PipelineLayout,
}

impl ReportState {
    pub fn new(snapshot: &Snapshot) -> Self {
        Self {
            view: ViewState::default(),
            hover: Hover::default(),
            reverse: ReverseDeps::build(&snapshot.units),
            pipeline: PipelineLayout::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use egui::pos2;

    #[test]
    fn hover_fires_once_per_distinct_unit() {
        let mut hover = Hover::default();
        assert!(hover.update(Some(3)));
        assert!(!hover.update(Some(3)));
        assert!(!hover.update(Some(3)));
        assert!(hover.update(Some(4)));
        assert_eq!(hover.unit(), Some(4));
    }

    #[test]
    fn hover_clears_over_empty_space() {
        let mut hover = Hover::default();
        assert!(!hover.update(None));
        assert!(hover.update(Some(1)));
        assert!(hover.update(None));
        assert_eq!(hover, Hover::Idle);
        assert!(!hover.update(None));
    }

    #[test]
    fn hit_scan_finds_the_containing_box() {
        let mut layout = PipelineLayout::default();
        layout.hitboxes = vec![
            HitBox {
                rect: Rect::from_min_max(pos2(0.0, 0.0), pos2(10.0, 10.0)),
                id: 1,
            },
            HitBox {
                rect: Rect::from_min_max(pos2(0.0, 20.0), pos2(10.0, 30.0)),
                id: 2,
            },
        ];
        assert_eq!(layout.hit(pos2(5.0, 5.0)), Some(1));
        assert_eq!(layout.hit(pos2(5.0, 25.0)), Some(2));
        assert_eq!(layout.hit(pos2(5.0, 15.0)), None);
    }

    #[test]
    fn layouts_are_looked_up_by_id() {
        let layout = PipelineLayout::new(
            100.0,
            10.0,
            vec![UnitLayout {
                id: 7,
                x: 1.0,
                y: 2.0,
                width: 3.0,
                rmeta_x: None,
                sections: Vec::new(),
            }],
        );
        assert_eq!(layout.unit(7).unwrap().right(), 4.0);
        assert!(layout.unit(8).is_none());
    }
}
