//! End-to-end checks over a small hand-written snapshot.

use ganttry::view::ReportState;
use ganttry::widgets::pipeline::{compute_layout, visible_units};
use ganttry::{ChartMetrics, Snapshot, ViewState};

const FIXTURE: &str = r#"{
    "duration": 10.0,
    "units": [
        {
            "i": 0,
            "name": "serde",
            "version": "1.0.200",
            "mode": "todo",
            "start": 0.0,
            "duration": 4.0,
            "rmeta_time": 2.0,
            "unlocked_units": [2],
            "unlocked_rmeta_units": [1]
        },
        {
            "i": 1,
            "name": "serde_json",
            "version": "1.0.100",
            "mode": "todo",
            "start": 2.0,
            "duration": 5.0,
            "sections": [
                ["frontend", {"start": 0.0, "end": 3.0}],
                ["codegen", {"start": 3.0, "end": 4.5}],
                ["link", {"start": 4.5, "end": 5.0}]
            ]
        },
        {
            "i": 2,
            "name": "app",
            "version": "0.1.0",
            "mode": "run-custom-build",
            "target": " build script (run)",
            "start": 4.0,
            "duration": 0.05
        }
    ],
    "concurrency": [
        {"t": 0.0, "active": 1, "waiting": 0, "inactive": 2},
        {"t": 2.0, "active": 2, "waiting": 0, "inactive": 1},
        {"t": 4.0, "active": 2, "waiting": 0, "inactive": 0},
        {"t": 10.0, "active": 0, "waiting": 0, "inactive": 0}
    ],
    "cpu_usage": [[0.0, 20.0], [5.0, 90.0], [10.0, 35.0]],
    "meta": {"profile": "dev", "jobs": 8}
}"#;

fn view(scale: u32, min_unit_duration: f64) -> ViewState {
    ViewState {
        scale,
        min_unit_duration,
    }
}

#[test]
fn snapshot_round_trips_through_the_public_api() {
    let snapshot = Snapshot::from_json(FIXTURE).unwrap();
    assert_eq!(snapshot.units.len(), 3);
    assert_eq!(snapshot.max_concurrency(), 2);
    assert_eq!(snapshot.meta.as_ref().unwrap().jobs, Some(8));

    let state = ReportState::new(&snapshot);
    assert_eq!(state.reverse.full_unlocker(2), Some(0));
    assert_eq!(state.reverse.rmeta_unlocker(1), Some(0));
    assert_eq!(state.reverse.full_unlocker(0), None);
}

#[test]
fn reverse_edges_match_the_forward_lists() {
    let snapshot = Snapshot::from_json(FIXTURE).unwrap();
    let state = ReportState::new(&snapshot);

    for unit in &snapshot.units {
        for &target in &unit.unlocked_units {
            let unlocker = state.reverse.full_unlocker(target).unwrap();
            let source = snapshot.units.iter().find(|u| u.i == unlocker).unwrap();
            assert!(source.unlocked_units.contains(&target));
        }
        for &target in &unit.unlocked_rmeta_units {
            let unlocker = state.reverse.rmeta_unlocker(target).unwrap();
            let source = snapshot.units.iter().find(|u| u.i == unlocker).unwrap();
            assert!(source.unlocked_rmeta_units.contains(&target));
        }
    }
}

#[test]
fn raising_the_filter_only_ever_hides_units() {
    let snapshot = Snapshot::from_json(FIXTURE).unwrap();
    let mut previous = usize::MAX;
    for threshold in [0.0, 0.1, 2.0, 4.5, 30.0] {
        let count = visible_units(&snapshot.units, threshold).len();
        assert!(count <= previous);
        previous = count;
    }
}

#[test]
fn layout_follows_the_documented_scale_scenario() {
    let snapshot = Snapshot::from_json(FIXTURE).unwrap();
    let metrics = ChartMetrics::default();
    let layout = compute_layout(&snapshot, &view(8, 0.0), &metrics);

    // clamp(8 * 8 * 10, 200, 4096) = 640 px across 10 s.
    assert_eq!(layout.graph_width, 640.0);
    assert_eq!(layout.px_per_sec, 64.0);

    // The near-instant build script keeps a visible bar.
    let script = layout.unit(2).unwrap();
    assert_eq!(script.width, (64.0f32 * 0.05).max(1.0));

    // Explicit sections beat rmeta synthesis; frontend stays the base bar.
    let with_sections = layout.unit(1).unwrap();
    let names: Vec<_> = with_sections
        .sections
        .iter()
        .map(|section| section.name.name().into_owned())
        .collect();
    assert_eq!(names, vec!["codegen", "link"]);

    // Filtering the target out also drops it from the layout cache.
    let filtered = compute_layout(&snapshot, &view(8, 1.0), &metrics);
    assert!(filtered.unit(2).is_none());
    assert!(filtered.unit(0).is_some());
}
