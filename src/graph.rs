//! Reverse-dependency index over the snapshot's unlock edges.

use std::collections::HashMap;

use crate::snapshot::{Unit, UnitId};

/// Inversion of the forward "this unit unlocks these units" edges.
///
/// Built once per snapshot; duration filtering changes what is drawn, never
/// the graph, so this is never rebuilt.
#[derive(Clone, Debug, Default)]
pub struct ReverseDeps {
    by_full: HashMap<UnitId, UnitId>,
    by_rmeta: HashMap<UnitId, UnitId>,
}

impl ReverseDeps {
    /// Single pass over all units, `O(units + edges)`.
    ///
    /// A well-formed graph unlocks each target at most once per edge kind.
    /// When that does not hold, the collision is logged and the last writer
    /// wins; a viewer should still draw a malformed report.
    pub fn build(units: &[Unit]) -> Self {
        let mut index = Self::default();
        for unit in units {
            for &target in &unit.unlocked_units {
                if let Some(previous) = index.by_full.insert(target, unit.i) {
                    log::warn!(
                        "unit {target} unlocked by both {previous} and {}; keeping {}",
                        unit.i,
                        unit.i
                    );
                }
            }
            for &target in &unit.unlocked_rmeta_units {
                if let Some(previous) = index.by_rmeta.insert(target, unit.i) {
                    log::warn!(
                        "unit {target} rmeta-unlocked by both {previous} and {}; keeping {}",
                        unit.i,
                        unit.i
                    );
                }
            }
        }
        index
    }

    /// The unit whose completion unlocked `target`'s full build.
    pub fn full_unlocker(&self, target: UnitId) -> Option<UnitId> {
        self.by_full.get(&target).copied()
    }

    /// The unit whose metadata unlocked `target`.
    pub fn rmeta_unlocker(&self, target: UnitId) -> Option<UnitId> {
        self.by_rmeta.get(&target).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit(i: UnitId, unlocked: &[UnitId], unlocked_rmeta: &[UnitId]) -> Unit {
        Unit {
            i,
            name: format!("unit{i}"),
            version: "1.0.0".into(),
            mode: "todo".into(),
            target: String::new(),
            features: Vec::new(),
            start: 0.0,
            duration: 1.0,
            rmeta_time: None,
            unlocked_units: unlocked.to_vec(),
            unlocked_rmeta_units: unlocked_rmeta.to_vec(),
            sections: None,
        }
    }

    #[test]
    fn inverts_both_edge_kinds() {
        let units = vec![unit(0, &[2], &[1]), unit(1, &[2], &[]), unit(2, &[], &[])];
        let index = ReverseDeps::build(&units);

        assert_eq!(index.rmeta_unlocker(1), Some(0));
        assert_eq!(index.full_unlocker(2), Some(1));
        assert_eq!(index.full_unlocker(0), None);
        assert_eq!(index.rmeta_unlocker(2), None);
    }

    #[test]
    fn every_reverse_entry_has_a_matching_forward_edge() {
        let units = vec![
            unit(0, &[1, 2], &[3]),
            unit(1, &[3], &[]),
            unit(2, &[], &[]),
            unit(3, &[], &[]),
        ];
        let index = ReverseDeps::build(&units);

        for u in &units {
            for &target in &u.unlocked_units {
                let unlocker = index.full_unlocker(target).unwrap();
                let source = units.iter().find(|s| s.i == unlocker).unwrap();
                assert!(source.unlocked_units.contains(&target));
            }
            for &target in &u.unlocked_rmeta_units {
                let unlocker = index.rmeta_unlocker(target).unwrap();
                let source = units.iter().find(|s| s.i == unlocker).unwrap();
                assert!(source.unlocked_rmeta_units.contains(&target));
            }
        }
    }

    #[test]
    fn duplicate_unlockers_resolve_to_the_last_writer() {
        let units = vec![unit(0, &[5], &[]), unit(1, &[5], &[])];
        let index = ReverseDeps::build(&units);
        assert_eq!(index.full_unlocker(5), Some(1));
    }
}
