//! The immutable timing snapshot consumed by the viewer.
//!
//! A snapshot is produced once by the build instrumentation and loaded here
//! from JSON. Nothing in this module measures anything; beyond shape checks
//! done by serde the data is taken as given.

use std::borrow::Cow;
use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::Path;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::graph::ReverseDeps;

/// Stable identifier of a unit within one snapshot.
pub type UnitId = u64;

/// Name of an individual compilation section.
#[derive(Clone, Debug, Hash, Eq, PartialEq)]
pub enum SectionName {
    Frontend,
    Codegen,
    Named(String),
    Other,
}

impl SectionName {
    /// Lower case name.
    pub fn name(&self) -> Cow<'static, str> {
        match self {
            SectionName::Frontend => "frontend".into(),
            SectionName::Codegen => "codegen".into(),
            SectionName::Named(n) => n.to_lowercase().into(),
            SectionName::Other => "other".into(),
        }
    }

    /// Name with the first letter upper-cased, for table headers and legends.
    pub fn capitalized_name(&self) -> String {
        let name = self.name();
        let mut chars = name.chars();
        match chars.next() {
            Some(first) => format!("{}{}", first.to_uppercase(), chars.as_str()),
            None => String::new(),
        }
    }
}

impl Serialize for SectionName {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.name().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for SectionName {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        Ok(match name.as_str() {
            "frontend" => SectionName::Frontend,
            "codegen" => SectionName::Codegen,
            "other" => SectionName::Other,
            _ => SectionName::Named(name),
        })
    }
}

/// One named sub-interval of a unit's build, relative to the unit's start.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SectionSpan {
    pub start: f64,
    pub end: f64,
}

impl SectionSpan {
    pub fn duration(&self) -> f64 {
        (self.end - self.start).max(0.0)
    }
}

/// One compiled build target.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Unit {
    pub i: UnitId,
    pub name: String,
    pub version: String,
    /// `"run-custom-build"` marks a build-script run; anything else is a
    /// regular compile.
    pub mode: String,
    /// Short suffix describing the target kind, e.g. ` (test)`. Empty for
    /// plain library builds.
    #[serde(default)]
    pub target: String,
    #[serde(default)]
    pub features: Vec<String>,
    /// Offset in seconds from the start of the report.
    pub start: f64,
    /// Total seconds this unit took.
    pub duration: f64,
    /// Seconds from `start` until this unit's metadata was ready, if known.
    #[serde(default)]
    pub rmeta_time: Option<f64>,
    /// Units whose full build this unit's completion unlocked.
    #[serde(default)]
    pub unlocked_units: Vec<UnitId>,
    /// Units unlocked as soon as this unit's metadata was ready.
    #[serde(default)]
    pub unlocked_rmeta_units: Vec<UnitId>,
    /// Explicit section timings, sorted and non-overlapping within
    /// `[0, duration]`. Absent when the instrumentation only knew totals.
    #[serde(default)]
    pub sections: Option<Vec<(SectionName, SectionSpan)>>,
}

impl Unit {
    pub fn is_custom_build(&self) -> bool {
        self.mode == "run-custom-build"
    }

    /// The sections to draw for this unit.
    ///
    /// Explicit sections win. Without them, a known `rmeta_time` stands in
    /// for the frontend/codegen boundary and yields a single synthetic
    /// codegen section; without either there is nothing to subdivide.
    pub fn effective_sections(&self) -> Option<Cow<'_, [(SectionName, SectionSpan)]>> {
        if let Some(sections) = &self.sections {
            return Some(Cow::Borrowed(sections.as_slice()));
        }
        let rmeta = self.rmeta_time?;
        Some(Cow::Owned(vec![(
            SectionName::Codegen,
            SectionSpan {
                start: rmeta,
                end: self.duration,
            },
        )]))
    }

    /// Start offset of this unit's codegen section, if it has one.
    pub fn codegen_start(&self) -> Option<f64> {
        self.effective_sections()?
            .iter()
            .find(|(name, _)| *name == SectionName::Codegen)
            .map(|(_, span)| span.start)
    }

    /// Seconds from `start` until dependents waiting on metadata could go.
    fn metadata_ready(&self) -> Option<f64> {
        self.rmeta_time.or_else(|| {
            self.sections.as_deref().and_then(|sections| {
                sections
                    .iter()
                    .find(|(name, _)| *name == SectionName::Frontend)
                    .map(|(_, span)| span.end)
            })
        })
    }

    /// Display label: name plus target suffix, with the version spliced in
    /// when the caller knows the name alone is ambiguous.
    pub fn label(&self, include_version: bool) -> String {
        if include_version {
            format!("{} (v{}){}", self.name, self.version, self.target)
        } else {
            format!("{}{}", self.name, self.target)
        }
    }
}

/// Counts of what the scheduler was doing at one instant.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ConcurrencyPoint {
    /// Offset in seconds from the start of the report.
    pub t: f64,
    /// Units currently running.
    pub active: usize,
    /// Units ready to run, waiting for a slot.
    pub waiting: usize,
    /// Units still blocked on dependencies.
    pub inactive: usize,
}

/// Build facts shown in the summary panel. Everything is optional; absent
/// fields are simply not shown.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct SnapshotMeta {
    #[serde(default)]
    pub start_str: Option<String>,
    #[serde(default)]
    pub profile: Option<String>,
    #[serde(default)]
    pub total_fresh: Option<u32>,
    #[serde(default)]
    pub total_dirty: Option<u32>,
    #[serde(default)]
    pub jobs: Option<u32>,
    #[serde(default)]
    pub num_cpus: Option<u64>,
    #[serde(default)]
    pub toolchain: Option<String>,
    #[serde(default)]
    pub host: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    #[error("failed to read snapshot file")]
    Io(#[from] std::io::Error),
    #[error("malformed snapshot")]
    Json(#[from] serde_json::Error),
}

/// One build's complete timing report.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Snapshot {
    /// Total seconds spanned by the report.
    pub duration: f64,
    pub units: Vec<Unit>,
    #[serde(default)]
    pub concurrency: Vec<ConcurrencyPoint>,
    #[serde(default)]
    pub cpu_usage: Vec<(f64, f64)>,
    #[serde(default)]
    pub meta: Option<SnapshotMeta>,
}

impl Snapshot {
    pub fn load(path: &Path) -> Result<Self, SnapshotError> {
        Self::from_json(&fs::read_to_string(path)?)
    }

    pub fn from_json(json: &str) -> Result<Self, SnapshotError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Highest number of simultaneously running units observed.
    pub fn max_concurrency(&self) -> usize {
        self.concurrency.iter().map(|c| c.active).max().unwrap_or(0)
    }
}

/// Event ordering for [`derive_concurrency`]: a unit becomes ready before it
/// starts, and anything ending at an instant is processed last.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd)]
enum State {
    Ready,
    Start,
    End,
}

/// Reconstruct concurrency samples from unit timings alone.
///
/// Used when the snapshot carries no sampled concurrency data. A unit
/// becomes ready when its unlocker finished (for metadata unlocks, when the
/// unlocker's metadata was ready), capped at the unit's own start since
/// rounded inputs can put the two out of order.
pub fn derive_concurrency(units: &[Unit], reverse: &ReverseDeps) -> Vec<ConcurrencyPoint> {
    if units.is_empty() {
        return Vec::new();
    }

    let by_id: HashMap<UnitId, &Unit> = units.iter().map(|u| (u.i, u)).collect();

    let ready_time = |unit: &Unit| -> Option<f64> {
        if let Some(dep) = reverse.rmeta_unlocker(unit.i).and_then(|id| by_id.get(&id)) {
            let ready = dep.metadata_ready().unwrap_or(dep.duration);
            return Some(dep.start + ready);
        }
        let dep = by_id.get(&reverse.full_unlocker(unit.i)?)?;
        Some(dep.start + dep.duration)
    };

    let mut events: Vec<(f64, State, UnitId)> = units
        .iter()
        .flat_map(|unit| {
            let ready = ready_time(unit).unwrap_or(unit.start).min(unit.start);
            [
                (ready, State::Ready, unit.i),
                (unit.start, State::Start, unit.i),
                (unit.start + unit.duration, State::End, unit.i),
            ]
        })
        .collect();
    events.sort_by(|a, b| {
        a.0.total_cmp(&b.0)
            .then_with(|| a.1.cmp(&b.1))
            .then_with(|| a.2.cmp(&b.2))
    });

    let mut out: Vec<ConcurrencyPoint> = Vec::new();
    let mut inactive: HashSet<UnitId> = units.iter().map(|u| u.i).collect();
    let mut waiting: HashSet<UnitId> = HashSet::new();
    let mut active: HashSet<UnitId> = HashSet::new();

    for (t, state, id) in events {
        inactive.remove(&id);
        waiting.remove(&id);
        active.remove(&id);
        match state {
            State::Ready => {
                waiting.insert(id);
            }
            State::Start => {
                active.insert(id);
            }
            State::End => {}
        }

        let record = ConcurrencyPoint {
            t,
            active: active.len(),
            waiting: waiting.len(),
            inactive: inactive.len(),
        };
        match out.last_mut() {
            // Several events at one instant would draw as a vertical smear;
            // keep only the final state for that timestamp.
            Some(last) if last.t == t => *last = record,
            _ => out.push(record),
        }
    }

    out
}
