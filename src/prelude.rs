// Preludes: re-export commonly used items for convenience
pub use crate::widgets;

pub use crate::snapshot::{ConcurrencyPoint, Snapshot, Unit};
pub use crate::themes::ChartMetrics;
pub use crate::view::{ReportState, ViewState};
pub use crate::widgets::{ConcurrencyGraph, PipelineGraph};
pub use crate::Report;
