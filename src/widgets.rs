//! The chart widgets.
//!
//! Both charts are plain [`egui::Widget`]s over borrowed snapshot data:
//! they recompute their layout every render, draw through the `Ui` painter,
//! and keep no state of their own (the pipeline chart writes its layout and
//! hit boxes into the [`ReportState`](crate::view::ReportState) it is
//! handed).

pub mod concurrency;
pub mod legend;
pub mod pipeline;
pub mod summary;

pub use concurrency::ConcurrencyGraph;
pub use legend::{LegendEntry, LegendMark};
pub use pipeline::PipelineGraph;
