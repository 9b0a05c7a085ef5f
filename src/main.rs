use std::path::Path;

use anyhow::Context as _;
use log::{info, LevelFilter};
use simple_logger::SimpleLogger;

use ganttry::{Report, Snapshot};

fn main() -> anyhow::Result<()> {
    SimpleLogger::new()
        .with_level(LevelFilter::Info)
        .env()
        .init()?;

    let path = std::env::args()
        .nth(1)
        .context("usage: ganttry <snapshot.json>")?;
    let snapshot = Snapshot::load(Path::new(&path))
        .with_context(|| format!("failed to load timing snapshot from {path}"))?;
    info!(
        "loaded {} units spanning {:.1}s",
        snapshot.units.len(),
        snapshot.duration
    );

    Report::new(snapshot)
        .run(&format!("Build Timings: {path}"))
        .map_err(|err| anyhow::anyhow!("viewer exited with an error: {err}"))
}
