//! Build summary facts and the per-unit duration table.

use std::cmp::Ordering;

use eframe::egui::{Grid, RichText, Ui};

use crate::snapshot::{SectionName, Snapshot, Unit};

/// `"{:.1}s"`, with a minutes suffix once that stops being readable.
pub fn human_duration(seconds: f64) -> String {
    if seconds > 60.0 {
        format!(
            "{:.1}s ({}m {:.1}s)",
            seconds,
            seconds as u32 / 60,
            seconds % 60.0
        )
    } else {
        format!("{seconds:.1}s")
    }
}

/// All units, slowest first.
pub fn sorted_by_duration(units: &[Unit]) -> Vec<&Unit> {
    let mut sorted: Vec<&Unit> = units.iter().collect();
    sorted.sort_by(|a, b| {
        b.duration
            .partial_cmp(&a.duration)
            .unwrap_or(Ordering::Equal)
    });
    sorted
}

/// Section columns for the unit table, taken from the first unit that has
/// explicit sections. The "other" tail is skipped; it is usually a tiny
/// sliver of the total.
pub fn section_headers(units: &[Unit]) -> Vec<SectionName> {
    units
        .iter()
        .find_map(|unit| unit.sections.as_ref())
        .map(|sections| {
            sections
                .iter()
                .filter(|(name, _)| !matches!(name, SectionName::Other))
                .map(|(name, _)| name.clone())
                .collect()
        })
        .unwrap_or_default()
}

/// Small grid of build facts; absent metadata rows are simply not shown.
pub fn summary(ui: &mut Ui, snapshot: &Snapshot) {
    let meta = snapshot.meta.clone().unwrap_or_default();

    Grid::new("build_summary").num_columns(2).show(ui, |ui| {
        let mut row = |ui: &mut Ui, label: &str, value: String| {
            ui.label(RichText::new(label).strong());
            ui.label(value);
            ui.end_row();
        };

        if let Some(profile) = &meta.profile {
            row(ui, "Profile:", profile.clone());
        }
        let total_units = match (meta.total_fresh, meta.total_dirty) {
            (Some(fresh), Some(dirty)) => {
                row(ui, "Fresh units:", fresh.to_string());
                row(ui, "Dirty units:", dirty.to_string());
                (fresh + dirty) as usize
            }
            _ => snapshot.units.len(),
        };
        row(ui, "Total units:", total_units.to_string());

        let mut concurrency = snapshot.max_concurrency().to_string();
        if let Some(jobs) = meta.jobs {
            let ncpu = meta
                .num_cpus
                .map(|n| n.to_string())
                .unwrap_or_else(|| "n/a".into());
            concurrency = format!("{concurrency} (jobs={jobs} ncpu={ncpu})");
        }
        row(ui, "Max concurrency:", concurrency);

        if let Some(start) = &meta.start_str {
            row(ui, "Build start:", start.clone());
        }
        row(ui, "Total time:", human_duration(snapshot.duration));
        if let Some(toolchain) = &meta.toolchain {
            row(ui, "Toolchain:", toolchain.clone());
        }
        if let Some(host) = &meta.host {
            row(ui, "Host:", host.clone());
        }
    });
}

/// Table of all units, slowest first, with one column per known section.
pub fn unit_table(ui: &mut Ui, snapshot: &Snapshot) {
    let units = sorted_by_duration(&snapshot.units);
    let headers = section_headers(&snapshot.units);

    Grid::new("unit_table").striped(true).show(ui, |ui| {
        ui.label("");
        ui.label(RichText::new("Unit").strong());
        ui.label(RichText::new("Total").strong());
        for header in &headers {
            ui.label(RichText::new(header.capitalized_name()).strong());
        }
        ui.label(RichText::new("Features").strong());
        ui.end_row();

        for (rank, unit) in units.iter().enumerate() {
            ui.label(format!("{}.", rank + 1));
            ui.label(format!(
                "{} v{}{}",
                unit.name, unit.version, unit.target
            ));
            ui.label(format!("{:.1}s", unit.duration));
            for header in &headers {
                let cell = unit
                    .sections
                    .as_ref()
                    .and_then(|sections| sections.iter().find(|(name, _)| name == header))
                    .map(|(_, span)| {
                        let duration = span.duration();
                        if unit.duration > 0.0 {
                            format!("{duration:.1}s ({:.0}%)", duration / unit.duration * 100.0)
                        } else {
                            format!("{duration:.1}s")
                        }
                    })
                    .unwrap_or_default();
                ui.label(cell);
            }
            ui.label(unit.features.join(", "));
            ui.end_row();
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snapshot::SectionSpan;

    fn unit(i: u64, duration: f64) -> Unit {
        Unit {
            i,
            name: format!("unit{i}"),
            version: "1.0.0".into(),
            mode: "todo".into(),
            target: String::new(),
            features: Vec::new(),
            start: 0.0,
            duration,
            rmeta_time: None,
            unlocked_units: Vec::new(),
            unlocked_rmeta_units: Vec::new(),
            sections: None,
        }
    }

    #[test]
    fn durations_format_readably() {
        assert_eq!(human_duration(45.04), "45.0s");
        assert_eq!(human_duration(61.5), "61.5s (1m 1.5s)");
    }

    #[test]
    fn table_rows_come_out_slowest_first() {
        let units = vec![unit(0, 1.0), unit(1, 9.0), unit(2, 4.0)];
        let sorted = sorted_by_duration(&units);
        let ids: Vec<_> = sorted.iter().map(|u| u.i).collect();
        assert_eq!(ids, vec![1, 2, 0]);
    }

    #[test]
    fn headers_skip_the_other_tail() {
        let mut detailed = unit(0, 10.0);
        detailed.sections = Some(vec![
            (
                SectionName::Frontend,
                SectionSpan {
                    start: 0.0,
                    end: 6.0,
                },
            ),
            (
                SectionName::Codegen,
                SectionSpan {
                    start: 6.0,
                    end: 9.5,
                },
            ),
            (
                SectionName::Other,
                SectionSpan {
                    start: 9.5,
                    end: 10.0,
                },
            ),
        ]);
        let units = vec![unit(1, 1.0), detailed];

        let headers = section_headers(&units);
        assert_eq!(headers, vec![SectionName::Frontend, SectionName::Codegen]);
    }

    #[test]
    fn no_sections_means_no_extra_columns() {
        assert!(section_headers(&[unit(0, 1.0)]).is_empty());
    }
}
