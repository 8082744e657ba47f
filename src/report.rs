// src/report.rs

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::{
    fmt::Write as _,
    fs::{self, File},
    io::{BufWriter, Write},
    path::{Path, PathBuf},
};
use tracing::info;

use crate::config::Config;
use crate::error::Result;
use crate::process::aggregate::{
    cohort_counts, composition, filter_by_enrollment_window, filter_by_status, graduating_years,
    sort_by_graduating_year, sort_by_size, subjects_by_cohort_year, SubjectCatalog,
};
use crate::process::records::{
    CohortCount, CohortShare, CohortYearSubjects, NormalizedRecord, SubjectCount,
};
use crate::process::Dataset;

pub const REPORT_FILE: &str = "report.json";
pub const RECORDS_FILE: &str = "records.json";

/// The count tables behind the enrollment charts.
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub generated_at: DateTime<Utc>,
    pub source: String,
    pub extracted: usize,
    pub retained: usize,
    /// Records matching the status marker (or all, when statuses are not filtered).
    pub current: usize,
    pub graduating_years: Vec<String>,
    pub cohorts_by_year: Vec<CohortCount>,
    pub composition: Vec<CohortShare>,
    pub current_cohorts_by_year: Vec<CohortCount>,
    pub current_composition: Vec<CohortShare>,
    /// Over the enrollment window of current records.
    pub subjects: Vec<SubjectCount>,
    /// Per UG cohort year, also over current records.
    pub subjects_by_cohort_year: Vec<CohortYearSubjects>,
}

impl Report {
    /// Fails with `UnknownSubjectCode` when `subjects.requested` names a code outside
    /// the catalog.
    pub fn build(
        dataset: &Dataset,
        cfg: &Config,
        source: &str,
        all_statuses: bool,
    ) -> Result<Self> {
        let records = &dataset.records;
        let current = if all_statuses {
            records.clone()
        } else {
            filter_by_status(records, &cfg.window.status_marker)
        };

        let window = filter_by_enrollment_window(
            &current,
            &cfg.window.program_prefix,
            &cfg.window.year_suffixes,
        );
        let catalog = SubjectCatalog::new(cfg.subjects.codes.clone());
        let requested = if cfg.subjects.requested.is_empty() {
            catalog.codes()
        } else {
            &cfg.subjects.requested[..]
        };
        let subjects = catalog.counts(&window, requested)?;

        Ok(Self {
            generated_at: Utc::now(),
            source: source.to_string(),
            extracted: dataset.extracted,
            retained: records.len(),
            current: current.len(),
            graduating_years: graduating_years(records).into_iter().collect(),
            cohorts_by_year: by_year(records),
            composition: composition(&by_size(records)),
            current_cohorts_by_year: by_year(&current),
            current_composition: composition(&by_size(&current)),
            subjects,
            subjects_by_cohort_year: subjects_by_cohort_year(
                &current,
                &cfg.window.program_prefix,
                cfg.window.first_year..=cfg.window.last_year,
                requested,
            ),
        })
    }

    /// Plain-text overview for the terminal.
    pub fn summary(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(
            out,
            "{} rows extracted, {} retained, {} current ({})",
            self.extracted, self.retained, self.current, self.source
        );
        let _ = writeln!(out, "\ncohort sizes by graduating year:");
        for c in &self.cohorts_by_year {
            let _ = writeln!(out, "  {:<24} {:>6}", c.cohort, c.count);
        }
        let _ = writeln!(out, "\nsubjects (current window):");
        let _ = writeln!(
            out,
            "  {:<8} {:>9} {:>9} {:>9} {:>13}",
            "code", "studying", "majoring", "minoring", "concentrating"
        );
        for s in &self.subjects {
            let _ = writeln!(
                out,
                "  {:<8} {:>9} {:>9} {:>9} {:>13}",
                s.subject_code, s.studying, s.majoring, s.minoring, s.concentrating
            );
        }
        out
    }
}

fn by_size(records: &[NormalizedRecord]) -> Vec<CohortCount> {
    let mut counts = cohort_counts(records);
    sort_by_size(&mut counts);
    counts
}

fn by_year(records: &[NormalizedRecord]) -> Vec<CohortCount> {
    let mut counts = by_size(records);
    sort_by_graduating_year(&mut counts);
    counts
}

/// Write `report.json` and `records.json` into `dir`.
pub fn write_report(
    dir: &Path,
    report: &Report,
    records: &[NormalizedRecord],
) -> Result<(PathBuf, PathBuf)> {
    fs::create_dir_all(dir)?;
    let report_path = dir.join(REPORT_FILE);
    let records_path = dir.join(RECORDS_FILE);
    write_json(&report_path, report)?;
    write_json(&records_path, &records)?;
    info!(
        report = %report_path.display(),
        records = %records_path.display(),
        "report written"
    );
    Ok((report_path, records_path))
}

fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(&mut writer, value)?;
    writer.flush()?;
    Ok(())
}
