// src/process/clean.rs

use tracing::debug;

use crate::config::CleaningConfig;
use crate::process::records::{NormalizedRecord, RawRecord};
use crate::process::utils::tail_start;

/// Width of the batch suffix on a regular cohort label, e.g. `"2019-22"`.
pub const BATCH_WIDTH: usize = 7;

/// Drops excluded cohorts and splits cohort labels into program and batch.
#[derive(Debug, Clone)]
pub struct Cleaner {
    excluded_markers: Vec<String>,
    doctoral_marker: String,
}

impl Default for Cleaner {
    fn default() -> Self {
        Self::from_config(&CleaningConfig::default())
    }
}

impl Cleaner {
    pub fn new(excluded_markers: Vec<String>, doctoral_marker: impl Into<String>) -> Self {
        Self {
            excluded_markers,
            doctoral_marker: doctoral_marker.into(),
        }
    }

    pub fn from_config(cfg: &CleaningConfig) -> Self {
        Self::new(cfg.excluded_markers.clone(), cfg.doctoral_marker.clone())
    }

    pub fn is_excluded(&self, cohort_label: &str) -> bool {
        self.excluded_markers
            .iter()
            .any(|m| cohort_label.contains(m.as_str()))
    }

    pub fn clean(&self, records: &[RawRecord]) -> Vec<NormalizedRecord> {
        let out: Vec<NormalizedRecord> = records
            .iter()
            .filter(|r| !self.is_excluded(r.cohort_label()))
            .map(|r| self.normalize(r))
            .collect();
        debug!(
            input = records.len(),
            retained = out.len(),
            "cleaned report rows"
        );
        out
    }

    /// Re-apply the exclusion filter to already normalized records.
    pub fn reclean(&self, records: &[NormalizedRecord]) -> Vec<NormalizedRecord> {
        records
            .iter()
            .filter(|r| !self.is_excluded(&r.cohort))
            .cloned()
            .collect()
    }

    pub fn normalize(&self, record: &RawRecord) -> NormalizedRecord {
        let label = record.cohort_label();
        let (program, batch) = self.split_cohort_label(label);
        NormalizedRecord {
            program,
            batch,
            cohort: label.to_string(),
            status: record.status().to_string(),
            subjects: record.subjects().to_string(),
        }
    }

    /// `(program, batch)` for a cohort label.
    pub fn split_cohort_label(&self, label: &str) -> (String, String) {
        if label.contains(self.doctoral_marker.as_str()) {
            return (label.trim().to_string(), String::new());
        }
        if let Some(idx) = tail_start(label, BATCH_WIDTH) {
            return (
                label[..idx].trim().to_string(),
                label[idx..].trim().to_string(),
            );
        }
        // Short labels such as "UG-21" split on their last separator.
        let trimmed = label.trim();
        match trimmed.rfind(|c: char| c == '-' || c.is_whitespace()) {
            Some(idx) => {
                let sep_len = trimmed[idx..].chars().next().map_or(1, char::len_utf8);
                (
                    trimmed[..idx].trim().to_string(),
                    trimmed[idx + sep_len..].trim().to_string(),
                )
            }
            None => (trimmed.to_string(), String::new()),
        }
    }
}
