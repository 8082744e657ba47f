// src/process/records.rs

use serde::{Deserialize, Serialize};

use crate::error::{Result, ScrapeError};

/// Number of cells read from every report row.
pub const FIELD_COUNT: usize = 6;

/// One report row, cells in source column order:
/// `[cohort_label, email, id, name, status, subjects_text]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawRecord {
    pub fields: [String; FIELD_COUNT],
}

impl RawRecord {
    pub fn cohort_label(&self) -> &str {
        &self.fields[0]
    }

    pub fn email(&self) -> &str {
        &self.fields[1]
    }

    pub fn id(&self) -> &str {
        &self.fields[2]
    }

    pub fn name(&self) -> &str {
        &self.fields[3]
    }

    pub fn status(&self) -> &str {
        &self.fields[4]
    }

    pub fn subjects(&self) -> &str {
        &self.fields[5]
    }
}

impl TryFrom<Vec<String>> for RawRecord {
    type Error = ScrapeError;

    /// Keeps the first six cells; anything shorter is rejected.
    fn try_from(mut cells: Vec<String>) -> Result<Self> {
        if cells.len() < FIELD_COUNT {
            return Err(ScrapeError::MalformedInput(format!(
                "expected {} cells, found {}",
                FIELD_COUNT,
                cells.len()
            )));
        }
        cells.truncate(FIELD_COUNT);
        let fields: [String; FIELD_COUNT] = cells
            .try_into()
            .map_err(|_| ScrapeError::MalformedInput("row width mismatch".to_string()))?;
        Ok(Self { fields })
    }
}

/// A retained record with the cohort label split into program and batch.
/// Identifying columns (email, id, name) are dropped here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizedRecord {
    pub program: String,
    pub batch: String,
    pub cohort: String,
    pub status: String,
    pub subjects: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CohortCount {
    pub cohort: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubjectCount {
    pub subject_code: String,
    pub studying: usize,
    pub majoring: usize,
    pub minoring: usize,
    pub concentrating: usize,
}

impl SubjectCount {
    pub fn zero(code: &str) -> Self {
        Self {
            subject_code: code.to_string(),
            studying: 0,
            majoring: 0,
            minoring: 0,
            concentrating: 0,
        }
    }
}

/// A cohort's slice of the whole, for composition charts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CohortShare {
    pub cohort: String,
    pub count: usize,
    /// 0..=100
    pub percent: f64,
}

/// Subject distribution for one two-digit cohort year.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CohortYearSubjects {
    pub year_suffix: String,
    pub cohort_size: usize,
    pub subjects: Vec<SubjectCount>,
}
