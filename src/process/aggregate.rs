// src/process/aggregate.rs

use std::collections::{BTreeSet, HashMap};
use std::ops::RangeInclusive;

use crate::error::{Result, ScrapeError};
use crate::process::records::{
    CohortCount, CohortShare, CohortYearSubjects, NormalizedRecord, SubjectCount,
};
use crate::process::utils::year_suffix;

pub const MAJOR_PREFIX: &str = "Major - ";
pub const MINOR_PREFIX: &str = "Minor - ";
pub const CONCENTRATION_PREFIX: &str = "Concentration - ";

/// Subject codes offered in the Major/Minor report.
pub const DEFAULT_SUBJECT_CODES: &[&str] = &[
    "ENG", "CS", "MAT", "PSY", "POL", "BIO", "PHY", "SOC", "HIS", "IR", "VA", "ECO", "CW", "PHI",
    "MS", "PPE", "SOA", "ENT", "ES", "CHM", "SAN", "FIN",
];

/// One entry per distinct cohort, in order of first appearance.
pub fn cohort_counts(records: &[NormalizedRecord]) -> Vec<CohortCount> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut out: Vec<CohortCount> = Vec::new();
    for rec in records {
        match index.get(rec.cohort.as_str()) {
            Some(&i) => out[i].count += 1,
            None => {
                index.insert(rec.cohort.as_str(), out.len());
                out.push(CohortCount {
                    cohort: rec.cohort.clone(),
                    count: 1,
                });
            }
        }
    }
    out
}

/// Largest cohort first; ties by cohort name.
pub fn sort_by_size(counts: &mut [CohortCount]) {
    counts.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.cohort.cmp(&b.cohort)));
}

/// Ascending by the last two characters of the cohort label (the graduating
/// year for regular labels). Stable, so a prior `sort_by_size` order survives
/// within a year.
pub fn sort_by_graduating_year(counts: &mut [CohortCount]) {
    counts.sort_by(|a, b| last_two(&a.cohort).cmp(last_two(&b.cohort)));
}

fn last_two(s: &str) -> &str {
    let start = s
        .char_indices()
        .rev()
        .nth(1)
        .map_or(0, |(idx, _)| idx);
    &s[start..]
}

pub fn subject_counts<S: AsRef<str>>(
    records: &[NormalizedRecord],
    codes: &[S],
) -> Vec<SubjectCount> {
    codes
        .iter()
        .map(|code| count_subject(records, code.as_ref()))
        .collect()
}

fn count_subject(records: &[NormalizedRecord], code: &str) -> SubjectCount {
    let major = format!("{}{}", MAJOR_PREFIX, code);
    let minor = format!("{}{}", MINOR_PREFIX, code);
    let concentration = format!("{}{}", CONCENTRATION_PREFIX, code);

    let mut counts = SubjectCount::zero(code);
    for rec in records {
        let text = rec.subjects.as_str();
        if text.contains(code) {
            counts.studying += 1;
        }
        if text.contains(&major) {
            counts.majoring += 1;
        }
        if text.contains(&minor) {
            counts.minoring += 1;
        }
        if text.contains(&concentration) {
            counts.concentrating += 1;
        }
    }
    counts
}

/// Records of `program_prefix` whose cohort carries one of `year_suffixes`.
pub fn filter_by_enrollment_window<S: AsRef<str>>(
    records: &[NormalizedRecord],
    program_prefix: &str,
    year_suffixes: &[S],
) -> Vec<NormalizedRecord> {
    records
        .iter()
        .filter(|r| r.program.contains(program_prefix))
        .filter(|r| {
            year_suffixes
                .iter()
                .any(|s| r.cohort.contains(s.as_ref()))
        })
        .cloned()
        .collect()
}

pub fn filter_by_status(records: &[NormalizedRecord], marker: &str) -> Vec<NormalizedRecord> {
    records
        .iter()
        .filter(|r| r.status.contains(marker))
        .cloned()
        .collect()
}

/// Subject distribution per two-digit cohort year, e.g. `17..=23`.
pub fn subjects_by_cohort_year<S: AsRef<str>>(
    records: &[NormalizedRecord],
    program_prefix: &str,
    years: RangeInclusive<u32>,
    codes: &[S],
) -> Vec<CohortYearSubjects> {
    years
        .map(|year| {
            let suffix = format!("{:02}", year % 100);
            let marker = format!("-{}", suffix);
            let cohort = filter_by_enrollment_window(records, program_prefix, &[marker]);
            CohortYearSubjects {
                cohort_size: cohort.len(),
                subjects: subject_counts(&cohort, codes),
                year_suffix: suffix,
            }
        })
        .collect()
}

/// Each cohort's percentage of the total, in input order.
pub fn composition(counts: &[CohortCount]) -> Vec<CohortShare> {
    let total: usize = counts.iter().map(|c| c.count).sum();
    counts
        .iter()
        .map(|c| CohortShare {
            cohort: c.cohort.clone(),
            count: c.count,
            percent: if total == 0 {
                0.0
            } else {
                c.count as f64 * 100.0 / total as f64
            },
        })
        .collect()
}

/// The distinct graduating years present, ascending.
pub fn graduating_years(records: &[NormalizedRecord]) -> BTreeSet<String> {
    records
        .iter()
        .filter_map(|r| year_suffix(&r.cohort))
        .map(str::to_string)
        .collect()
}

/// The set of subject codes the report knows about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubjectCatalog {
    codes: Vec<String>,
}

impl Default for SubjectCatalog {
    fn default() -> Self {
        Self::new(DEFAULT_SUBJECT_CODES.iter().map(|c| c.to_string()).collect())
    }
}

impl SubjectCatalog {
    pub fn new(codes: Vec<String>) -> Self {
        Self { codes }
    }

    pub fn codes(&self) -> &[String] {
        &self.codes
    }

    pub fn contains(&self, code: &str) -> bool {
        self.codes.iter().any(|c| c == code)
    }

    /// Counts for every catalog code.
    pub fn all_counts(&self, records: &[NormalizedRecord]) -> Vec<SubjectCount> {
        subject_counts(records, &self.codes)
    }

    /// Counts for `requested`, which must all be catalog codes.
    pub fn counts<S: AsRef<str>>(
        &self,
        records: &[NormalizedRecord],
        requested: &[S],
    ) -> Result<Vec<SubjectCount>> {
        if let Some(unknown) = requested.iter().find(|c| !self.contains(c.as_ref())) {
            return Err(ScrapeError::UnknownSubjectCode(unknown.as_ref().to_string()));
        }
        Ok(subject_counts(records, requested))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rec(cohort: &str, program: &str, status: &str, subjects: &str) -> NormalizedRecord {
        NormalizedRecord {
            program: program.to_string(),
            batch: String::new(),
            cohort: cohort.to_string(),
            status: status.to_string(),
            subjects: subjects.to_string(),
        }
    }

    #[test]
    fn test_cohort_counts_sum_to_len() {
        let records = vec![
            rec("UG 2019-22", "UG", "Enrolled", ""),
            rec("UG 2020-23", "UG", "Enrolled", ""),
            rec("UG 2019-22", "UG", "Graduated", ""),
            rec("PHD Biology", "PHD Biology", "Enrolled", ""),
            rec("UG 2019-22", "UG", "Enrolled", ""),
        ];
        let counts = cohort_counts(&records);
        assert_eq!(counts.len(), 3);
        assert_eq!(counts.iter().map(|c| c.count).sum::<usize>(), records.len());
        assert_eq!(counts[0], CohortCount { cohort: "UG 2019-22".to_string(), count: 3 });
        assert!(cohort_counts(&[]).is_empty());
    }

    #[test]
    fn test_sort_orders() {
        let mut counts = vec![
            CohortCount { cohort: "UG 2020-23".to_string(), count: 2 },
            CohortCount { cohort: "MA 2021-23".to_string(), count: 5 },
            CohortCount { cohort: "UG 2018-21".to_string(), count: 9 },
        ];
        sort_by_size(&mut counts);
        let names: Vec<_> = counts.iter().map(|c| c.cohort.as_str()).collect();
        assert_eq!(names, ["UG 2018-21", "MA 2021-23", "UG 2020-23"]);

        sort_by_graduating_year(&mut counts);
        let names: Vec<_> = counts.iter().map(|c| c.cohort.as_str()).collect();
        assert_eq!(names, ["UG 2018-21", "MA 2021-23", "UG 2020-23"]);
    }

    #[test]
    fn test_subject_counts_scenario() {
        let records = vec![
            rec("UG-21", "UG", "Enrolled", "Major - CS"),
            rec("UG-21", "UG", "Enrolled", "Major - CS, Minor - ECO"),
        ];
        let counts = subject_counts(&records, &["CS", "ECO"]);
        assert_eq!(
            counts,
            vec![
                SubjectCount {
                    subject_code: "CS".to_string(),
                    studying: 2,
                    majoring: 2,
                    minoring: 0,
                    concentrating: 0,
                },
                SubjectCount {
                    subject_code: "ECO".to_string(),
                    studying: 1,
                    majoring: 0,
                    minoring: 1,
                    concentrating: 0,
                },
            ]
        );
    }

    #[test]
    fn test_one_record_many_roles() {
        let records = vec![rec(
            "UG 2020-23",
            "UG",
            "Enrolled",
            "Major - CS, Major - MAT, Concentration - PHI",
        )];
        let counts = subject_counts(&records, &["CS", "MAT", "PHI", "BIO"]);
        assert_eq!(counts[0].majoring, 1);
        assert_eq!(counts[1].majoring, 1);
        assert_eq!(counts[2].concentrating, 1);
        assert_eq!(counts[2].studying, 1);
        assert_eq!(counts[3], SubjectCount::zero("BIO"));
    }

    #[test]
    fn test_enrollment_window() {
        let records = vec![
            rec("UG 2018-21", "UG", "Enrolled", ""),
            rec("UG 2020-23", "UG", "Enrolled", ""),
            rec("UG 2016-19", "UG", "Graduated", ""),
            rec("MA 2021-23", "MA", "Enrolled", ""),
        ];
        let window = filter_by_enrollment_window(&records, "UG", &["-21", "-22", "-23"]);
        let cohorts: Vec<_> = window.iter().map(|r| r.cohort.as_str()).collect();
        assert_eq!(cohorts, ["UG 2018-21", "UG 2020-23"]);
    }

    #[test]
    fn test_filter_by_status() {
        let records = vec![
            rec("UG 2018-21", "UG", "Enrolled", ""),
            rec("UG 2016-19", "UG", "Graduated", ""),
        ];
        assert_eq!(filter_by_status(&records, "Enrolled").len(), 1);
    }

    #[test]
    fn test_subjects_by_cohort_year() {
        let records = vec![
            rec("UG 2017-20", "UG", "Enrolled", "Major - CS"),
            rec("UG 2018-21", "UG", "Enrolled", "Major - ECO"),
            rec("UG 2018-21", "UG", "Enrolled", "Minor - CS"),
        ];
        let by_year = subjects_by_cohort_year(&records, "UG", 20..=21, &["CS", "ECO"]);
        assert_eq!(by_year.len(), 2);
        assert_eq!(by_year[0].year_suffix, "20");
        assert_eq!(by_year[0].cohort_size, 1);
        assert_eq!(by_year[1].cohort_size, 2);
        assert_eq!(by_year[1].subjects[0].minoring, 1);
        assert_eq!(by_year[1].subjects[1].majoring, 1);
    }

    #[test]
    fn test_composition() {
        let counts = vec![
            CohortCount { cohort: "a".to_string(), count: 1 },
            CohortCount { cohort: "b".to_string(), count: 3 },
        ];
        let shares = composition(&counts);
        assert_eq!(shares[0].percent, 25.0);
        assert_eq!(shares[1].percent, 75.0);
        let total: f64 = shares.iter().map(|s| s.percent).sum();
        assert!((total - 100.0).abs() < 1e-9);
        assert!(composition(&[]).is_empty());
    }

    #[test]
    fn test_catalog_rejects_unknown_codes() {
        let catalog = SubjectCatalog::default();
        let records = vec![rec("UG-21", "UG", "Enrolled", "Major - CS")];
        assert_eq!(catalog.counts(&records, &["CS"]).unwrap()[0].majoring, 1);
        match catalog.counts(&records, &["CS", "XYZ"]) {
            Err(ScrapeError::UnknownSubjectCode(code)) => assert_eq!(code, "XYZ"),
            other => panic!("expected UnknownSubjectCode, got {:?}", other),
        }
        assert_eq!(catalog.all_counts(&records).len(), DEFAULT_SUBJECT_CODES.len());
    }

    #[test]
    fn test_graduating_years() {
        let records = vec![
            rec("UG 2020-23", "UG", "Enrolled", ""),
            rec("UG 2018-21", "UG", "Enrolled", ""),
            rec("PHD Biology", "PHD Biology", "Enrolled", ""),
        ];
        let years: Vec<_> = graduating_years(&records).into_iter().collect();
        assert_eq!(years, ["21", "23"]);
    }
}
