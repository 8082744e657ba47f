// src/process/mod.rs
pub mod aggregate;
pub mod clean;
pub mod extract;
pub mod records;
pub mod utils;

use tracing::info;

use crate::error::Result;
pub use clean::Cleaner;
pub use extract::extract;
pub use records::{NormalizedRecord, RawRecord};

/// Records from one report snapshot, before and after cleaning.
#[derive(Debug, Clone)]
pub struct Dataset {
    pub extracted: usize,
    pub records: Vec<NormalizedRecord>,
}

/// Extract the report table from `html` and clean it.
#[tracing::instrument(level = "info", skip(html, cleaner), fields(bytes = html.len()))]
pub fn load_report(html: &str, cleaner: &Cleaner) -> Result<Dataset> {
    let raw = extract(html)?;
    let records = cleaner.clean(&raw);
    info!(
        extracted = raw.len(),
        retained = records.len(),
        "report table loaded"
    );
    Ok(Dataset {
        extracted: raw.len(),
        records,
    })
}
