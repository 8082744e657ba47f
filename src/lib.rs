pub mod config;
pub mod error;
pub mod fetch;
pub mod process;
pub mod report;

pub use config::Config;
pub use error::{Result, ScrapeError};
pub use process::{extract, load_report, Cleaner, Dataset, NormalizedRecord, RawRecord};
pub use report::Report;
