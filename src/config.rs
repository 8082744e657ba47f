// src/config.rs

use serde::Deserialize;
use std::{
    env, fs,
    path::{Path, PathBuf},
    time::Duration,
};
use tracing::{debug, info};

use crate::error::{Result, ScrapeError};
use crate::process::aggregate::DEFAULT_SUBJECT_CODES;

/// Looked up in the working directory when no `--config` is given.
pub const DEFAULT_CONFIG_FILE: &str = "cohortscraper.yaml";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub portal: PortalConfig,
    pub cleaning: CleaningConfig,
    pub subjects: SubjectConfig,
    pub window: WindowConfig,
    pub output: OutputConfig,
}

/// Everything the fetcher needs to reach the report page.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PortalConfig {
    pub base_url: String,
    /// Form endpoint that accepts `email`/`password`; skipped when unset.
    pub login_path: Option<String>,
    pub report_path: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    /// Raw `Cookie` header copied from an authenticated browser session.
    pub session_cookie: Option<String>,
    pub user_agent: String,
    pub timeout_secs: u64,
    pub max_retries: usize,
    pub retry_delay_secs: u64,
}

impl Default for PortalConfig {
    fn default() -> Self {
        Self {
            base_url: "https://ams.ashoka.edu.in/".to_string(),
            login_path: None,
            report_path: None,
            email: None,
            password: None,
            session_cookie: None,
            user_agent: concat!("cohortscraper/", env!("CARGO_PKG_VERSION")).to_string(),
            timeout_secs: 60,
            max_retries: 3,
            retry_delay_secs: 5,
        }
    }
}

impl PortalConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_secs(self.retry_delay_secs)
    }

    pub fn credentials(&self) -> Option<(&str, &str)> {
        match (&self.email, &self.password) {
            (Some(e), Some(p)) => Some((e.as_str(), p.as_str())),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CleaningConfig {
    /// Cohort labels containing any of these are dropped (visiting and short programs).
    pub excluded_markers: Vec<String>,
    pub doctoral_marker: String,
}

impl Default for CleaningConfig {
    fn default() -> Self {
        Self {
            excluded_markers: vec!["VISP".to_string(), "YSP".to_string(), "VSP".to_string()],
            doctoral_marker: "PHD".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SubjectConfig {
    pub codes: Vec<String>,
    /// Codes shown in the report tables; empty means every catalog code.
    pub requested: Vec<String>,
}

impl Default for SubjectConfig {
    fn default() -> Self {
        Self {
            codes: DEFAULT_SUBJECT_CODES.iter().map(|c| c.to_string()).collect(),
            requested: Vec::new(),
        }
    }
}

/// Which cohorts count as "current".
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub program_prefix: String,
    pub year_suffixes: Vec<String>,
    pub status_marker: String,
    /// Two-digit years for the per-cohort subject breakdown.
    pub first_year: u32,
    pub last_year: u32,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            program_prefix: "UG".to_string(),
            year_suffixes: vec!["-21".to_string(), "-22".to_string(), "-23".to_string()],
            status_marker: "Enrolled".to_string(),
            first_year: 17,
            last_year: 23,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub dir: PathBuf,
    pub snapshot_dir: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("output"),
            snapshot_dir: PathBuf::from("snapshots"),
        }
    }
}

impl Config {
    /// Load from `path`, else from `cohortscraper.yaml` if present, else defaults.
    /// Portal credentials are then filled from the environment (and `.env`).
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut cfg = match path {
            Some(p) => Self::from_file(p)?,
            None if Path::new(DEFAULT_CONFIG_FILE).is_file() => {
                Self::from_file(Path::new(DEFAULT_CONFIG_FILE))?
            }
            None => {
                debug!("no config file; using defaults");
                Self::default()
            }
        };
        cfg.apply_env();
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        info!(path = %path.display(), "loading config");
        let text = fs::read_to_string(path)?;
        Self::from_yaml_str(&text)
    }

    /// Parse without validating; `load` validates once the environment is applied.
    pub fn from_yaml_str(text: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(text)?)
    }

    fn apply_env(&mut self) {
        dotenv::dotenv().ok();
        if let Ok(v) = env::var("PORTAL_EMAIL") {
            self.portal.email = Some(v);
        }
        if let Ok(v) = env::var("PORTAL_PASSWORD") {
            self.portal.password = Some(v);
        }
        if let Ok(v) = env::var("PORTAL_SESSION_COOKIE") {
            self.portal.session_cookie = Some(v);
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.cleaning.excluded_markers.iter().any(|m| m.is_empty()) {
            return Err(ScrapeError::Config(
                "cleaning.excluded_markers must not contain an empty marker".to_string(),
            ));
        }
        if self.cleaning.doctoral_marker.is_empty() {
            return Err(ScrapeError::Config(
                "cleaning.doctoral_marker must not be empty".to_string(),
            ));
        }
        if self.window.first_year > self.window.last_year {
            return Err(ScrapeError::Config(format!(
                "window.first_year ({}) is after window.last_year ({})",
                self.window.first_year, self.window.last_year
            )));
        }
        if self.portal.max_retries == 0 {
            return Err(ScrapeError::Config(
                "portal.max_retries must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
