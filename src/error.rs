// src/error.rs

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScrapeError {
    /// The HTML does not have the expected fixed table shape.
    #[error("malformed input: {0}")]
    MalformedInput(String),

    /// A subject code was requested that the configured catalog does not know.
    #[error("unknown subject code: {0}")]
    UnknownSubjectCode(String),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

pub type Result<T> = std::result::Result<T, ScrapeError>;
