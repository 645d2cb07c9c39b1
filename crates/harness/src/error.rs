//! Error types for the harness

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum HarnessError {
    /// A scenario's expected condition was false. Displays the message as given.
    #[error("{0}")]
    AssertionFailed(String),

    /// Network-level failure reaching the backend, passed through untouched.
    #[error("{0}")]
    Transport(#[from] reqwest::Error),

    #[error("Request timed out after {timeout:?}: {method} {url}")]
    RequestTimeout {
        method: String,
        url: String,
        timeout: Duration,
    },

    #[error("Failed to read {}: {source}", path.display())]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Server failed to start: {0}")]
    ServerSpawn(String),

    #[error("Scenario panicked: {0}")]
    ScenarioPanicked(String),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Invalid pattern: {0}")]
    Pattern(#[from] regex::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type HarnessResult<T> = Result<T, HarnessError>;
