use doindex_scanner::ScanError;
use reqwest::StatusCode;
use std::path::PathBuf;
use thiserror::Error;

/// Failures talking to the hosted search service
#[derive(Error, Debug)]
pub enum PublishError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Search service rejected credentials ({status}): {message}")]
    Unauthorized { status: StatusCode, message: String },

    #[error("Search service quota exceeded: {message}")]
    QuotaExceeded { message: String },

    #[error("Search service error ({status}): {message}")]
    Api { status: StatusCode, message: String },

    #[error("Invalid search host: {0}")]
    InvalidHost(String),
}

/// Anything that aborts a run
#[derive(Error, Debug)]
pub enum RunError {
    #[error("IO error on {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid stats file {path}: {source}")]
    Stats {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("Scan failed: {0}")]
    Scan(#[from] ScanError),

    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Missing configuration: {0} is not set")]
    MissingConfig(&'static str),

    #[error("Task join error: {0}")]
    Join(#[from] tokio::task::JoinError),

    #[error("Search index publish failed: {0}")]
    Publish(#[from] PublishError),
}

impl RunError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        RunError::Io {
            path: path.into(),
            source,
        }
    }

    /// True when the failure came from the remote search service rather
    /// than the local filesystem or environment.
    pub fn is_remote(&self) -> bool {
        matches!(self, RunError::Publish(_))
    }
}

pub type Result<T> = std::result::Result<T, RunError>;
