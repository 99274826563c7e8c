use std::path::PathBuf;
use thiserror::Error;
use url::ParseError;

#[derive(Debug, Error)]
pub enum PagecapError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] ParseError),

    #[error("Temporary directory unavailable: {}: {reason}", path.display())]
    DirectoryUnavailable { path: PathBuf, reason: String },

    #[error("Method {adapter}::{method}() does not exist")]
    UnsupportedOperation {
        adapter: &'static str,
        method: String,
    },

    #[error("Render engine error: {0}")]
    Engine(String),

    #[error("Failed to read rendered output {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Storage error: {0}")]
    Storage(std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl PagecapError {
    pub fn directory_unavailable(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        PagecapError::DirectoryUnavailable {
            path: path.into(),
            reason: reason.into(),
        }
    }

    pub fn engine(message: impl Into<String>) -> Self {
        PagecapError::Engine(message.into())
    }
}

pub type Result<T> = std::result::Result<T, PagecapError>;
