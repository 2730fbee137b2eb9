use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CipherForgeError {
    #[error("IO Error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV Error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON Parsing Error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration Error: {0}")]
    Config(String),

    #[error("File Not Found: '{}' ({reason})", path.display())]
    NotFound { path: PathBuf, reason: String },

    #[error("Arbitration Unavailable: {0}")]
    ArbitrationUnavailable(String),
}

impl CipherForgeError {
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub fn arbitration(msg: impl Into<String>) -> Self {
        Self::ArbitrationUnavailable(msg.into())
    }
}

pub type CfResult<T> = Result<T, CipherForgeError>;
