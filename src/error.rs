use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BunenvError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Incomplete read while reading from {url}: {detail}")]
    IncompleteRead { url: String, detail: String },

    #[error("Failed to download file: {0}")]
    DownloadFailed(String),

    #[error("Failed to parse JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid archive: {0}")]
    Archive(#[from] zip::result::ZipError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Command {command} failed with error code {code}")]
    CommandFailed { command: String, code: i32 },

    #[error("Invalid configuration in {}: {}", .file.display(), .message)]
    Config { file: PathBuf, message: String },

    #[error("Environment already exists: {}", .0.display())]
    EnvironmentExists(PathBuf),

    #[error("No python virtualenv is available")]
    NoVirtualenv,

    #[error("Installing system bun on Windows is not supported!")]
    SystemBunUnsupported,

    #[error("Could not determine latest Bun version")]
    LatestVersionUnavailable,

    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

impl BunenvError {
    /// Process exit status for this error.
    pub fn exit_code(&self) -> u8 {
        match self {
            BunenvError::EnvironmentExists(_) | BunenvError::NoVirtualenv => 2,
            _ => 1,
        }
    }
}

pub type Result<T> = std::result::Result<T, BunenvError>;
