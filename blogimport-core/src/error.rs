//! Error taxonomy of the import pipeline
//!
//! Run-level failures surface as [`ImportError`]. Everything else is
//! per-item and ends up in the report instead of aborting the run.

use remote::RemoteError;
use thiserror::Error;

/// Malformed rich-text document. Unknown block or entity types are not errors.
#[derive(Debug, Error)]
pub enum ConversionError {
    #[error("malformed rich-text document: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("unsupported rich-text payload: expected a JSON string or object, got {0}")]
    UnsupportedPayload(&'static str),
}

/// Failure reported by the content store collaborator
#[derive(Debug, Error)]
#[error(transparent)]
pub struct StoreError(#[from] anyhow::Error);

/// Failure fetching a binary asset
#[derive(Debug, Error)]
pub enum DownloadError {
    #[error("download of {url} failed with status {status}")]
    Status { url: String, status: u16 },

    #[error("download of {url} failed: {reason}")]
    Transport { url: String, reason: String },
}

impl DownloadError {
    pub fn from_remote(url: &str, error: RemoteError) -> Self {
        match error.status() {
            Some(status) => DownloadError::Status {
                url: url.to_string(),
                status,
            },
            None => DownloadError::Transport {
                url: url.to_string(),
                reason: error.to_string(),
            },
        }
    }
}

/// Failure importing one image
#[derive(Debug, Error)]
pub enum AssetError {
    #[error("cannot derive a filename from {0}")]
    UnrecognizedUrl(String),

    #[error(transparent)]
    Download(#[from] DownloadError),

    #[error("asset store error: {0}")]
    Store(#[from] StoreError),

    #[error("upload directory error: {0}")]
    Io(#[from] std::io::Error),
}

/// Failure that aborts an import run
#[derive(Debug, Error)]
pub enum ImportError {
    #[error("failed to fetch posts: {0}")]
    Remote(#[from] RemoteError),
}
