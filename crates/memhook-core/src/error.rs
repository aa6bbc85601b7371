//! Error types for memhook

use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("io error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("json error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("persist failed for {}: {source}", path.display())]
    PersistFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub fn persist_failed(path: impl AsRef<Path>, source: std::io::Error) -> Self {
        Self::PersistFailed {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }
}
