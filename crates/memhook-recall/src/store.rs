//! JSON state stores with load-with-default and atomic replace-on-write.
//!
//! Readers never see a partial document: every save goes to its own temp
//! file in the target's directory and is renamed over the target. There is
//! no isolation across a read-modify-write cycle, so concurrent writers are
//! last-writer-wins.

use memhook_core::config::PathConfig;
use memhook_core::{AccessLog, AttentionState, CoactivationPairs, Error, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs;
use std::io::Write;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{debug, warn};

use crate::tracking::TrackingLog;

/// Outcome of reading a store file.
#[derive(Debug)]
pub enum Loaded<T> {
    Present(T),
    Missing,
    Corrupt(String),
}

impl<T: Default> Loaded<T> {
    /// Missing and corrupt both mean "start from the default".
    pub fn or_default(self, path: &Path) -> T {
        match self {
            Loaded::Present(value) => value,
            Loaded::Missing => T::default(),
            Loaded::Corrupt(reason) => {
                warn!("Ignoring corrupt store {}: {}", path.display(), reason);
                T::default()
            }
        }
    }
}

impl<T> Loaded<T> {
    pub fn is_present(&self) -> bool {
        matches!(self, Loaded::Present(_))
    }
}

pub fn load_json<T: DeserializeOwned>(path: &Path) -> Loaded<T> {
    let content = match fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Loaded::Missing,
        Err(e) => return Loaded::Corrupt(e.to_string()),
    };
    match serde_json::from_str(&content) {
        Ok(value) => Loaded::Present(value),
        Err(e) => Loaded::Corrupt(e.to_string()),
    }
}

/// Write `contents` to a uniquely named temp file next to `path`, flush it,
/// and rename it over `path`. Concurrent writers never share a temp file.
/// On failure the temp file is removed and the previous target is untouched.
pub fn write_atomic(path: &Path, contents: &str) -> Result<()> {
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    fs::create_dir_all(parent)?;

    let mut temp = NamedTempFile::new_in(parent).map_err(|e| Error::persist_failed(path, e))?;
    temp.write_all(contents.as_bytes())
        .and_then(|_| temp.as_file().sync_all())
        .map_err(|e| Error::persist_failed(path, e))?;
    temp.persist(path).map_err(|e| Error::persist_failed(path, e.error))?;
    Ok(())
}

pub fn save_json_atomic<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    write_atomic(path, &json)
}

/// A typed JSON document at a fixed path.
#[derive(Debug, Clone)]
pub struct JsonStore<T> {
    path: PathBuf,
    _marker: PhantomData<fn() -> T>,
}

impl<T> JsonStore<T>
where
    T: Serialize + DeserializeOwned + Default,
{
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            _marker: PhantomData,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn load(&self) -> Loaded<T> {
        load_json(&self.path)
    }

    pub fn load_or_default(&self) -> T {
        self.load().or_default(&self.path)
    }

    pub fn save(&self, value: &T) -> Result<()> {
        save_json_atomic(&self.path, value)
    }

    /// Save, logging instead of returning failures. Returns whether the write landed.
    pub fn persist(&self, value: &T) -> bool {
        match self.save(value) {
            Ok(()) => {
                debug!("Saved {}", self.path.display());
                true
            }
            Err(e) => {
                warn!("{}", e);
                false
            }
        }
    }
}

/// Every store the engine reads or writes, injected into each entry point.
#[derive(Debug, Clone)]
pub struct StateStores {
    pub attention: JsonStore<AttentionState>,
    pub coactivation: JsonStore<CoactivationPairs>,
    pub access_log: JsonStore<AccessLog>,
    pub tracking: TrackingLog,
}

impl StateStores {
    pub fn from_paths(paths: &PathConfig) -> Self {
        Self {
            attention: JsonStore::new(&paths.attention_state),
            coactivation: JsonStore::new(&paths.coactivation_log),
            access_log: JsonStore::new(&paths.access_log),
            tracking: TrackingLog::new(&paths.tracking_log),
        }
    }
}
