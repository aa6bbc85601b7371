//! Touch path: a file was read, edited or written.
//!
//! The file goes fully hot and is paired with every other file touched in
//! the trailing co-activation window. Usage feeds back into retrieval.

use memhook_core::{MemhookConfig, TrackingRecord};
use std::path::Path;
use tracing::{debug, warn};

use crate::store::{JsonStore, StateStores};
use crate::tracking::TrackingLog;
use memhook_core::{AttentionState, CoactivationPairs};

/// A file operation reported by the host.
#[derive(Debug, Clone, PartialEq)]
pub struct TouchEvent {
    pub tool: String,
    pub file_path: String,
    pub at: f64,
}

impl TouchEvent {
    pub fn new(tool: impl Into<String>, file_path: impl Into<String>, at: f64) -> Self {
        Self {
            tool: tool.into(),
            file_path: file_path.into(),
            at,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TouchOutcome {
    /// False when the tool is not tracked or no path was given.
    pub tracked: bool,
    /// Store key the touch was recorded under.
    pub file_id: String,
    /// Other files paired with this one.
    pub coactivated: Vec<String>,
}

/// Store key for a touched path: relative to the memory directory when the
/// path lies inside it, otherwise the path as given.
pub fn file_id(path: &str, memory_dir: &Path) -> String {
    match Path::new(path).strip_prefix(memory_dir) {
        Ok(rel) if !rel.as_os_str().is_empty() => rel.to_string_lossy().into_owned(),
        _ => path.to_string(),
    }
}

/// Set `file` to full attention.
pub fn update_attention(store: &JsonStore<AttentionState>, file: &str, now: f64) -> bool {
    let mut state = store.load_or_default();
    state.mark_hot(file, now);
    state.last_update = now;
    store.persist(&state)
}

/// Pair `file` with every other file touched less than `window` seconds
/// before `now`. The store is only written when at least one pair changed.
pub fn update_coactivation(
    tracking: &TrackingLog,
    store: &JsonStore<CoactivationPairs>,
    file: &str,
    now: f64,
    window: f64,
    memory_dir: &Path,
) -> Vec<String> {
    let mut others: Vec<String> = Vec::new();
    for path in tracking.recent_files(now, window) {
        let id = file_id(&path, memory_dir);
        if id != file && !others.contains(&id) {
            others.push(id);
        }
    }
    if others.is_empty() {
        return others;
    }

    let mut pairs = store.load_or_default();
    for other in &others {
        let count = pairs.record(file, other, now);
        debug!("co-activation {} <-> {} = {}", file, other, count);
    }
    store.persist(&pairs);
    others
}

/// Full touch path: track, boost, pair. Never fails; problems are logged.
pub fn record_touch(event: &TouchEvent, config: &MemhookConfig, stores: &StateStores) -> TouchOutcome {
    if event.file_path.is_empty() || !config.is_tracked_tool(&event.tool) {
        debug!("Ignoring {} touch of {:?}", event.tool, event.file_path);
        return TouchOutcome::default();
    }

    let record = TrackingRecord::new(event.at, event.tool.as_str(), event.file_path.as_str());
    if let Err(e) = stores.tracking.append(&record) {
        warn!("Failed to append tracking record: {}", e);
    }

    let id = file_id(&event.file_path, &config.paths.memory_dir);
    update_attention(&stores.attention, &id, event.at);
    let coactivated = update_coactivation(
        &stores.tracking,
        &stores.coactivation,
        &id,
        event.at,
        config.coactivation.window_secs,
        &config.paths.memory_dir,
    );

    TouchOutcome {
        tracked: true,
        file_id: id,
        coactivated,
    }
}
