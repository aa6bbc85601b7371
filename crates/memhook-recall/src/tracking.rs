//! Append-only JSONL log of file operations, the substrate for co-activation.

use memhook_core::{Result, TrackingRecord};
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::store::write_atomic;

#[derive(Debug, Clone)]
pub struct TrackingLog {
    path: PathBuf,
}

impl TrackingLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn append(&self, record: &TrackingRecord) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let line = serde_json::to_string(record)?;
        let mut file = OpenOptions::new().create(true).append(true).open(&self.path)?;
        writeln!(file, "{line}")?;
        Ok(())
    }

    /// All parseable records in file order. Malformed lines are skipped;
    /// a missing log is empty.
    pub fn records(&self) -> Vec<TrackingRecord> {
        let content = match fs::read_to_string(&self.path) {
            Ok(c) => c,
            Err(_) => return Vec::new(),
        };
        content
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .filter_map(|line| serde_json::from_str(line).ok())
            .collect()
    }

    /// Distinct paths touched less than `max_age` seconds before `now`, first-seen order.
    pub fn recent_files(&self, now: f64, max_age: f64) -> Vec<String> {
        let mut files: Vec<String> = Vec::new();
        for record in self.records() {
            if record.file_path.is_empty() || record.age(now) >= max_age {
                continue;
            }
            if !files.contains(&record.file_path) {
                files.push(record.file_path);
            }
        }
        files
    }

    /// Rewrite the log keeping only records younger than `retention`.
    /// Returns how many records were dropped.
    pub fn prune(&self, now: f64, retention: f64) -> usize {
        if !self.path.exists() {
            return 0;
        }
        let records = self.records();
        let before = records.len();
        let kept: Vec<String> = records
            .into_iter()
            .filter(|r| r.age(now) < retention)
            .filter_map(|r| serde_json::to_string(&r).ok())
            .collect();
        let dropped = before - kept.len();

        let body = if kept.is_empty() {
            String::new()
        } else {
            format!("{}\n", kept.join("\n"))
        };
        if let Err(e) = write_atomic(&self.path, &body) {
            warn!("Tracking log prune failed: {}", e);
            return 0;
        }
        debug!("Pruned {} tracking records from {}", dropped, self.path.display());
        dropped
    }
}
