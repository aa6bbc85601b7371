//! Core types for memhook: catalog entries and the persisted per-file signals.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Importance assumed for catalog rows that do not carry one.
pub const DEFAULT_IMPORTANCE: u8 = 5;
pub const MIN_IMPORTANCE: u8 = 1;
pub const MAX_IMPORTANCE: u8 = 10;

/// Joins the two halves of a co-activation key. Not expected inside paths.
pub const PAIR_SEPARATOR: &str = "||";

/// Decimal places kept on attention scores after decay.
pub const SCORE_PRECISION: i32 = 4;

/// Current wall-clock time as unix seconds.
pub fn now_secs() -> f64 {
    chrono::Utc::now().timestamp_millis() as f64 / 1000.0
}

fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}

// ============================================================
// Entry
// ============================================================

/// One catalog row. Rebuilt from the index on every invocation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    pub name: String,
    pub status: String,
    pub importance: u8,
    pub keywords: Vec<String>,
    /// Path relative to the memory directory. Join key into every store.
    pub file: String,
}

impl Entry {
    /// Multiplier applied to the keyword score. 1.0 at the default importance.
    pub fn importance_factor(&self) -> f64 {
        f64::from(self.importance) / f64::from(DEFAULT_IMPORTANCE)
    }

    pub fn clamp_importance(raw: u32) -> u8 {
        raw.clamp(u32::from(MIN_IMPORTANCE), u32::from(MAX_IMPORTANCE)) as u8
    }
}

// ============================================================
// Attention
// ============================================================

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct AttentionRecord {
    pub score: f64,
    #[serde(default)]
    pub last_access: f64,
}

/// Decaying relevance memory per file, persisted as `attn_state.json`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct AttentionState {
    #[serde(default)]
    pub scores: BTreeMap<String, AttentionRecord>,
    #[serde(default)]
    pub last_update: f64,
}

impl AttentionState {
    pub fn score_of(&self, file: &str) -> f64 {
        self.scores.get(file).map(|r| r.score).unwrap_or(0.0)
    }

    /// Multiply every score by `1 - rate`, round, and drop anything under `floor`.
    /// Counted per invocation, not per elapsed second.
    pub fn decay(&mut self, rate: f64, floor: f64) {
        let keep = 1.0 - rate;
        self.scores.retain(|_, record| {
            record.score = round_to(record.score * keep, SCORE_PRECISION);
            record.score >= floor
        });
    }

    /// Incremental boost for files selected by a query. Capped at 1.0.
    pub fn reinforce(&mut self, file: &str, amount: f64, now: f64) {
        let previous = self.score_of(file);
        self.scores.insert(
            file.to_string(),
            AttentionRecord {
                score: (previous + amount).min(1.0),
                last_access: now,
            },
        );
    }

    /// Full reset to 1.0 for a file that was used directly.
    pub fn mark_hot(&mut self, file: &str, now: f64) {
        self.scores.insert(
            file.to_string(),
            AttentionRecord {
                score: 1.0,
                last_access: now,
            },
        );
    }

    pub fn len(&self) -> usize {
        self.scores.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }
}

// ============================================================
// Access log
// ============================================================

/// Last emission time per file, persisted as `access_log.json`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccessLog(BTreeMap<String, f64>);

impl AccessLog {
    pub fn last_access(&self, file: &str) -> Option<f64> {
        self.0.get(file).copied()
    }

    /// Seconds since the file was last accessed, if it ever was.
    pub fn elapsed(&self, file: &str, now: f64) -> Option<f64> {
        self.last_access(file).map(|ts| now - ts)
    }

    pub fn record(&mut self, file: &str, now: f64) {
        self.0.insert(file.to_string(), now);
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

// ============================================================
// Co-activation
// ============================================================

/// Canonical key for an unordered pair of files: the smaller identifier first.
#[derive(Clone, Debug, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct PairKey(String);

impl PairKey {
    pub fn new(a: &str, b: &str) -> Self {
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        Self(format!("{lo}{PAIR_SEPARATOR}{hi}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for PairKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PairRecord {
    pub count: u64,
    pub first_seen: f64,
    pub last_seen: f64,
}

/// Pairwise co-use counters, persisted as `coactivation_pairs.json`.
/// Records are never evicted.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CoactivationPairs(BTreeMap<String, PairRecord>);

impl CoactivationPairs {
    pub fn get(&self, key: &PairKey) -> Option<&PairRecord> {
        self.0.get(key.as_str())
    }

    pub fn count(&self, a: &str, b: &str) -> u64 {
        self.get(&PairKey::new(a, b)).map(|r| r.count).unwrap_or(0)
    }

    /// Bump the counter for `(a, b)`, creating it at 1. Returns the new count.
    pub fn record(&mut self, a: &str, b: &str, now: f64) -> u64 {
        let key = PairKey::new(a, b);
        let record = self.0.entry(key.0).or_insert(PairRecord {
            count: 0,
            first_seen: now,
            last_seen: now,
        });
        record.count += 1;
        record.last_seen = now;
        record.count
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &PairRecord)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

// ============================================================
// File tracking log
// ============================================================

/// One line of `file_tracking.jsonl`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TrackingRecord {
    pub timestamp: f64,
    #[serde(default)]
    pub tool: String,
    #[serde(default)]
    pub file_path: String,
}

impl TrackingRecord {
    pub fn new(timestamp: f64, tool: impl Into<String>, file_path: impl Into<String>) -> Self {
        Self {
            timestamp,
            tool: tool.into(),
            file_path: file_path.into(),
        }
    }

    pub fn age(&self, now: f64) -> f64 {
        now - self.timestamp
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_to_four_places() {
        assert_eq!(round_to(0.722_54, 4), 0.7225);
        assert_eq!(round_to(0.85, 4), 0.85);
    }

    #[test]
    fn clamp_importance_bounds() {
        assert_eq!(Entry::clamp_importance(0), 1);
        assert_eq!(Entry::clamp_importance(7), 7);
        assert_eq!(Entry::clamp_importance(42), 10);
    }

    #[test]
    fn pair_key_is_order_independent() {
        assert_eq!(PairKey::new("/b.py", "/a.py"), PairKey::new("/a.py", "/b.py"));
        assert_eq!(PairKey::new("/b.py", "/a.py").as_str(), "/a.py||/b.py");
    }
}
