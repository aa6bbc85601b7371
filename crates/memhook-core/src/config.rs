//! memhook configuration
//!
//! All tunable parameters in one place. Loaded from TOML at startup,
//! falls back to defaults if no config file exists.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MemhookConfig {
    /// Where the catalog, topic files and state stores live.
    pub paths: PathConfig,
    /// Keyword, recency and ranking parameters.
    pub scoring: ScoringConfig,
    /// Decay and boost parameters.
    pub attention: AttentionConfig,
    /// Disclosure tier thresholds.
    pub tiers: TierConfig,
    /// Co-activation window.
    pub coactivation: CoactivationConfig,
    /// File tracking log parameters.
    pub tracking: TrackingConfig,
    /// Subagent context injection.
    pub context: ContextConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PathConfig {
    /// Directory holding topic files. Catalog `file` fields are relative to it.
    pub memory_dir: PathBuf,
    /// The catalog (`MEMORY.md`).
    pub index_file: PathBuf,
    /// Result artifact consumed by the prompt hook.
    pub result_file: PathBuf,
    pub access_log: PathBuf,
    pub attention_state: PathBuf,
    pub coactivation_log: PathBuf,
    pub tracking_log: PathBuf,
}

/// One step of the recency boost: files accessed within `within_secs` get `boost`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RecencyStep {
    pub within_secs: f64,
    pub boost: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    /// Query tokens shorter than this are dropped.
    pub min_token_len: usize,
    /// Token equals a keyword.
    pub exact_points: f64,
    /// Token is a substring of a keyword or the other way round.
    pub partial_points: f64,
    /// Token appears in the entry name.
    pub name_points: f64,
    /// Attention score multiplier.
    pub attention_weight: f64,
    /// Per-pair ceiling on the co-activation bonus.
    pub coactivation_cap: f64,
    /// Inclusion floor for the provisional (first) pass.
    pub provisional_floor: f64,
    /// Size of the provisional candidate set.
    pub provisional_pool: usize,
    /// Inclusion threshold for the final pass.
    pub min_score: f64,
    /// Results returned by a query.
    pub max_results: usize,
    /// Steps checked in order; the first one that covers the elapsed time wins.
    pub recency_steps: Vec<RecencyStep>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AttentionConfig {
    /// Fraction of attention lost per query invocation.
    pub decay_rate: f64,
    /// Scores below this are pruned after decay.
    pub prune_below: f64,
    /// Added to the attention of files selected by a query.
    pub query_boost: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TierConfig {
    /// At or above: full file.
    pub hot_threshold: f64,
    /// At or above (and below hot): leading-section excerpt.
    pub warm_threshold: f64,
    /// Character budget of a warm excerpt.
    pub excerpt_max_chars: usize,
    /// Bytes read from a topic file when building an excerpt.
    pub excerpt_read_cap: usize,
    /// Omit cold entries instead of emitting them in full.
    /// Off by default: cold entries that clear the score threshold are emitted.
    pub suppress_cold: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CoactivationConfig {
    /// Files touched within this many seconds of each other are a pair.
    pub window_secs: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackingConfig {
    /// Tools whose file operations are tracked.
    pub tracked_tools: Vec<String>,
    /// Tracking records older than this are dropped on prune.
    pub retention_secs: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ContextConfig {
    /// Task prompts shorter than this get no context.
    pub min_prompt_chars: usize,
    pub max_files: usize,
    /// Characters of each topic file injected.
    pub max_chars_per_file: usize,
}

// ============================================================
// Defaults
// ============================================================

fn default_state_dir() -> PathBuf {
    dirs::home_dir()
        .map(|h| h.join(".claude"))
        .unwrap_or_else(|| PathBuf::from(".claude"))
}

impl Default for PathConfig {
    fn default() -> Self {
        Self::under(&default_state_dir())
    }
}

impl PathConfig {
    /// Every path under one state directory, memory files in `<dir>/memory`.
    pub fn under(state_dir: &Path) -> Self {
        let memory_dir = state_dir.join("memory");
        Self {
            index_file: memory_dir.join("MEMORY.md"),
            memory_dir,
            result_file: state_dir.join("memory_search_result.txt"),
            access_log: state_dir.join("access_log.json"),
            attention_state: state_dir.join("attn_state.json"),
            coactivation_log: state_dir.join("coactivation_pairs.json"),
            tracking_log: state_dir.join("file_tracking.jsonl"),
        }
    }
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            min_token_len: 3,
            exact_points: 3.0,
            partial_points: 2.0,
            name_points: 2.0,
            attention_weight: 3.0,
            coactivation_cap: 2.0,
            provisional_floor: 2.0,
            provisional_pool: 5,
            min_score: 4.0,
            max_results: 3,
            recency_steps: vec![
                RecencyStep { within_secs: 3_600.0, boost: 3.0 },
                RecencyStep { within_secs: 14_400.0, boost: 2.0 },
                RecencyStep { within_secs: 86_400.0, boost: 1.0 },
            ],
        }
    }
}

impl Default for AttentionConfig {
    fn default() -> Self {
        Self { decay_rate: 0.15, prune_below: 0.01, query_boost: 0.3 }
    }
}

impl Default for TierConfig {
    fn default() -> Self {
        Self {
            hot_threshold: 0.8,
            warm_threshold: 0.25,
            excerpt_max_chars: 2_000,
            excerpt_read_cap: 64 * 1024,
            suppress_cold: false,
        }
    }
}

impl Default for CoactivationConfig {
    fn default() -> Self {
        Self { window_secs: 120.0 }
    }
}

impl Default for TrackingConfig {
    fn default() -> Self {
        Self {
            tracked_tools: vec!["Read".into(), "Edit".into(), "Write".into()],
            retention_secs: 86_400.0,
        }
    }
}

impl Default for ContextConfig {
    fn default() -> Self {
        Self { min_prompt_chars: 5, max_files: 2, max_chars_per_file: 3_000 }
    }
}

// ============================================================
// Loading
// ============================================================

impl MemhookConfig {
    /// Default config location: `~/.claude/memhook.toml`.
    pub fn default_path() -> PathBuf {
        default_state_dir().join("memhook.toml")
    }

    /// Defaults with every path rooted under `state_dir`.
    pub fn rooted_at(state_dir: impl AsRef<Path>) -> Self {
        Self {
            paths: PathConfig::under(state_dir.as_ref()),
            ..Self::default()
        }
    }

    /// Load config from a TOML file, falling back to defaults.
    pub fn load(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(content) => match toml::from_str(&content) {
                Ok(config) => {
                    tracing::debug!("Loaded config from {}", path.display());
                    config
                }
                Err(e) => {
                    tracing::warn!("Failed to parse {}: {}, using defaults", path.display(), e);
                    Self::default()
                }
            },
            Err(_) => {
                tracing::debug!("No config at {}, using defaults", path.display());
                Self::default()
            }
        }
    }

    /// Render the config as TOML (for generating a default config file).
    pub fn to_toml(&self) -> String {
        toml::to_string_pretty(self).unwrap_or_default()
    }

    pub fn is_tracked_tool(&self, tool: &str) -> bool {
        self.tracking.tracked_tools.iter().any(|t| t == tool)
    }
}
