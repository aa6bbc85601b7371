//! Query path: rank the catalog for a prompt and write the result artifact.
//!
//! Order within one invocation is fixed: decay, score, tier, boost, persist.
//! Tiering reads the attention snapshot taken before this query's boost.

use memhook_core::{AccessLog, MemhookConfig};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::index::load_index;
use crate::scorer::{rank, QueryTokens, ScoredEntry, ScoringContext};
use crate::store::{write_atomic, StateStores};
use crate::tier::{disclose, Disclosure, Tier};

/// Prompts shorter than this (after trimming) are not searched.
pub const MIN_PROMPT_CHARS: usize = 3;

/// One ranked entry after tiering.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedResult {
    pub name: String,
    pub file: String,
    pub score: f64,
    pub tier: Tier,
    pub disclosure: Disclosure,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchOutcome {
    /// Everything the final pass selected, best first.
    pub selected: Vec<ScoredEntry>,
    /// Selected entries whose topic file exists, in the same order.
    pub rendered: Vec<RenderedResult>,
    /// Set when a result artifact was written.
    pub result_file: Option<PathBuf>,
}

/// `Name|Path|Score` with the score to one decimal.
pub fn format_result_line(name: &str, path: &Path, score: f64) -> String {
    format!("{}|{}|{:.1}", name, path.display(), score)
}

/// Remove the result artifact of the previous query, if any.
pub fn clear_previous_result(path: &Path) {
    match fs::remove_file(path) {
        Ok(()) => debug!("Cleared previous result {}", path.display()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => warn!("Cannot remove previous result {}: {}", path.display(), e),
    }
}

/// Run one query against the catalog. Never fails; problems are logged and
/// the outcome is simply empty.
pub fn run_search(prompt: &str, config: &MemhookConfig, stores: &StateStores, now: f64) -> SearchOutcome {
    let paths = &config.paths;
    clear_previous_result(&paths.result_file);

    let prompt = prompt.trim();
    if prompt.chars().count() < MIN_PROMPT_CHARS {
        debug!("Prompt too short to search");
        return SearchOutcome::default();
    }
    let tokens = QueryTokens::from_prompt(prompt, config.scoring.min_token_len);
    if tokens.is_empty() {
        return SearchOutcome::default();
    }

    let entries = load_index(&paths.index_file);
    if entries.is_empty() {
        return SearchOutcome::default();
    }

    let mut attention = stores.attention.load_or_default();
    attention.decay(config.attention.decay_rate, config.attention.prune_below);
    let mut access_log: AccessLog = stores.access_log.load_or_default();
    let pairs = stores.coactivation.load_or_default();

    let selected = {
        let ctx = ScoringContext {
            config: &config.scoring,
            access_log: &access_log,
            attention: &attention,
            pairs: &pairs,
            now,
        };
        rank(&entries, &tokens, &ctx)
    };

    let mut rendered = Vec::new();
    for scored in &selected {
        let full_path = paths.memory_dir.join(&scored.entry.file);
        if !full_path.exists() {
            debug!("Skipping {}: {} does not exist", scored.entry.name, full_path.display());
            continue;
        }
        let tier = Tier::for_attention(attention.score_of(&scored.entry.file), &config.tiers);
        let disclosure = disclose(tier, &full_path, &config.tiers);
        if disclosure != Disclosure::Omitted {
            access_log.record(&scored.entry.file, now);
        }
        rendered.push(RenderedResult {
            name: scored.entry.name.clone(),
            file: scored.entry.file.clone(),
            score: scored.score,
            tier,
            disclosure,
        });
    }

    for scored in &selected {
        attention.reinforce(&scored.entry.file, config.attention.query_boost, now);
    }
    attention.last_update = now;
    stores.attention.persist(&attention);
    stores.access_log.persist(&access_log);

    let lines: Vec<String> = rendered
        .iter()
        .filter_map(|r| r.disclosure.path().map(|p| format_result_line(&r.name, p, r.score)))
        .collect();

    let result_file = if lines.is_empty() {
        None
    } else {
        match write_atomic(&paths.result_file, &lines.join("\n")) {
            Ok(()) => {
                info!("Wrote {} memory results to {}", lines.len(), paths.result_file.display());
                Some(paths.result_file.clone())
            }
            Err(e) => {
                warn!("{}", e);
                None
            }
        }
    };

    SearchOutcome {
        selected,
        rendered,
        result_file,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn result_line_has_one_decimal() {
        let line = format_result_line("Blender MCP", Path::new("/m/blender-mcp.md"), 7.26);
        assert_eq!(line, "Blender MCP|/m/blender-mcp.md|7.3");
        assert_eq!(format_result_line("X", Path::new("/x.md"), 4.0), "X|/x.md|4.0");
    }

    #[test]
    fn short_prompt_clears_stale_result() {
        let tmp = tempfile::TempDir::new().unwrap();
        let config = MemhookConfig::rooted_at(tmp.path());
        let stores = StateStores::from_paths(&config.paths);
        fs::write(&config.paths.result_file, "stale|/x|9.0").unwrap();

        let outcome = run_search("hi", &config, &stores, 1_000.0);
        assert!(outcome.selected.is_empty());
        assert!(!config.paths.result_file.exists());
    }

    #[test]
    fn missing_catalog_leaves_state_untouched() {
        let tmp = tempfile::TempDir::new().unwrap();
        let config = MemhookConfig::rooted_at(tmp.path());
        let stores = StateStores::from_paths(&config.paths);

        let outcome = run_search("blender mesh export", &config, &stores, 1_000.0);
        assert_eq!(outcome, SearchOutcome::default());
        assert!(!config.paths.attention_state.exists());
    }
}
