//! Context block for spawned subagents.
//!
//! Keyword relevance only: no recency, attention or co-activation, and no
//! state is written.

use memhook_core::MemhookConfig;
use tracing::{debug, warn};

use crate::index::load_index;
use crate::scorer::{weighted_keyword_score, QueryTokens};
use crate::tier::read_chars;

pub const CONTEXT_HEADER: &str = "[Memory Context for Subagent]";

/// Render the top matching topic files for a task prompt, or `None` when
/// nothing qualifies.
pub fn build_subagent_context(task_prompt: &str, config: &MemhookConfig) -> Option<String> {
    let settings = &config.context;
    if task_prompt.chars().count() < settings.min_prompt_chars {
        return None;
    }
    let tokens = QueryTokens::from_prompt(task_prompt, config.scoring.min_token_len);
    if tokens.is_empty() {
        return None;
    }

    let entries = load_index(&config.paths.index_file);
    let mut scored: Vec<(f64, _)> = entries
        .iter()
        .map(|entry| (weighted_keyword_score(entry, &tokens, &config.scoring), entry))
        .filter(|(score, _)| *score >= config.scoring.min_score)
        .collect();
    scored.sort_by(|a, b| b.0.total_cmp(&a.0));
    scored.truncate(settings.max_files);

    let mut parts = vec![CONTEXT_HEADER.to_string()];
    for (score, entry) in scored {
        let path = config.paths.memory_dir.join(&entry.file);
        if !path.exists() {
            continue;
        }
        match read_chars(&path, settings.max_chars_per_file) {
            Ok(content) => {
                parts.push(format!("\n--- {} (relevance: {:.1}) ---", entry.name, score));
                parts.push(content);
            }
            Err(e) => warn!("Cannot read {}: {}", path.display(), e),
        }
    }

    if parts.len() == 1 {
        return None;
    }
    debug!("Subagent context with {} files", (parts.len() - 1) / 2);
    Some(parts.join("\n"))
}
