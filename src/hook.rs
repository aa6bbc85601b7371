//! Hook payloads and the handlers behind each subcommand.
//!
//! Payloads arrive as JSON on stdin. Unknown fields are ignored and missing
//! ones default to empty, so a partial payload degrades to a no-op.

use anyhow::Context;
use memhook_core::{now_secs, MemhookConfig};
use memhook_recall::{
    build_subagent_context, cleanup_warm_files, clear_previous_result, record_touch, run_search,
    SearchOutcome, StateStores, TouchEvent, TouchOutcome,
};
use serde::Deserialize;
use std::io::Read;
use tracing::info;

/// Prompt submission and subagent start.
#[derive(Debug, Default, Deserialize)]
pub struct PromptPayload {
    #[serde(default)]
    pub prompt: String,
    #[serde(default)]
    pub task_prompt: String,
}

impl PromptPayload {
    /// Subagent task text: `task_prompt`, else `prompt`.
    pub fn task_text(&self) -> &str {
        if self.task_prompt.is_empty() {
            &self.prompt
        } else {
            &self.task_prompt
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct ToolInput {
    #[serde(default)]
    pub file_path: String,
}

/// A completed tool call.
#[derive(Debug, Default, Deserialize)]
pub struct ToolPayload {
    #[serde(default)]
    pub tool_name: String,
    #[serde(default)]
    pub tool_input: ToolInput,
}

impl ToolPayload {
    pub fn into_event(self, at: f64) -> TouchEvent {
        TouchEvent::new(self.tool_name, self.tool_input.file_path, at)
    }
}

pub fn parse_payload<T: for<'de> Deserialize<'de>>(raw: &str) -> anyhow::Result<T> {
    serde_json::from_str(raw).context("Invalid hook payload")
}

pub fn read_stdin() -> anyhow::Result<String> {
    let mut raw = String::new();
    std::io::stdin()
        .read_to_string(&mut raw)
        .context("Failed to read hook payload from stdin")?;
    Ok(raw)
}

/// Flag value if given, otherwise the payload read lazily from `stdin`.
fn prompt_or_payload(
    flag: Option<String>,
    stdin: impl FnOnce() -> anyhow::Result<String>,
) -> anyhow::Result<PromptPayload> {
    match flag {
        Some(prompt) => Ok(PromptPayload { prompt, ..PromptPayload::default() }),
        None => parse_payload(&stdin()?),
    }
}

pub fn search(
    prompt: Option<String>,
    stdin: impl FnOnce() -> anyhow::Result<String>,
    config: &MemhookConfig,
) -> anyhow::Result<SearchOutcome> {
    // A stale result must not outlive an unreadable payload.
    clear_previous_result(&config.paths.result_file);
    let payload = prompt_or_payload(prompt, stdin)?;
    let stores = StateStores::from_paths(&config.paths);
    Ok(run_search(&payload.prompt, config, &stores, now_secs()))
}

pub fn touch(
    tool: Option<String>,
    file: Option<String>,
    stdin: impl FnOnce() -> anyhow::Result<String>,
    config: &MemhookConfig,
) -> anyhow::Result<TouchOutcome> {
    let now = now_secs();
    let event = match (tool, file) {
        (Some(tool), Some(file)) => TouchEvent::new(tool, file, now),
        _ => parse_payload::<ToolPayload>(&stdin()?)?.into_event(now),
    };
    let stores = StateStores::from_paths(&config.paths);
    Ok(record_touch(&event, config, &stores))
}

pub fn context(
    prompt: Option<String>,
    stdin: impl FnOnce() -> anyhow::Result<String>,
    config: &MemhookConfig,
) -> anyhow::Result<Option<String>> {
    let payload = prompt_or_payload(prompt, stdin)?;
    Ok(build_subagent_context(payload.task_text(), config))
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PruneReport {
    pub tracking_dropped: usize,
    pub warm_removed: usize,
}

pub fn prune(config: &MemhookConfig) -> PruneReport {
    let stores = StateStores::from_paths(&config.paths);
    let report = PruneReport {
        tracking_dropped: stores.tracking.prune(now_secs(), config.tracking.retention_secs),
        warm_removed: cleanup_warm_files(&config.paths.memory_dir),
    };
    info!(
        "Pruned {} tracking records, removed {} warm excerpts",
        report.tracking_dropped, report.warm_removed
    );
    report
}
