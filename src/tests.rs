use crate::hook::{self, parse_payload, PromptPayload, ToolPayload};
use memhook_core::MemhookConfig;
use std::fs;

fn no_stdin() -> anyhow::Result<String> {
    panic!("stdin should not be read when flags are given")
}

fn stdin_of(raw: &'static str) -> impl FnOnce() -> anyhow::Result<String> {
    move || Ok(raw.to_string())
}

fn config_with_catalog(dir: &std::path::Path) -> MemhookConfig {
    let config = MemhookConfig::rooted_at(dir);
    fs::create_dir_all(&config.paths.memory_dir).unwrap();
    fs::write(
        &config.paths.index_file,
        "**Blender MCP** | Active | 3d model stl print mesh | [blender-mcp.md](blender-mcp.md)\n",
    )
    .unwrap();
    fs::write(config.paths.memory_dir.join("blender-mcp.md"), "# Blender MCP\nnotes").unwrap();
    config
}

// ===========================================================================
// Payloads
// ===========================================================================

#[test]
fn prompt_payload_ignores_extra_fields() {
    let p: PromptPayload =
        parse_payload(r#"{"prompt": "fix the stl export", "session_id": "abc", "cwd": "/x"}"#).unwrap();
    assert_eq!(p.prompt, "fix the stl export");
    assert_eq!(p.task_text(), "fix the stl export");
}

#[test]
fn task_prompt_wins_over_prompt() {
    let p: PromptPayload = parse_payload(r#"{"prompt": "outer", "task_prompt": "inner task"}"#).unwrap();
    assert_eq!(p.task_text(), "inner task");
}

#[test]
fn tool_payload_to_event() {
    let p: ToolPayload = parse_payload(
        r#"{"tool_name": "Edit", "tool_input": {"file_path": "/src/lib.rs", "old_string": "a"}}"#,
    )
    .unwrap();
    let event = p.into_event(42.0);
    assert_eq!(event.tool, "Edit");
    assert_eq!(event.file_path, "/src/lib.rs");
    assert_eq!(event.at, 42.0);
}

#[test]
fn tool_payload_without_input_is_empty() {
    let p: ToolPayload = parse_payload(r#"{"tool_name": "Bash"}"#).unwrap();
    assert!(p.tool_input.file_path.is_empty());
}

#[test]
fn malformed_payload_is_an_error() {
    assert!(parse_payload::<PromptPayload>("not json").is_err());
    assert!(parse_payload::<PromptPayload>("").is_err());
}

// ===========================================================================
// Handlers
// ===========================================================================

#[test]
fn search_from_stdin_writes_result() {
    let tmp = tempfile::TempDir::new().unwrap();
    let config = config_with_catalog(tmp.path());

    let outcome = hook::search(None, stdin_of(r#"{"prompt": "export the stl mesh"}"#), &config).unwrap();
    assert_eq!(outcome.selected.len(), 1);
    let result = fs::read_to_string(&config.paths.result_file).unwrap();
    assert!(result.starts_with("Blender MCP|"));
}

#[test]
fn search_flag_skips_stdin() {
    let tmp = tempfile::TempDir::new().unwrap();
    let config = config_with_catalog(tmp.path());
    let outcome = hook::search(Some("stl mesh".into()), no_stdin, &config).unwrap();
    assert_eq!(outcome.selected.len(), 1);
}

#[test]
fn search_with_bad_stdin_fails_softly() {
    let tmp = tempfile::TempDir::new().unwrap();
    let config = config_with_catalog(tmp.path());
    assert!(hook::search(None, stdin_of("{"), &config).is_err());
    assert!(!config.paths.attention_state.exists());
}

#[test]
fn bad_stdin_still_clears_previous_result() {
    let tmp = tempfile::TempDir::new().unwrap();
    let config = config_with_catalog(tmp.path());
    hook::search(Some("stl mesh".into()), no_stdin, &config).unwrap();
    assert!(config.paths.result_file.exists());

    assert!(hook::search(None, stdin_of("not json"), &config).is_err());
    assert!(!config.paths.result_file.exists());
}

#[test]
fn touch_from_stdin_records_file() {
    let tmp = tempfile::TempDir::new().unwrap();
    let config = config_with_catalog(tmp.path());
    let outcome = hook::touch(
        None,
        None,
        stdin_of(r#"{"tool_name": "Read", "tool_input": {"file_path": "/src/main.rs"}}"#),
        &config,
    )
    .unwrap();
    assert!(outcome.tracked);
    assert_eq!(outcome.file_id, "/src/main.rs");
    assert!(config.paths.tracking_log.exists());
}

#[test]
fn touch_flags_skip_stdin() {
    let tmp = tempfile::TempDir::new().unwrap();
    let config = config_with_catalog(tmp.path());
    let outcome = hook::touch(Some("Bash".into()), Some("/x".into()), no_stdin, &config).unwrap();
    assert!(!outcome.tracked);
}

#[test]
fn context_prints_block_for_task() {
    let tmp = tempfile::TempDir::new().unwrap();
    let config = config_with_catalog(tmp.path());
    let block = hook::context(None, stdin_of(r#"{"task_prompt": "print the stl mesh"}"#), &config)
        .unwrap()
        .unwrap();
    assert!(block.starts_with("[Memory Context for Subagent]"));
    assert!(block.contains("notes"));
}

#[test]
fn prune_reports_work_done() {
    let tmp = tempfile::TempDir::new().unwrap();
    let config = config_with_catalog(tmp.path());
    fs::write(config.paths.memory_dir.join("blender-mcp.md.warm"), "excerpt").unwrap();
    fs::write(
        &config.paths.tracking_log,
        "{\"timestamp\": 1.0, \"tool\": \"Read\", \"file_path\": \"/ancient.rs\"}\n",
    )
    .unwrap();

    let report = hook::prune(&config);
    assert_eq!(report.tracking_dropped, 1);
    assert_eq!(report.warm_removed, 1);
    assert!(config.paths.memory_dir.join("blender-mcp.md").exists());
}
