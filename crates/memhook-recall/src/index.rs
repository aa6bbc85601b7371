//! Catalog parser: `MEMORY.md` rows into [`Entry`] records.
//!
//! Two row layouts are accepted:
//!
//! ```text
//! **Name** | Status | 9 | keyword keyword | [label](file.md)
//! **Name** | Status | keyword keyword | [label](file.md)
//! ```
//!
//! The five-field layout is matched first. A four-field match that starts
//! where a five-field match started is the same row and is skipped.

use memhook_core::{Entry, DEFAULT_IMPORTANCE};
use regex::Regex;
use std::collections::HashSet;
use std::path::Path;
use std::sync::OnceLock;
use tracing::debug;

const FIVE_FIELD: &str =
    r"\*\*(.+?)\*\*\s*\|\s*(\w[\w\s]*?)\s*\|\s*(\d{1,2})\s*\|\s*(.+?)\s*\|\s*\[(.+?)\]\((.+?)\)";
const FOUR_FIELD: &str = r"\*\*(.+?)\*\*\s*\|\s*(\w[\w\s]*?)\s*\|\s*(.+?)\s*\|\s*\[(.+?)\]\((.+?)\)";

fn five_field() -> Option<&'static Regex> {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    RE.get_or_init(|| Regex::new(FIVE_FIELD).ok()).as_ref()
}

fn four_field() -> Option<&'static Regex> {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    RE.get_or_init(|| Regex::new(FOUR_FIELD).ok()).as_ref()
}

fn split_keywords(raw: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    raw.split_whitespace()
        .map(str::to_lowercase)
        .filter(|k| seen.insert(k.clone()))
        .collect()
}

/// Parse catalog text. Rows that match neither layout are ignored.
/// Entries come back in catalog order.
pub fn parse_index(content: &str) -> Vec<Entry> {
    let (Some(five), Some(four)) = (five_field(), four_field()) else {
        return Vec::new();
    };
    let mut rows: Vec<(usize, Entry)> = Vec::new();
    let mut five_field_starts = HashSet::new();

    for caps in five.captures_iter(content) {
        let Some(whole) = caps.get(0) else { continue };
        five_field_starts.insert(whole.start());
        let importance = caps[3].parse::<u32>().map(Entry::clamp_importance).unwrap_or(DEFAULT_IMPORTANCE);
        rows.push((
            whole.start(),
            Entry {
                name: caps[1].trim().to_string(),
                status: caps[2].trim().to_string(),
                importance,
                keywords: split_keywords(&caps[4]),
                file: caps[6].trim().to_string(),
            },
        ));
    }

    for caps in four.captures_iter(content) {
        let Some(whole) = caps.get(0) else { continue };
        if five_field_starts.contains(&whole.start()) {
            continue;
        }
        rows.push((
            whole.start(),
            Entry {
                name: caps[1].trim().to_string(),
                status: caps[2].trim().to_string(),
                importance: DEFAULT_IMPORTANCE,
                keywords: split_keywords(&caps[3]),
                file: caps[5].trim().to_string(),
            },
        ));
    }

    rows.sort_by_key(|(start, _)| *start);
    rows.into_iter().map(|(_, entry)| entry).collect()
}

/// Read and parse the catalog. A missing or unreadable catalog is empty.
pub fn load_index(path: &Path) -> Vec<Entry> {
    match std::fs::read_to_string(path) {
        Ok(content) => {
            let entries = parse_index(&content);
            debug!("Parsed {} catalog entries from {}", entries.len(), path.display());
            entries
        }
        Err(e) => {
            debug!("No catalog at {}: {}", path.display(), e);
            Vec::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CATALOG: &str = "# Test Memory Index

## Project Index

**Blender MCP** | Active | 3d model stl print hobbit house mesh addon | [blender-mcp.md](blender-mcp.md)
**Image Dedup** | Complete | duplicate photos hash perceptual GUI scan | [image-dedup.md](image-dedup.md)
**High Priority** | Active | 9 | critical urgent important | [high-priority.md](high-priority.md)
";

    fn by_name<'a>(entries: &'a [Entry], name: &str) -> &'a Entry {
        entries.iter().find(|e| e.name == name).unwrap()
    }

    #[test]
    fn four_field_row_defaults_importance() {
        let entries = parse_index(CATALOG);
        let blender = by_name(&entries, "Blender MCP");
        assert_eq!(blender.importance, 5);
        assert_eq!(blender.status, "Active");
        assert!(blender.keywords.contains(&"stl".to_string()));
        assert_eq!(blender.file, "blender-mcp.md");
    }

    #[test]
    fn five_field_row_reads_importance() {
        let entries = parse_index(CATALOG);
        let hp = by_name(&entries, "High Priority");
        assert_eq!(hp.importance, 9);
        assert_eq!(hp.keywords, vec!["critical", "urgent", "important"]);
        assert_eq!(hp.file, "high-priority.md");
    }

    #[test]
    fn five_field_row_is_not_duplicated() {
        let entries = parse_index(CATALOG);
        assert_eq!(entries.len(), 3);
        assert_eq!(entries.iter().filter(|e| e.name == "High Priority").count(), 1);
    }

    #[test]
    fn entries_keep_catalog_order() {
        let entries = parse_index(CATALOG);
        let names: Vec<&str> = entries.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["Blender MCP", "Image Dedup", "High Priority"]);
    }

    #[test]
    fn importance_is_clamped() {
        let text = "**Zero** | Active | 0 | alpha | [z](z.md)\n**Huge** | Active | 99 | beta | [h](h.md)\n";
        let entries = parse_index(text);
        assert_eq!(by_name(&entries, "Zero").importance, 1);
        assert_eq!(by_name(&entries, "Huge").importance, 10);
    }

    #[test]
    fn keywords_are_lowercased() {
        let entries = parse_index(CATALOG);
        let dedup = by_name(&entries, "Image Dedup");
        assert!(dedup.keywords.contains(&"gui".to_string()));
        assert!(!dedup.keywords.contains(&"GUI".to_string()));
    }

    #[test]
    fn malformed_rows_are_ignored() {
        let text = "**No Link** | Active | words here\nplain text | not | a row\n";
        assert!(parse_index(text).is_empty());
    }

    #[test]
    fn missing_catalog_is_empty() {
        let tmp = tempfile::TempDir::new().unwrap();
        assert!(load_index(&tmp.path().join("MEMORY.md")).is_empty());
    }
}
