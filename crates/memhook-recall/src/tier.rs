//! Disclosure tiers: how much of a matched topic file to surface.
//!
//! HOT files are referenced in full, WARM files get their leading section
//! written to a sibling `.warm` excerpt, COLD files are emitted in full
//! unless `tiers.suppress_cold` is set.

use memhook_core::config::TierConfig;
use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::store::write_atomic;

pub const WARM_SUFFIX: &str = "warm";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tier {
    Hot,
    Warm,
    Cold,
}

impl Tier {
    pub fn for_attention(attention: f64, config: &TierConfig) -> Self {
        if attention >= config.hot_threshold {
            Tier::Hot
        } else if attention >= config.warm_threshold {
            Tier::Warm
        } else {
            Tier::Cold
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Tier::Hot => "hot",
            Tier::Warm => "warm",
            Tier::Cold => "cold",
        }
    }
}

impl std::fmt::Display for Tier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What gets handed to the consumer for one matched file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Disclosure {
    Full { path: PathBuf },
    Excerpt { path: PathBuf, source: PathBuf },
    Omitted,
}

impl Disclosure {
    /// Path written into the result artifact, if anything is emitted.
    pub fn path(&self) -> Option<&Path> {
        match self {
            Disclosure::Full { path } | Disclosure::Excerpt { path, .. } => Some(path.as_path()),
            Disclosure::Omitted => None,
        }
    }
}

/// Everything from the top of `content` up to, not including, the second
/// `## ` heading, capped at `max_chars`. `None` when nothing is left.
pub fn extract_leading_section(content: &str, max_chars: usize) -> Option<String> {
    let mut section = String::new();
    let mut headings = 0;
    for line in content.split_inclusive('\n') {
        if line.starts_with("## ") {
            headings += 1;
            if headings == 2 {
                break;
            }
        }
        section.push_str(line);
    }

    let trimmed = section.trim_end();
    if trimmed.is_empty() {
        return None;
    }
    Some(trimmed.chars().take(max_chars).collect())
}

/// Read at most `cap` bytes of a file. A multibyte character cut by the
/// cap is dropped rather than replaced.
pub fn read_capped(path: &Path, cap: usize) -> std::io::Result<String> {
    let mut buf = Vec::new();
    fs::File::open(path)?.take(cap as u64).read_to_end(&mut buf)?;
    match String::from_utf8(buf) {
        Ok(text) => Ok(text),
        Err(e) => {
            let utf8 = e.utf8_error();
            let mut bytes = e.into_bytes();
            if utf8.error_len().is_none() {
                bytes.truncate(utf8.valid_up_to());
            }
            Ok(String::from_utf8_lossy(&bytes).into_owned())
        }
    }
}

/// First `max_chars` characters of a file. Reads at most four bytes per character.
pub fn read_chars(path: &Path, max_chars: usize) -> std::io::Result<String> {
    let text = read_capped(path, max_chars.saturating_mul(4))?;
    Ok(text.chars().take(max_chars).collect())
}

/// `topic.md` → `topic.md.warm`
pub fn warm_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".");
    name.push(WARM_SUFFIX);
    path.with_file_name(name)
}

fn warm_excerpt(path: &Path, config: &TierConfig) -> Option<PathBuf> {
    let content = match read_capped(path, config.excerpt_read_cap) {
        Ok(c) => c,
        Err(e) => {
            warn!("Cannot read {} for excerpt: {}", path.display(), e);
            return None;
        }
    };
    let excerpt = extract_leading_section(&content, config.excerpt_max_chars)?;
    let target = warm_path(path);
    match write_atomic(&target, &excerpt) {
        Ok(()) => Some(target),
        Err(e) => {
            warn!("{}", e);
            None
        }
    }
}

/// Render a matched file at the given tier. WARM falls back to the full
/// file when no excerpt can be produced.
pub fn disclose(tier: Tier, path: &Path, config: &TierConfig) -> Disclosure {
    let full = || Disclosure::Full { path: path.to_path_buf() };
    match tier {
        Tier::Hot => full(),
        Tier::Warm => match warm_excerpt(path, config) {
            Some(excerpt) => Disclosure::Excerpt {
                path: excerpt,
                source: path.to_path_buf(),
            },
            None => full(),
        },
        Tier::Cold if config.suppress_cold => Disclosure::Omitted,
        Tier::Cold => full(),
    }
}

/// Delete every `*.warm` excerpt in `memory_dir`. Returns how many went.
pub fn cleanup_warm_files(memory_dir: &Path) -> usize {
    let entries = match fs::read_dir(memory_dir) {
        Ok(e) => e,
        Err(_) => return 0,
    };
    let mut removed = 0;
    for entry in entries.filter_map(|e| e.ok()) {
        let path = entry.path();
        let is_warm = path.is_file() && path.extension().and_then(|e| e.to_str()) == Some(WARM_SUFFIX);
        if is_warm && fs::remove_file(&path).is_ok() {
            removed += 1;
        }
    }
    debug!("Removed {} warm excerpts from {}", removed, memory_dir.display());
    removed
}
