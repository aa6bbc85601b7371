//! Multi-signal relevance scoring.
//!
//! `score = keyword × (importance / 5) + recency + attention × 3 + coactivation`
//!
//! Ranking runs in two stages. The provisional pass scores without
//! co-activation and picks a small candidate pool; the final pass rewards
//! entries that are historically used together with that pool.

use memhook_core::config::{RecencyStep, ScoringConfig};
use memhook_core::{AccessLog, AttentionState, CoactivationPairs, Entry, PairKey};
use std::collections::BTreeSet;
use tracing::debug;

// ============================================================
// Query tokens
// ============================================================

/// Lowercase alphanumeric runs of the prompt, de-duplicated.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryTokens(BTreeSet<String>);

impl QueryTokens {
    pub fn from_prompt(prompt: &str, min_len: usize) -> Self {
        let lower = prompt.to_lowercase();
        let tokens = lower
            .split(|c: char| !(c.is_ascii_lowercase() || c.is_ascii_digit()))
            .filter(|w| w.len() >= min_len)
            .map(str::to_string)
            .collect();
        Self(tokens)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn contains(&self, token: &str) -> bool {
        self.0.contains(token)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<S: Into<String>> FromIterator<S> for QueryTokens {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

// ============================================================
// Signals
// ============================================================

/// Raw keyword points before the importance multiplier.
///
/// Per token: exact keyword, else the first partial (substring either way)
/// keyword; plus, independently, a hit in the entry name.
pub fn keyword_points(entry: &Entry, tokens: &QueryTokens, config: &ScoringConfig) -> f64 {
    let name = entry.name.to_lowercase();
    let mut points = 0.0;
    for token in tokens.iter() {
        if entry.keywords.iter().any(|kw| kw == token) {
            points += config.exact_points;
        } else if entry
            .keywords
            .iter()
            .any(|kw| kw.contains(token) || token.contains(kw.as_str()))
        {
            points += config.partial_points;
        }
        if name.contains(token) {
            points += config.name_points;
        }
    }
    points
}

/// Keyword points scaled by the entry's importance.
pub fn weighted_keyword_score(entry: &Entry, tokens: &QueryTokens, config: &ScoringConfig) -> f64 {
    keyword_points(entry, tokens, config) * entry.importance_factor()
}

/// Step function of seconds since last access. Never accessed → 0.
pub fn recency_boost(elapsed: Option<f64>, steps: &[RecencyStep]) -> f64 {
    let Some(elapsed) = elapsed else { return 0.0 };
    steps
        .iter()
        .find(|step| elapsed <= step.within_secs)
        .map(|step| step.boost)
        .unwrap_or(0.0)
}

/// `min(cap, log2(count + 1))` summed over every provisional file that
/// has a pair record with `file`.
pub fn coactivation_boost(
    file: &str,
    provisional: &ProvisionalSet,
    pairs: &CoactivationPairs,
    cap: f64,
) -> f64 {
    provisional
        .files()
        .iter()
        .filter(|other| other.as_str() != file)
        .filter_map(|other| pairs.get(&PairKey::new(file, other)))
        .map(|record| ((record.count as f64) + 1.0).log2().min(cap))
        .sum()
}

// ============================================================
// Ranking
// ============================================================

/// Read-only view of the stores a ranking run needs.
#[derive(Debug, Clone, Copy)]
pub struct ScoringContext<'a> {
    pub config: &'a ScoringConfig,
    pub access_log: &'a AccessLog,
    pub attention: &'a AttentionState,
    pub pairs: &'a CoactivationPairs,
    pub now: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ScoreBreakdown {
    /// Keyword points × importance factor.
    pub keyword: f64,
    pub recency: f64,
    pub attention: f64,
    pub coactivation: f64,
}

impl ScoreBreakdown {
    pub fn total(&self) -> f64 {
        self.keyword + self.recency + self.attention + self.coactivation
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScoredEntry {
    pub entry: Entry,
    pub score: f64,
    pub breakdown: ScoreBreakdown,
}

/// Files picked by the provisional pass; the co-activation reference set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProvisionalSet {
    files: Vec<String>,
}

impl ProvisionalSet {
    pub fn new(files: Vec<String>) -> Self {
        Self { files }
    }

    pub fn files(&self) -> &[String] {
        &self.files
    }

    pub fn contains(&self, file: &str) -> bool {
        self.files.iter().any(|f| f == file)
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

/// Every signal except co-activation.
fn base_signals(entry: &Entry, tokens: &QueryTokens, ctx: &ScoringContext<'_>) -> ScoreBreakdown {
    ScoreBreakdown {
        keyword: weighted_keyword_score(entry, tokens, ctx.config),
        recency: recency_boost(ctx.access_log.elapsed(&entry.file, ctx.now), &ctx.config.recency_steps),
        attention: ctx.attention.score_of(&entry.file) * ctx.config.attention_weight,
        coactivation: 0.0,
    }
}

/// Keep entries at or above `floor`, best first, catalog order on ties.
fn select(scored: Vec<ScoredEntry>, floor: f64, limit: usize) -> Vec<ScoredEntry> {
    let mut kept: Vec<ScoredEntry> = scored.into_iter().filter(|s| s.score >= floor).collect();
    kept.sort_by(|a, b| b.score.total_cmp(&a.score));
    kept.truncate(limit);
    kept
}

/// Stage one: no co-activation, low floor, small pool.
pub fn provisional_pass(entries: &[Entry], tokens: &QueryTokens, ctx: &ScoringContext<'_>) -> ProvisionalSet {
    let scored = entries
        .iter()
        .map(|entry| {
            let breakdown = base_signals(entry, tokens, ctx);
            ScoredEntry {
                entry: entry.clone(),
                score: breakdown.total(),
                breakdown,
            }
        })
        .collect();
    let pool = select(scored, ctx.config.provisional_floor, ctx.config.provisional_pool);
    ProvisionalSet::new(pool.into_iter().map(|s| s.entry.file).collect())
}

/// Stage two: full score including co-activation with the provisional set.
pub fn final_pass(
    entries: &[Entry],
    tokens: &QueryTokens,
    ctx: &ScoringContext<'_>,
    provisional: &ProvisionalSet,
) -> Vec<ScoredEntry> {
    let scored = entries
        .iter()
        .map(|entry| {
            let mut breakdown = base_signals(entry, tokens, ctx);
            breakdown.coactivation =
                coactivation_boost(&entry.file, provisional, ctx.pairs, ctx.config.coactivation_cap);
            let score = breakdown.total();
            if score > 0.0 {
                debug!(
                    "{}: keyword={:.2} recency={:.1} attention={:.2} coactivation={:.2} total={:.2}",
                    entry.name,
                    breakdown.keyword,
                    breakdown.recency,
                    breakdown.attention,
                    breakdown.coactivation,
                    score
                );
            }
            ScoredEntry {
                entry: entry.clone(),
                score,
                breakdown,
            }
        })
        .collect();
    select(scored, ctx.config.min_score, ctx.config.max_results)
}

/// Both stages.
pub fn rank(entries: &[Entry], tokens: &QueryTokens, ctx: &ScoringContext<'_>) -> Vec<ScoredEntry> {
    let provisional = provisional_pass(entries, tokens, ctx);
    final_pass(entries, tokens, ctx, &provisional)
}
