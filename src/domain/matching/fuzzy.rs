//! Token-based fuzzy name matching with confidence scores.
//!
//! Query tokens are walked in order against candidate tokens with a moving
//! cursor. Middle initials ("F.") are skipped for free, other unmatched
//! candidate tokens cost a penalty, and a one-letter query token never
//! prefix-matches a longer name, so "John K" does not match
//! "John F. Kennedy".

use serde::{Deserialize, Serialize};

/// Score lost for each non-initial candidate token skipped mid-match.
pub const SKIP_PENALTY: f64 = 0.1;

/// Score lost for each candidate token left after the last query token.
pub const TRAILING_PENALTY: f64 = 0.05;

/// Shortest token allowed to prefix-match a longer one.
const MIN_PREFIX_LEN: usize = 2;

/// Cut-offs that turn scores into a resolution.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FuzzyThresholds {
    /// Top two scores closer than this are ambiguous
    pub epsilon: f64,
    /// A best score below this is ambiguous
    pub floor: f64,
    /// Candidates below this are never offered
    pub min_score: f64,
}

impl Default for FuzzyThresholds {
    fn default() -> Self {
        Self {
            epsilon: 0.1,
            floor: 0.6,
            min_score: 0.3,
        }
    }
}

/// A candidate with its match score.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredMatch<T> {
    pub candidate: T,
    pub score: f64,
}

/// Outcome of resolving a name against candidates.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution<T> {
    /// One clear winner.
    Resolved(ScoredMatch<T>),
    /// The user must choose; best first.
    Ambiguous(Vec<ScoredMatch<T>>),
    /// Nothing matched.
    NotFound,
}

/// Lowercases and splits on whitespace.
pub fn tokenize(name: &str) -> Vec<String> {
    name.split_whitespace().map(str::to_lowercase).collect()
}

fn normalize(token: &str) -> &str {
    token.trim_matches(|c: char| !c.is_alphanumeric())
}

/// Returns true for a middle initial such as "f" or "f.".
pub fn is_initial(token: &str) -> bool {
    let stripped = token.strip_suffix('.').unwrap_or(token);
    let mut chars = stripped.chars();
    matches!((chars.next(), chars.next()), (Some(c), None) if c.is_alphabetic())
}

/// Quality of a single token match, if the tokens match at all.
fn token_quality(query: &str, candidate: &str) -> Option<f64> {
    let (q, c) = (normalize(query), normalize(candidate));
    if q.is_empty() || c.is_empty() {
        return None;
    }
    if q == c {
        return Some(1.0);
    }

    let (shorter, longer) = if q.chars().count() <= c.chars().count() {
        (q, c)
    } else {
        (c, q)
    };
    let shorter_len = shorter.chars().count();
    if shorter_len >= MIN_PREFIX_LEN && longer.starts_with(shorter) {
        let ratio = shorter_len as f64 / longer.chars().count() as f64;
        Some(0.7 + 0.3 * ratio)
    } else {
        None
    }
}

/// Scores `query` against `candidate`; `None` if it does not match.
///
/// # Examples
///
/// ```
/// use command_orchestrator::domain::matching::match_score;
///
/// assert!(match_score("John Kennedy", "John F. Kennedy").is_some());
/// assert!(match_score("John Kennedy", "John Fitzgerald Kennedy").is_some());
/// assert!(match_score("John K", "John F. Kennedy").is_none());
/// ```
pub fn match_score(query: &str, candidate: &str) -> Option<f64> {
    let query_tokens = tokenize(query);
    let candidate_tokens = tokenize(candidate);
    if query_tokens.is_empty() || candidate_tokens.len() < query_tokens.len() {
        return None;
    }

    let mut cursor = 0;
    let mut quality_sum = 0.0;
    let mut skipped = 0usize;

    for query_token in &query_tokens {
        let mut matched = None;
        while cursor < candidate_tokens.len() {
            let candidate_token = &candidate_tokens[cursor];
            cursor += 1;
            if let Some(quality) = token_quality(query_token, candidate_token) {
                matched = Some(quality);
                break;
            }
            if !is_initial(candidate_token) {
                skipped += 1;
            }
        }
        quality_sum += matched?;
    }

    let trailing = candidate_tokens.len() - cursor;
    let mean = quality_sum / query_tokens.len() as f64;
    let score = mean - SKIP_PENALTY * skipped as f64 - TRAILING_PENALTY * trailing as f64;
    Some(score.clamp(0.0, 1.0))
}

/// Resolves a name against candidates.
pub fn resolve<T, F>(
    query: &str,
    candidates: impl IntoIterator<Item = T>,
    name_of: F,
    thresholds: &FuzzyThresholds,
) -> Resolution<T>
where
    F: Fn(&T) -> &str,
{
    let mut matches: Vec<ScoredMatch<T>> = candidates
        .into_iter()
        .filter_map(|candidate| {
            match_score(query, name_of(&candidate)).map(|score| ScoredMatch { candidate, score })
        })
        .collect();

    if matches.is_empty() {
        return Resolution::NotFound;
    }
    matches.sort_by(|a, b| b.score.total_cmp(&a.score));

    let best = matches[0].score;
    let too_close = matches.get(1).is_some_and(|second| best - second.score < thresholds.epsilon);

    if !too_close && best >= thresholds.floor {
        return Resolution::Resolved(matches.swap_remove(0));
    }

    matches.retain(|m| m.score >= thresholds.min_score);
    if matches.is_empty() {
        Resolution::NotFound
    } else {
        Resolution::Ambiguous(matches)
    }
}
