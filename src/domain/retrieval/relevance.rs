//! Cross-conversation relevance scoring.
//!
//! Hits from a user-wide search are grouped by conversation. Each
//! conversation gets a relevance (best hit score) and a recency (age of its
//! newest hit), blended into a composite that decides whether to answer
//! directly or ask the user which conversation they meant.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::domain::foundation::{ConversationId, Timestamp};
use crate::domain::messaging::ConversationSummary;

use super::VectorHit;

/// Knobs for cross-conversation resolution.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RelevanceSettings {
    /// Nearest neighbours to request across all conversations
    pub top_k: usize,
    /// Hits older than this are ignored; 0 means no limit
    pub window_hours: u64,
    pub relevance_weight: f64,
    pub recency_weight: f64,
    /// Composite score a conversation needs to qualify
    pub qualification_threshold: f64,
    /// Most conversations offered in a clarification
    pub max_options: usize,
}

impl Default for RelevanceSettings {
    fn default() -> Self {
        Self {
            top_k: 50,
            window_hours: 48,
            relevance_weight: 0.7,
            recency_weight: 0.3,
            qualification_threshold: 0.5,
            max_options: 5,
        }
    }
}

impl RelevanceSettings {
    /// Returns a copy with a different time window.
    pub fn with_window_hours(mut self, window_hours: u64) -> Self {
        self.window_hours = window_hours;
        self
    }
}

/// Score of one conversation for a query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationScore {
    pub conversation_id: ConversationId,
    pub relevance: f64,
    pub recency: f64,
    pub composite: f64,
    /// Content of the best-scoring hit
    pub snippet: String,
    /// Time of the newest hit
    pub last_activity: Timestamp,
}

/// What to do with the scored conversations.
#[derive(Debug, Clone, PartialEq)]
pub enum RelevanceDecision {
    /// Exactly one conversation qualifies.
    Single(ConversationScore),
    /// Several qualify; best first, capped.
    Multiple(Vec<ConversationScore>),
    /// None qualifies.
    None,
}

/// Recency in [0, 1] for something `age_hours` old.
///
/// Linear decay across a window, or a one-day half-life style decay when
/// the window is unlimited.
pub fn recency_score(age_hours: f64, window_hours: u64) -> f64 {
    let age = age_hours.max(0.0);
    if window_hours == 0 {
        1.0 / (1.0 + age / 24.0)
    } else {
        (1.0 - age / window_hours as f64).clamp(0.0, 1.0)
    }
}

/// Groups hits by conversation and scores each group, best first.
pub fn score_conversations(
    hits: &[VectorHit],
    now: &Timestamp,
    settings: &RelevanceSettings,
) -> Vec<ConversationScore> {
    let mut groups: HashMap<&ConversationId, Vec<&VectorHit>> = HashMap::new();
    for hit in hits {
        let age = hit.message.sent_at.hours_before(now);
        if settings.window_hours > 0 && age > settings.window_hours as f64 {
            continue;
        }
        groups.entry(&hit.message.conversation_id).or_default().push(hit);
    }

    let mut scores: Vec<ConversationScore> = groups
        .into_iter()
        .filter_map(|(conversation_id, group)| {
            let best = group.iter().max_by(|a, b| a.score.total_cmp(&b.score))?;
            let newest = group.iter().map(|h| h.message.sent_at).max()?;

            let relevance = best.score.clamp(0.0, 1.0);
            let recency = recency_score(newest.hours_before(now), settings.window_hours);
            Some(ConversationScore {
                conversation_id: conversation_id.clone(),
                relevance,
                recency,
                composite: settings.relevance_weight * relevance + settings.recency_weight * recency,
                snippet: best.message.content.clone(),
                last_activity: newest,
            })
        })
        .collect();

    sort_best_first(&mut scores);
    scores
}

/// Scores conversations on recency alone, for when search is unavailable.
pub fn recency_only(
    conversations: &[ConversationSummary],
    now: &Timestamp,
    settings: &RelevanceSettings,
) -> Vec<ConversationScore> {
    let mut scores: Vec<ConversationScore> = conversations
        .iter()
        .filter(|c| {
            settings.window_hours == 0
                || c.last_activity.hours_before(now) <= settings.window_hours as f64
        })
        .map(|c| {
            let recency = recency_score(c.last_activity.hours_before(now), settings.window_hours);
            ConversationScore {
                conversation_id: c.id.clone(),
                relevance: 0.0,
                recency,
                composite: recency,
                snippet: c.last_message_preview.clone().unwrap_or_default(),
                last_activity: c.last_activity,
            }
        })
        .collect();

    sort_best_first(&mut scores);
    scores.truncate(settings.max_options);
    scores
}

/// Applies the qualification threshold.
pub fn decide(scores: Vec<ConversationScore>, settings: &RelevanceSettings) -> RelevanceDecision {
    let mut qualified: Vec<ConversationScore> = scores
        .into_iter()
        .filter(|s| s.composite >= settings.qualification_threshold)
        .collect();
    sort_best_first(&mut qualified);

    match qualified.len() {
        0 => RelevanceDecision::None,
        1 => RelevanceDecision::Single(qualified.remove(0)),
        _ => {
            qualified.truncate(settings.max_options);
            RelevanceDecision::Multiple(qualified)
        }
    }
}

fn sort_best_first(scores: &mut [ConversationScore]) {
    scores.sort_by(|a, b| {
        b.composite
            .total_cmp(&a.composite)
            .then_with(|| b.last_activity.cmp(&a.last_activity))
            .then_with(|| a.conversation_id.cmp(&b.conversation_id))
    });
}
