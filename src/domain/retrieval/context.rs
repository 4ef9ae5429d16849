//! Context assembly for retrieval-augmented answers.
//!
//! Semantic hits are the primary context. When there are too few of them
//! the most recent raw messages fill in, and when the index is down the
//! recent messages are all there is.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::domain::messaging::Message;

/// A message returned by nearest-neighbour search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VectorHit {
    pub message: Message,
    /// Similarity to the query; higher is closer
    pub score: f64,
}

/// Knobs for single-conversation retrieval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrievalSettings {
    /// Nearest neighbours to request
    pub top_k: usize,
    /// Below this many hits, recent messages are merged in
    pub min_hits: usize,
    /// Recent messages used to supplement or replace hits
    pub recent_limit: usize,
}

impl Default for RetrievalSettings {
    fn default() -> Self {
        Self {
            top_k: 10,
            min_hits: 3,
            recent_limit: 20,
        }
    }
}

/// Messages handed to the extraction step.
#[derive(Debug, Clone, PartialEq)]
pub struct RetrievedContext {
    /// Chronological, unique by id
    pub messages: Vec<Message>,
    /// Semantic hits contributed to the context
    pub used_rag: bool,
    /// The vector index was unavailable
    pub retrieval_degraded: bool,
}

impl RetrievedContext {
    /// Builds context from semantic hits, topping up with recent messages
    /// when there are fewer than `min_hits`.
    pub fn from_hits(hits: Vec<VectorHit>, recent: Vec<Message>, settings: &RetrievalSettings) -> Self {
        let used_rag = !hits.is_empty();
        let sparse = hits.len() < settings.min_hits;

        let mut messages: Vec<Message> = hits.into_iter().map(|hit| hit.message).collect();
        if sparse {
            messages.extend(recent);
        }

        Self {
            messages: chronological_unique(messages),
            used_rag,
            retrieval_degraded: false,
        }
    }

    /// Builds context from recent messages alone after an index failure.
    pub fn degraded(recent: Vec<Message>) -> Self {
        Self {
            messages: chronological_unique(recent),
            used_rag: false,
            retrieval_degraded: true,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Returns true if a message id is part of the context.
    pub fn contains(&self, id: &str) -> bool {
        self.messages.iter().any(|m| m.id.as_str() == id)
    }

    /// Renders the context as a transcript.
    pub fn transcript(&self) -> String {
        self.messages
            .iter()
            .map(Message::transcript_line)
            .collect::<Vec<_>>()
            .join("\n")
    }
}

fn chronological_unique(messages: Vec<Message>) -> Vec<Message> {
    let mut seen = HashSet::new();
    let mut unique: Vec<Message> = messages
        .into_iter()
        .filter(|m| seen.insert(m.id.clone()))
        .collect();
    unique.sort_by(|a, b| a.sent_at.cmp(&b.sent_at).then_with(|| a.id.cmp(&b.id)));
    unique
}
