//! In-Memory Vector Index
//!
//! Stands in for an embedding index in development and tests. Messages are
//! embedded as term-frequency vectors and ranked by cosine similarity, so
//! results are deterministic. The index can be switched off to exercise the
//! degraded retrieval paths.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::domain::retrieval::VectorHit;
use crate::ports::{VectorIndex, VectorIndexError, VectorQuery};

use super::InMemoryConversationStore;

const STOPWORDS: [&str; 24] = [
    "a", "an", "and", "are", "at", "did", "do", "does", "for", "i", "in", "is", "it", "me", "my",
    "of", "on", "or", "the", "to", "was", "we", "what", "you",
];

/// Lexical stand-in for a semantic index over an in-memory store.
#[derive(Debug, Clone)]
pub struct InMemoryVectorIndex {
    store: InMemoryConversationStore,
    available: Arc<AtomicBool>,
}

impl InMemoryVectorIndex {
    pub fn new(store: InMemoryConversationStore) -> Self {
        Self {
            store,
            available: Arc::new(AtomicBool::new(true)),
        }
    }

    /// Turns the index on or off. Searches fail while it is off.
    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    pub fn is_available(&self) -> bool {
        self.available.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl VectorIndex for InMemoryVectorIndex {
    async fn search(&self, query: VectorQuery) -> Result<Vec<VectorHit>, VectorIndexError> {
        if !self.is_available() {
            return Err(VectorIndexError::Unavailable(
                "in-memory index switched off".to_string(),
            ));
        }
        let query_vec = embed(&query.text);
        if query_vec.is_empty() {
            return Err(VectorIndexError::InvalidQuery(
                "query has no searchable terms".to_string(),
            ));
        }

        let candidates = match &query.conversation_id {
            Some(conversation_id) => self.store.messages_in(conversation_id).await,
            None => self.store.messages_visible_to(&query.user_id).await,
        };

        let mut hits: Vec<VectorHit> = candidates
            .into_iter()
            .filter_map(|message| {
                let score = cosine_similarity(&query_vec, &embed(&message.content));
                (score > 0.0).then_some(VectorHit { message, score })
            })
            .collect();

        hits.sort_by(|a, b| {
            b.score
                .total_cmp(&a.score)
                .then_with(|| b.message.sent_at.cmp(&a.message.sent_at))
        });
        hits.truncate(query.top_k);
        Ok(hits)
    }
}

/// Term-frequency vector of the content words in `text`.
fn embed(text: &str) -> HashMap<String, f64> {
    let mut vector = HashMap::new();
    for term in text
        .split(|c: char| !c.is_alphanumeric())
        .map(str::to_lowercase)
        .filter(|t| t.len() > 1 && !STOPWORDS.contains(&t.as_str()))
    {
        *vector.entry(term).or_insert(0.0) += 1.0;
    }
    vector
}

fn cosine_similarity(a: &HashMap<String, f64>, b: &HashMap<String, f64>) -> f64 {
    let dot: f64 = a
        .iter()
        .filter_map(|(term, weight)| b.get(term).map(|other| weight * other))
        .sum();
    let norm_a = a.values().map(|w| w * w).sum::<f64>().sqrt();
    let norm_b = b.values().map(|w| w * w).sum::<f64>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        0.0
    } else {
        (dot / (norm_a * norm_b)).clamp(0.0, 1.0)
    }
}
