//! Vector Index Port - Nearest-neighbour search over message embeddings.
//!
//! Failures here are never fatal to a command; callers fall back to recent
//! messages and flag the answer as degraded.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::foundation::{ConversationId, UserId};
use crate::domain::retrieval::VectorHit;

/// A semantic search request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VectorQuery {
    pub text: String,
    /// Only messages from this user's conversations are searched
    pub user_id: UserId,
    /// Restricts the search to one conversation
    pub conversation_id: Option<ConversationId>,
    pub top_k: usize,
}

impl VectorQuery {
    /// Search across all of a user's conversations.
    pub fn across_conversations(text: impl Into<String>, user_id: UserId, top_k: usize) -> Self {
        Self {
            text: text.into(),
            user_id,
            conversation_id: None,
            top_k,
        }
    }

    /// Search within a single conversation.
    pub fn within(
        text: impl Into<String>,
        user_id: UserId,
        conversation_id: ConversationId,
        top_k: usize,
    ) -> Self {
        Self {
            text: text.into(),
            user_id,
            conversation_id: Some(conversation_id),
            top_k,
        }
    }
}

/// Port for semantic search.
#[async_trait]
pub trait VectorIndex: Send + Sync {
    /// Returns up to `top_k` hits, best first.
    async fn search(&self, query: VectorQuery) -> Result<Vec<VectorHit>, VectorIndexError>;
}

/// Vector index errors.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum VectorIndexError {
    #[error("vector index unavailable: {0}")]
    Unavailable(String),

    #[error("invalid vector query: {0}")]
    InvalidQuery(String),
}
