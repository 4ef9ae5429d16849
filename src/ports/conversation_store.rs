//! Conversation Store Port - Reads and writes conversation records.
//!
//! Backed by whatever the messaging app persists to. Writes are eventually
//! visible to the vector index; callers must not assume a just-created
//! message is searchable.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::foundation::{ConversationId, Timestamp, UserId, ValidationError};
use crate::domain::messaging::{ConversationSort, ConversationSummary, Message};

/// Port for the conversation and message store.
#[async_trait]
pub trait ConversationStore: Send + Sync {
    /// Lists the conversations `user_id` takes part in.
    async fn list_conversations(
        &self,
        user_id: &UserId,
        sort: ConversationSort,
        limit: usize,
    ) -> Result<Vec<ConversationSummary>, StoreError>;

    /// Loads one conversation.
    async fn get_conversation(
        &self,
        conversation_id: &ConversationId,
    ) -> Result<Option<ConversationSummary>, StoreError>;

    /// Returns up to `limit` of the newest messages sent before `before`
    /// (or before now), oldest first.
    async fn get_messages(
        &self,
        conversation_id: &ConversationId,
        limit: usize,
        before: Option<Timestamp>,
    ) -> Result<Vec<Message>, StoreError>;

    /// Appends a message to a conversation.
    async fn create_message(
        &self,
        conversation_id: &ConversationId,
        sender_id: &UserId,
        content: &str,
    ) -> Result<Message, StoreError>;

    /// Returns the one-to-one conversation between two users, creating it if
    /// none exists yet.
    async fn open_direct_conversation(
        &self,
        user_id: &UserId,
        contact_id: &UserId,
    ) -> Result<ConversationSummary, StoreError>;
}

/// Errors from the store and the contact directory.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum StoreError {
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    #[error("user {user_id} is not a participant of conversation {conversation_id}")]
    NotParticipant {
        user_id: String,
        conversation_id: String,
    },

    #[error("invalid record: {0}")]
    Invalid(#[from] ValidationError),

    #[error("store unavailable: {0}")]
    Unavailable(String),
}

impl StoreError {
    pub fn conversation_not_found(id: impl std::fmt::Display) -> Self {
        Self::NotFound {
            entity: "conversation",
            id: id.to_string(),
        }
    }

    pub fn contact_not_found(id: impl std::fmt::Display) -> Self {
        Self::NotFound {
            entity: "contact",
            id: id.to_string(),
        }
    }

    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable(message.into())
    }
}
