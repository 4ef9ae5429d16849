//! In-Memory Conversation Store
//!
//! Holds users, conversations and messages in memory. Useful for testing
//! and development; the vector index adapter reads from the same data.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::domain::foundation::{ConversationId, MessageId, Timestamp, UserId};
use crate::domain::messaging::{ConversationSort, ConversationSummary, Message};
use crate::ports::{ConversationStore, StoreError};

const PREVIEW_CHARS: usize = 80;

#[derive(Debug, Default)]
struct StoreData {
    names: HashMap<UserId, String>,
    conversations: HashMap<ConversationId, ConversationSummary>,
    messages: HashMap<ConversationId, Vec<Message>>,
}

/// In-memory conversation store.
#[derive(Debug, Clone, Default)]
pub struct InMemoryConversationStore {
    data: Arc<RwLock<StoreData>>,
}

impl InMemoryConversationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a user's display name, used as the sender name.
    pub async fn add_user(&self, user_id: &UserId, display_name: impl Into<String>) {
        self.data
            .write()
            .await
            .names
            .insert(user_id.clone(), display_name.into());
    }

    /// Creates an empty conversation.
    pub async fn add_conversation(
        &self,
        conversation_id: &ConversationId,
        title: impl Into<String>,
        participant_ids: Vec<UserId>,
    ) -> ConversationSummary {
        let summary = ConversationSummary::new(
            conversation_id.clone(),
            title,
            participant_ids,
            Timestamp::now(),
        );
        let mut data = self.data.write().await;
        data.conversations
            .insert(conversation_id.clone(), summary.clone());
        data.messages.entry(conversation_id.clone()).or_default();
        summary
    }

    /// Appends a message with an explicit timestamp.
    pub async fn add_message_at(
        &self,
        conversation_id: &ConversationId,
        sender_id: &UserId,
        content: &str,
        sent_at: Timestamp,
    ) -> Result<Message, StoreError> {
        let mut data = self.data.write().await;
        append(&mut data, conversation_id, sender_id, content, sent_at)
    }

    /// Every message in the conversations `user_id` takes part in.
    pub async fn messages_visible_to(&self, user_id: &UserId) -> Vec<Message> {
        let data = self.data.read().await;
        data.conversations
            .values()
            .filter(|c| c.has_participant(user_id))
            .flat_map(|c| data.messages.get(&c.id).into_iter().flatten().cloned())
            .collect()
    }

    /// Messages of one conversation, oldest first.
    pub async fn messages_in(&self, conversation_id: &ConversationId) -> Vec<Message> {
        self.data
            .read()
            .await
            .messages
            .get(conversation_id)
            .cloned()
            .unwrap_or_default()
    }

    /// Total number of stored messages.
    pub async fn message_count(&self) -> usize {
        self.data.read().await.messages.values().map(Vec::len).sum()
    }
}

fn append(
    data: &mut StoreData,
    conversation_id: &ConversationId,
    sender_id: &UserId,
    content: &str,
    sent_at: Timestamp,
) -> Result<Message, StoreError> {
    let first = data.messages.get(conversation_id).map_or(true, Vec::is_empty);
    let conversation = data
        .conversations
        .get_mut(conversation_id)
        .ok_or_else(|| StoreError::conversation_not_found(conversation_id))?;
    if !conversation.has_participant(sender_id) {
        return Err(StoreError::NotParticipant {
            user_id: sender_id.to_string(),
            conversation_id: conversation_id.to_string(),
        });
    }

    let message = Message {
        id: MessageId::generate(),
        conversation_id: conversation_id.clone(),
        sender_id: sender_id.clone(),
        sender_name: data
            .names
            .get(sender_id)
            .cloned()
            .unwrap_or_else(|| sender_id.to_string()),
        content: content.to_string(),
        sent_at,
    };

    if first || sent_at >= conversation.last_activity {
        conversation.last_activity = sent_at;
        conversation.last_message_preview = Some(content.chars().take(PREVIEW_CHARS).collect());
    }

    let messages = data.messages.entry(conversation_id.clone()).or_default();
    messages.push(message.clone());
    messages.sort_by(|a, b| a.sent_at.cmp(&b.sent_at));
    Ok(message)
}

#[async_trait]
impl ConversationStore for InMemoryConversationStore {
    async fn list_conversations(
        &self,
        user_id: &UserId,
        sort: ConversationSort,
        limit: usize,
    ) -> Result<Vec<ConversationSummary>, StoreError> {
        let data = self.data.read().await;
        let mut conversations: Vec<ConversationSummary> = data
            .conversations
            .values()
            .filter(|c| c.has_participant(user_id))
            .cloned()
            .collect();

        match sort {
            ConversationSort::LastActivity => {
                conversations.sort_by(|a, b| b.last_activity.cmp(&a.last_activity))
            }
            ConversationSort::Title => conversations.sort_by(|a, b| a.title.cmp(&b.title)),
        }
        conversations.truncate(limit);
        Ok(conversations)
    }

    async fn get_conversation(
        &self,
        conversation_id: &ConversationId,
    ) -> Result<Option<ConversationSummary>, StoreError> {
        Ok(self
            .data
            .read()
            .await
            .conversations
            .get(conversation_id)
            .cloned())
    }

    async fn get_messages(
        &self,
        conversation_id: &ConversationId,
        limit: usize,
        before: Option<Timestamp>,
    ) -> Result<Vec<Message>, StoreError> {
        let data = self.data.read().await;
        let messages = data
            .messages
            .get(conversation_id)
            .ok_or_else(|| StoreError::conversation_not_found(conversation_id))?;

        let eligible: Vec<&Message> = messages
            .iter()
            .filter(|m| before.map_or(true, |cutoff| m.sent_at.is_before(&cutoff)))
            .collect();
        let skip = eligible.len().saturating_sub(limit);
        Ok(eligible.into_iter().skip(skip).cloned().collect())
    }

    async fn create_message(
        &self,
        conversation_id: &ConversationId,
        sender_id: &UserId,
        content: &str,
    ) -> Result<Message, StoreError> {
        let mut data = self.data.write().await;
        append(&mut data, conversation_id, sender_id, content, Timestamp::now())
    }

    async fn open_direct_conversation(
        &self,
        user_id: &UserId,
        contact_id: &UserId,
    ) -> Result<ConversationSummary, StoreError> {
        let mut data = self.data.write().await;
        if let Some(existing) = data
            .conversations
            .values()
            .find(|c| c.is_direct_between(user_id, contact_id))
        {
            return Ok(existing.clone());
        }

        let title = data
            .names
            .get(contact_id)
            .cloned()
            .ok_or_else(|| StoreError::contact_not_found(contact_id))?;
        let id = ConversationId::new(format!("conv-{}", Uuid::new_v4()))?;
        let summary = ConversationSummary::new(
            id.clone(),
            title,
            vec![user_id.clone(), contact_id.clone()],
            Timestamp::now(),
        );

        data.conversations.insert(id.clone(), summary.clone());
        data.messages.insert(id, Vec::new());
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn uid(s: &str) -> UserId {
        UserId::new(s).unwrap()
    }

    fn cid(s: &str) -> ConversationId {
        ConversationId::new(s).unwrap()
    }

    async fn seeded() -> InMemoryConversationStore {
        let store = InMemoryConversationStore::new();
        store.add_user(&uid("me"), "Me").await;
        store.add_user(&uid("john"), "John Smith").await;
        store
            .add_conversation(&cid("c-john"), "John Smith", vec![uid("me"), uid("john")])
            .await;
        store
    }

    #[tokio::test]
    async fn messages_are_returned_oldest_first_and_limited() {
        let store = seeded().await;
        let now = Timestamp::now();
        for (i, text) in ["one", "two", "three"].iter().enumerate() {
            store
                .add_message_at(&cid("c-john"), &uid("john"), text, now.minus_minutes(10 - i as i64))
                .await
                .unwrap();
        }

        let messages = store.get_messages(&cid("c-john"), 2, None).await.unwrap();
        let contents: Vec<_> = messages.iter().map(|m| m.content.as_str()).collect();

        assert_eq!(contents, vec!["two", "three"]);
        assert_eq!(messages[0].sender_name, "John Smith");
    }

    #[tokio::test]
    async fn before_cursor_excludes_newer_messages() {
        let store = seeded().await;
        let now = Timestamp::now();
        store.add_message_at(&cid("c-john"), &uid("me"), "old", now.minus_hours(2)).await.unwrap();
        store.add_message_at(&cid("c-john"), &uid("me"), "new", now).await.unwrap();

        let messages = store
            .get_messages(&cid("c-john"), 10, Some(now.minus_hours(1)))
            .await
            .unwrap();

        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].content, "old");
    }

    #[tokio::test]
    async fn create_message_updates_conversation_activity() {
        let store = seeded().await;
        store.create_message(&cid("c-john"), &uid("me"), "On my way").await.unwrap();

        let conversation = store.get_conversation(&cid("c-john")).await.unwrap().unwrap();
        assert_eq!(conversation.last_message_preview.as_deref(), Some("On my way"));
        assert_eq!(store.message_count().await, 1);
    }

    #[tokio::test]
    async fn outsiders_cannot_post() {
        let store = seeded().await;
        let result = store.create_message(&cid("c-john"), &uid("eve"), "hi").await;

        assert!(matches!(result, Err(StoreError::NotParticipant { .. })));
    }

    #[tokio::test]
    async fn unknown_conversation_is_not_found() {
        let store = seeded().await;

        assert!(matches!(
            store.get_messages(&cid("nope"), 5, None).await,
            Err(StoreError::NotFound { entity: "conversation", .. })
        ));
        assert!(store.get_conversation(&cid("nope")).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn direct_conversation_is_reused_or_created() {
        let store = seeded().await;
        store.add_user(&uid("sam"), "Sam Lee").await;

        let existing = store.open_direct_conversation(&uid("me"), &uid("john")).await.unwrap();
        assert_eq!(existing.id, cid("c-john"));

        let created = store.open_direct_conversation(&uid("me"), &uid("sam")).await.unwrap();
        assert_eq!(created.title, "Sam Lee");
        assert!(created.is_direct_between(&uid("me"), &uid("sam")));

        let again = store.open_direct_conversation(&uid("me"), &uid("sam")).await.unwrap();
        assert_eq!(again.id, created.id);
    }

    #[tokio::test]
    async fn list_is_scoped_to_participant_and_sorted() {
        let store = seeded().await;
        store.add_user(&uid("ann"), "Ann").await;
        store
            .add_conversation(&cid("c-ann"), "Ann", vec![uid("me"), uid("ann")])
            .await;
        store
            .add_conversation(&cid("c-other"), "Other", vec![uid("john"), uid("ann")])
            .await;
        store
            .add_message_at(&cid("c-ann"), &uid("ann"), "hey", Timestamp::now())
            .await
            .unwrap();

        let by_activity = store
            .list_conversations(&uid("me"), ConversationSort::LastActivity, 10)
            .await
            .unwrap();
        let ids: Vec<_> = by_activity.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["c-ann", "c-john"]);

        let by_title = store
            .list_conversations(&uid("me"), ConversationSort::Title, 1)
            .await
            .unwrap();
        assert_eq!(by_title[0].title, "Ann");
        assert_eq!(by_title.len(), 1);
    }
}
