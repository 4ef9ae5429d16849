//! Conversation summary record.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{ConversationId, Timestamp, UserId};

/// Ordering for conversation listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ConversationSort {
    /// Most recently active first
    #[default]
    LastActivity,
    /// Alphabetical by title
    Title,
}

/// A conversation as listed for a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationSummary {
    pub id: ConversationId,
    pub title: String,
    pub participant_ids: Vec<UserId>,
    pub last_activity: Timestamp,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_message_preview: Option<String>,
}

impl ConversationSummary {
    pub fn new(
        id: ConversationId,
        title: impl Into<String>,
        participant_ids: Vec<UserId>,
        last_activity: Timestamp,
    ) -> Self {
        Self {
            id,
            title: title.into(),
            participant_ids,
            last_activity,
            last_message_preview: None,
        }
    }

    pub fn with_preview(mut self, preview: impl Into<String>) -> Self {
        self.last_message_preview = Some(preview.into());
        self
    }

    /// Returns true if `user` takes part in the conversation.
    pub fn has_participant(&self, user: &UserId) -> bool {
        self.participant_ids.contains(user)
    }

    /// Returns true for a one-to-one conversation between `a` and `b`.
    pub fn is_direct_between(&self, a: &UserId, b: &UserId) -> bool {
        self.participant_ids.len() == 2 && self.has_participant(a) && self.has_participant(b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn uid(s: &str) -> UserId {
        UserId::new(s).unwrap()
    }

    #[test]
    fn direct_conversation_has_exactly_two_participants() {
        let direct = ConversationSummary::new(
            ConversationId::new("c-1").unwrap(),
            "John",
            vec![uid("me"), uid("john")],
            Timestamp::now(),
        );
        let group = ConversationSummary::new(
            ConversationId::new("c-2").unwrap(),
            "Team",
            vec![uid("me"), uid("john"), uid("sam")],
            Timestamp::now(),
        );

        assert!(direct.is_direct_between(&uid("me"), &uid("john")));
        assert!(!group.is_direct_between(&uid("me"), &uid("john")));
        assert!(group.has_participant(&uid("sam")));
    }
}
