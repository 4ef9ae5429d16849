//! Message record.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{ConversationId, MessageId, Timestamp, UserId};

/// A message stored in a conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub id: MessageId,
    pub conversation_id: ConversationId,
    pub sender_id: UserId,
    pub sender_name: String,
    pub content: String,
    pub sent_at: Timestamp,
}

impl Message {
    /// Renders the message as a transcript line for model prompts.
    pub fn transcript_line(&self) -> String {
        format!(
            "[{}] ({}) {}: {}",
            self.id,
            self.sent_at.as_datetime().format("%Y-%m-%d %H:%M"),
            self.sender_name,
            self.content
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    #[test]
    fn transcript_line_includes_id_time_and_sender() {
        let message = Message {
            id: MessageId::new("m-1").unwrap(),
            conversation_id: ConversationId::new("c-1").unwrap(),
            sender_id: UserId::new("u-1").unwrap(),
            sender_name: "Sam".to_string(),
            content: "See you at 6".to_string(),
            sent_at: Timestamp::from_datetime(Utc.with_ymd_and_hms(2024, 5, 3, 17, 30, 0).unwrap()),
        };

        assert_eq!(message.transcript_line(), "[m-1] (2024-05-03 17:30) Sam: See you at 6");
    }
}
