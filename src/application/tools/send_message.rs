//! send_message - posts a message for the user.

use async_trait::async_trait;
use serde_json::json;
use std::sync::Arc;

use crate::domain::foundation::{ConversationId, ErrorInfo, UserId, ValidationError};
use crate::domain::messaging::ConversationSummary;
use crate::domain::tools::{definitions, ToolCall, ToolDefinition, ToolResult};
use crate::ports::{ConversationStore, ToolContext, ToolExecutionError, ToolHandler};

use super::{participant_conversation, recover, required_str};

/// Longest message the tool will send.
pub const MAX_CONTENT_CHARS: usize = 4000;

pub struct SendMessageTool {
    store: Arc<dyn ConversationStore>,
}

impl SendMessageTool {
    pub fn new(store: Arc<dyn ConversationStore>) -> Self {
        Self { store }
    }

    /// Picks the target: explicit conversation, then recipient, then the
    /// conversation open on screen.
    async fn target(
        &self,
        call: &ToolCall,
        ctx: &ToolContext,
    ) -> Result<Option<ConversationSummary>, ToolExecutionError> {
        if let Some(id) = call.str_parameter("conversation_id") {
            let id = ConversationId::new(id)?;
            return Ok(Some(
                participant_conversation(self.store.as_ref(), &ctx.user_id, &id).await?,
            ));
        }
        if let Some(recipient) = call.str_parameter("recipient_id") {
            let recipient = UserId::new(recipient)?;
            if recipient == ctx.user_id {
                return Err(ValidationError::invalid_format(
                    "recipient_id",
                    "cannot send a message to yourself",
                )
                .into());
            }
            return Ok(Some(
                self.store
                    .open_direct_conversation(&ctx.user_id, &recipient)
                    .await?,
            ));
        }
        match &ctx.current_conversation_id {
            Some(id) => Ok(Some(
                participant_conversation(self.store.as_ref(), &ctx.user_id, id).await?,
            )),
            None => Ok(None),
        }
    }

    async fn run(&self, call: &ToolCall, ctx: &ToolContext) -> Result<ToolResult, ToolExecutionError> {
        let content = required_str(call, "content")?.trim();
        let length = content.chars().count();
        if length > MAX_CONTENT_CHARS {
            return Err(ValidationError::too_long("content", MAX_CONTENT_CHARS, length).into());
        }

        let Some(conversation) = self.target(call, ctx).await? else {
            return Ok(ToolResult::failure(
                ErrorInfo::validation("I don't know who to send that to")
                    .with_suggestion("Name the person, e.g. \"Tell John I'm running late\""),
            ));
        };

        let message = self
            .store
            .create_message(&conversation.id, &ctx.user_id, content)
            .await?;

        tracing::info!(
            trace_id = %ctx.trace_id,
            conversation_id = %conversation.id,
            message_id = %message.id,
            "Message sent"
        );

        Ok(ToolResult::continue_or_complete(
            json!({
                "message_id": message.id.as_str(),
                "conversation_id": conversation.id.as_str(),
                "recipient": conversation.title,
                "content": message.content,
            }),
            ctx.remaining_steps,
        ))
    }
}

#[async_trait]
impl ToolHandler for SendMessageTool {
    fn definition(&self) -> ToolDefinition {
        definitions::send_message_tool()
    }

    async fn handle(&self, call: &ToolCall, ctx: &ToolContext) -> Result<ToolResult, ToolExecutionError> {
        self.run(call, ctx).await.or_else(recover)
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::*;
    use super::*;
    use crate::domain::foundation::ErrorKind;
    use crate::domain::tools::NextAction;
    use serde_json::Value;

    async fn send(fixture: &Fixture, params: Value, ctx: &ToolContext) -> ToolResult {
        SendMessageTool::new(Arc::new(fixture.store.clone()))
            .handle(&ToolCall::new("send_message", params), ctx)
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn sends_to_existing_direct_conversation() {
        let fixture = fixture().await;
        let before = fixture.store.message_count().await;

        let result = send(&fixture, json!({"content": "On my way", "recipient_id": "u-sarah"}), &ctx(0)).await;

        assert_eq!(result.next_action(), NextAction::Complete);
        assert_eq!(result.data_str("conversation_id"), Some("c-sarah"));
        assert_eq!(fixture.store.message_count().await, before + 1);
        let last = fixture.store.messages_in(&cid("c-sarah")).await.pop().unwrap();
        assert_eq!(last.content, "On my way");
        assert_eq!(last.sender_id, uid(ME));
    }

    #[tokio::test]
    async fn opens_conversation_for_new_recipient() {
        let fixture = fixture().await;
        let result = send(&fixture, json!({"content": "Hi John", "recipient_id": "u-john-doe"}), &ctx(0)).await;

        let conversation_id = result.data_str("conversation_id").unwrap();
        assert!(conversation_id.starts_with("conv-"));
        assert_eq!(result.data_str("recipient"), Some("John Doe"));
    }

    #[tokio::test]
    async fn conversation_id_wins_over_recipient() {
        let fixture = fixture().await;
        let result = send(
            &fixture,
            json!({"content": "hello", "conversation_id": "c-mike", "recipient_id": "u-sarah"}),
            &ctx(0),
        )
        .await;

        assert_eq!(result.data_str("conversation_id"), Some("c-mike"));
    }

    #[tokio::test]
    async fn falls_back_to_open_conversation() {
        let fixture = fixture().await;
        let ctx = ctx(0).with_conversation(Some(cid("c-mike")));

        let result = send(&fixture, json!({"content": "Sounds good"}), &ctx).await;
        assert_eq!(result.data_str("conversation_id"), Some("c-mike"));
    }

    #[tokio::test]
    async fn no_target_is_a_validation_error() {
        let fixture = fixture().await;
        let result = send(&fixture, json!({"content": "Hello?"}), &ctx(0)).await;

        let error = result.error().unwrap();
        assert_eq!(error.code, ErrorKind::ValidationError);
        assert!(error.suggestion.is_some());
    }

    #[tokio::test]
    async fn unknown_recipient_is_not_found() {
        let fixture = fixture().await;
        let result = send(&fixture, json!({"content": "hi", "recipient_id": "u-ghost"}), &ctx(0)).await;

        assert_eq!(result.error().unwrap().code, ErrorKind::NotFound);
        assert_eq!(fixture.store.messages_in(&cid("c-sarah")).await.len(), 3);
    }

    #[tokio::test]
    async fn cannot_post_into_foreign_conversation() {
        let fixture = fixture().await;
        let result = send(&fixture, json!({"content": "hi", "conversation_id": "c-private"}), &ctx(0)).await;

        assert_eq!(result.error().unwrap().code, ErrorKind::NotFound);
        assert_eq!(fixture.store.messages_in(&cid("c-private")).await.len(), 1);
    }

    #[tokio::test]
    async fn oversized_content_is_rejected() {
        let fixture = fixture().await;
        let content = "x".repeat(MAX_CONTENT_CHARS + 1);
        let result = send(&fixture, json!({"content": content, "recipient_id": "u-sarah"}), &ctx(0)).await;

        assert_eq!(result.error().unwrap().code, ErrorKind::ValidationError);
    }
}
