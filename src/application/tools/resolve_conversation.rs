//! resolve_conversation - finds the direct conversation with a contact.

use async_trait::async_trait;
use serde_json::json;
use std::sync::Arc;

use crate::domain::foundation::{ErrorInfo, UserId};
use crate::domain::messaging::ConversationSort;
use crate::domain::tools::{definitions, ToolCall, ToolDefinition, ToolResult};
use crate::ports::{ConversationStore, ToolContext, ToolExecutionError, ToolHandler};

use super::{recover, required_str};

/// Conversations scanned when looking for the direct one.
const SCAN_LIMIT: usize = 200;

pub struct ResolveConversationTool {
    store: Arc<dyn ConversationStore>,
}

impl ResolveConversationTool {
    pub fn new(store: Arc<dyn ConversationStore>) -> Self {
        Self { store }
    }

    async fn run(&self, call: &ToolCall, ctx: &ToolContext) -> Result<ToolResult, ToolExecutionError> {
        let contact_id = UserId::new(required_str(call, "contact_id")?)?;

        let direct = self
            .store
            .list_conversations(&ctx.user_id, ConversationSort::LastActivity, SCAN_LIMIT)
            .await?
            .into_iter()
            .find(|c| c.is_direct_between(&ctx.user_id, &contact_id));

        Ok(match direct {
            Some(conversation) => ToolResult::continue_or_complete(
                json!({
                    "conversation_id": conversation.id.as_str(),
                    "title": conversation.title,
                }),
                ctx.remaining_steps,
            ),
            None => ToolResult::failure(
                ErrorInfo::not_found("You don't have a conversation with that contact yet")
                    .with_suggestion("Send them a message to start one"),
            ),
        })
    }
}

#[async_trait]
impl ToolHandler for ResolveConversationTool {
    fn definition(&self) -> ToolDefinition {
        definitions::resolve_conversation_tool()
    }

    async fn handle(&self, call: &ToolCall, ctx: &ToolContext) -> Result<ToolResult, ToolExecutionError> {
        self.run(call, ctx).await.or_else(recover)
    }
}
