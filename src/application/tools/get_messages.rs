//! get_messages - reads one conversation.

use async_trait::async_trait;
use serde_json::{json, Value};
use std::sync::Arc;

use crate::domain::foundation::ConversationId;
use crate::domain::tools::{definitions, ToolCall, ToolDefinition, ToolResult};
use crate::ports::{ConversationStore, ToolContext, ToolExecutionError, ToolHandler};

use super::{limit_parameter, participant_conversation, recover, required_str};

const DEFAULT_LIMIT: usize = 20;
const MAX_LIMIT: usize = 100;

pub struct GetMessagesTool {
    store: Arc<dyn ConversationStore>,
}

impl GetMessagesTool {
    pub fn new(store: Arc<dyn ConversationStore>) -> Self {
        Self { store }
    }

    async fn run(&self, call: &ToolCall, ctx: &ToolContext) -> Result<ToolResult, ToolExecutionError> {
        let conversation_id = ConversationId::new(required_str(call, "conversation_id")?)?;
        let limit = limit_parameter(call, DEFAULT_LIMIT, MAX_LIMIT);

        let conversation =
            participant_conversation(self.store.as_ref(), &ctx.user_id, &conversation_id).await?;
        let messages = self.store.get_messages(&conversation_id, limit, None).await?;

        let listed: Vec<Value> = messages
            .iter()
            .map(|m| {
                json!({
                    "id": m.id.as_str(),
                    "sender_id": m.sender_id.as_str(),
                    "sender_name": m.sender_name,
                    "content": m.content,
                    "sent_at": m.sent_at,
                })
            })
            .collect();

        Ok(ToolResult::continue_or_complete(
            json!({
                "conversation_id": conversation.id.as_str(),
                "title": conversation.title,
                "messages": listed,
            }),
            ctx.remaining_steps,
        ))
    }
}

#[async_trait]
impl ToolHandler for GetMessagesTool {
    fn definition(&self) -> ToolDefinition {
        definitions::get_messages_tool()
    }

    async fn handle(&self, call: &ToolCall, ctx: &ToolContext) -> Result<ToolResult, ToolExecutionError> {
        self.run(call, ctx).await.or_else(recover)
    }
}
