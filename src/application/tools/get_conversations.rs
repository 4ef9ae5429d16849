//! get_conversations - recent conversation listing.

use async_trait::async_trait;
use serde_json::{json, Value};
use std::sync::Arc;

use crate::domain::messaging::{ConversationSort, ConversationSummary};
use crate::domain::tools::{definitions, ToolCall, ToolDefinition, ToolResult};
use crate::ports::{ConversationStore, ToolContext, ToolExecutionError, ToolHandler};

use super::{limit_parameter, recover};

const DEFAULT_LIMIT: usize = 10;
const MAX_LIMIT: usize = 50;

pub struct GetConversationsTool {
    store: Arc<dyn ConversationStore>,
}

impl GetConversationsTool {
    pub fn new(store: Arc<dyn ConversationStore>) -> Self {
        Self { store }
    }

    async fn run(&self, call: &ToolCall, ctx: &ToolContext) -> Result<ToolResult, ToolExecutionError> {
        let limit = limit_parameter(call, DEFAULT_LIMIT, MAX_LIMIT);
        let conversations = self
            .store
            .list_conversations(&ctx.user_id, ConversationSort::LastActivity, limit)
            .await?;

        // The most recent conversation feeds a following step.
        let first = conversations
            .first()
            .map_or(Value::Null, |c| json!(c.id.as_str()));
        let listed: Vec<Value> = conversations.iter().map(listing).collect();

        Ok(ToolResult::continue_or_complete(
            json!({
                "conversation_id": first,
                "conversations": listed,
            }),
            ctx.remaining_steps,
        ))
    }
}

fn listing(conversation: &ConversationSummary) -> Value {
    json!({
        "id": conversation.id.as_str(),
        "title": conversation.title,
        "last_activity": conversation.last_activity,
        "preview": conversation.last_message_preview,
    })
}

#[async_trait]
impl ToolHandler for GetConversationsTool {
    fn definition(&self) -> ToolDefinition {
        definitions::get_conversations_tool()
    }

    async fn handle(&self, call: &ToolCall, ctx: &ToolContext) -> Result<ToolResult, ToolExecutionError> {
        self.run(call, ctx).await.or_else(recover)
    }
}
