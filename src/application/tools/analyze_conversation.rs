//! analyze_conversation - answers a question from one conversation.

use async_trait::async_trait;
use std::sync::Arc;

use crate::domain::foundation::ConversationId;
use crate::domain::tools::{definitions, ToolCall, ToolDefinition, ToolResult};
use crate::ports::{ConversationStore, ToolContext, ToolExecutionError, ToolHandler};

use super::{participant_conversation, recover, required_str, RagExtractor};

pub struct AnalyzeConversationTool {
    store: Arc<dyn ConversationStore>,
    extractor: RagExtractor,
}

impl AnalyzeConversationTool {
    pub fn new(store: Arc<dyn ConversationStore>, extractor: RagExtractor) -> Self {
        Self { store, extractor }
    }

    async fn run(&self, call: &ToolCall, ctx: &ToolContext) -> Result<ToolResult, ToolExecutionError> {
        let conversation_id = ConversationId::new(required_str(call, "conversation_id")?)?;
        let query = required_str(call, "query")?;

        let conversation =
            participant_conversation(self.store.as_ref(), &ctx.user_id, &conversation_id).await?;
        let answer = self
            .extractor
            .answer(&ctx.user_id, &conversation.id, query, &ctx.trace_id)
            .await?;

        Ok(answer.into_result(
            &conversation.id,
            Some(("conversation_title", conversation.title.into())),
            ctx.remaining_steps,
        ))
    }
}

#[async_trait]
impl ToolHandler for AnalyzeConversationTool {
    fn definition(&self) -> ToolDefinition {
        definitions::analyze_conversation_tool()
    }

    async fn handle(&self, call: &ToolCall, ctx: &ToolContext) -> Result<ToolResult, ToolExecutionError> {
        self.run(call, ctx).await.or_else(recover)
    }
}
