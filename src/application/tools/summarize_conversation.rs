//! summarize_conversation - model-written summary of recent messages.

use async_trait::async_trait;
use serde_json::json;
use std::sync::Arc;

use crate::domain::foundation::ConversationId;
use crate::domain::messaging::Message;
use crate::domain::tools::{definitions, ToolCall, ToolDefinition, ToolResult};
use crate::ports::{
    AIProvider, CompletionPurpose, CompletionRequest, ConversationStore, MessageRole,
    RequestMetadata, ToolContext, ToolExecutionError, ToolHandler,
};

use super::{limit_parameter, participant_conversation, recover, required_str};

const DEFAULT_LIMIT: usize = 50;
const MAX_LIMIT: usize = 200;
const SUMMARY_MAX_TOKENS: u32 = 400;

const SUMMARY_SYSTEM_PROMPT: &str = "You summarize chat conversations for a busy reader. \
    Write 2-4 short sentences covering decisions, open questions and plans with their dates. \
    Use only the transcript. Do not invent details.";

pub struct SummarizeConversationTool {
    store: Arc<dyn ConversationStore>,
    ai: Arc<dyn AIProvider>,
}

impl SummarizeConversationTool {
    pub fn new(store: Arc<dyn ConversationStore>, ai: Arc<dyn AIProvider>) -> Self {
        Self { store, ai }
    }

    async fn run(&self, call: &ToolCall, ctx: &ToolContext) -> Result<ToolResult, ToolExecutionError> {
        let conversation_id = ConversationId::new(required_str(call, "conversation_id")?)?;
        let limit = limit_parameter(call, DEFAULT_LIMIT, MAX_LIMIT);

        let conversation =
            participant_conversation(self.store.as_ref(), &ctx.user_id, &conversation_id).await?;
        let messages = self.store.get_messages(&conversation_id, limit, None).await?;

        if messages.is_empty() {
            return Ok(ToolResult::continue_or_complete(
                json!({
                    "summary": "There are no messages in this conversation yet.",
                    "message_count": 0,
                    "conversation_id": conversation.id.as_str(),
                    "title": conversation.title,
                }),
                ctx.remaining_steps,
            ));
        }

        let transcript = messages
            .iter()
            .map(Message::transcript_line)
            .collect::<Vec<_>>()
            .join("\n");
        let request = CompletionRequest::new(RequestMetadata::new(
            ctx.user_id.clone(),
            CompletionPurpose::Summarization,
            ctx.trace_id.as_str(),
        ))
        .with_system_prompt(SUMMARY_SYSTEM_PROMPT)
        .with_message(
            MessageRole::User,
            format!("Conversation \"{}\":\n{}", conversation.title, transcript),
        )
        .with_max_tokens(SUMMARY_MAX_TOKENS)
        .with_temperature(0.2);

        let response = self.ai.complete(request).await?;

        Ok(ToolResult::continue_or_complete(
            json!({
                "summary": response.content.trim(),
                "message_count": messages.len(),
                "conversation_id": conversation.id.as_str(),
                "title": conversation.title,
            }),
            ctx.remaining_steps,
        ))
    }
}

#[async_trait]
impl ToolHandler for SummarizeConversationTool {
    fn definition(&self) -> ToolDefinition {
        definitions::summarize_conversation_tool()
    }

    async fn handle(&self, call: &ToolCall, ctx: &ToolContext) -> Result<ToolResult, ToolExecutionError> {
        self.run(call, ctx).await.or_else(recover)
    }
}
