//! Built-in tool handlers.
//!
//! Every handler pairs a definition from `domain::tools::definitions` with
//! the port calls that implement it. Expected misses (unknown contact,
//! conversation not visible to the user, malformed parameter) become
//! `error` results with a suggestion; only infrastructure failures surface
//! as `Err`.

mod analyze_conversation;
mod analyze_conversations_multi;
mod extraction;
mod get_conversations;
mod get_messages;
mod lookup_contacts;
mod request_clarification;
mod resolve_conversation;
mod send_message;
mod summarize_conversation;

pub use analyze_conversation::AnalyzeConversationTool;
pub use analyze_conversations_multi::AnalyzeConversationsMultiTool;
pub use extraction::RagExtractor;
pub use get_conversations::GetConversationsTool;
pub use get_messages::GetMessagesTool;
pub use lookup_contacts::LookupContactsTool;
pub use request_clarification::RequestClarificationTool;
pub use resolve_conversation::ResolveConversationTool;
pub use send_message::SendMessageTool;
pub use summarize_conversation::SummarizeConversationTool;

use std::sync::Arc;

use crate::domain::foundation::{ConversationId, UserId, ValidationError};
use crate::domain::matching::FuzzyThresholds;
use crate::domain::messaging::ConversationSummary;
use crate::domain::retrieval::{RelevanceSettings, RetrievalSettings};
use crate::domain::tools::{ToolCall, ToolResult};
use crate::ports::{
    AIProvider, ContactDirectory, ConversationStore, StoreError, ToolExecutionError, VectorIndex,
};

use super::{RegistryError, ToolRegistry};

/// Collaborators and settings shared by the built-in tools.
#[derive(Clone)]
pub struct ToolDependencies {
    pub store: Arc<dyn ConversationStore>,
    pub directory: Arc<dyn ContactDirectory>,
    pub vector_index: Arc<dyn VectorIndex>,
    pub ai: Arc<dyn AIProvider>,
    pub fuzzy: FuzzyThresholds,
    pub retrieval: RetrievalSettings,
    pub relevance: RelevanceSettings,
}

impl ToolDependencies {
    /// Creates dependencies with default settings.
    pub fn new(
        store: Arc<dyn ConversationStore>,
        directory: Arc<dyn ContactDirectory>,
        vector_index: Arc<dyn VectorIndex>,
        ai: Arc<dyn AIProvider>,
    ) -> Self {
        Self {
            store,
            directory,
            vector_index,
            ai,
            fuzzy: FuzzyThresholds::default(),
            retrieval: RetrievalSettings::default(),
            relevance: RelevanceSettings::default(),
        }
    }

    pub fn with_fuzzy(mut self, fuzzy: FuzzyThresholds) -> Self {
        self.fuzzy = fuzzy;
        self
    }

    pub fn with_retrieval(mut self, retrieval: RetrievalSettings) -> Self {
        self.retrieval = retrieval;
        self
    }

    pub fn with_relevance(mut self, relevance: RelevanceSettings) -> Self {
        self.relevance = relevance;
        self
    }

    fn extractor(&self) -> RagExtractor {
        RagExtractor::new(
            Arc::clone(&self.store),
            Arc::clone(&self.vector_index),
            Arc::clone(&self.ai),
            self.retrieval,
        )
    }
}

/// Registers the nine built-in tools.
pub fn register_builtin_tools(
    registry: &mut ToolRegistry,
    deps: &ToolDependencies,
) -> Result<(), RegistryError> {
    registry.register(Arc::new(LookupContactsTool::new(
        Arc::clone(&deps.directory),
        deps.fuzzy,
    )))?;
    registry.register(Arc::new(ResolveConversationTool::new(Arc::clone(&deps.store))))?;
    registry.register(Arc::new(SendMessageTool::new(Arc::clone(&deps.store))))?;
    registry.register(Arc::new(SummarizeConversationTool::new(
        Arc::clone(&deps.store),
        Arc::clone(&deps.ai),
    )))?;
    registry.register(Arc::new(AnalyzeConversationTool::new(
        Arc::clone(&deps.store),
        deps.extractor(),
    )))?;
    registry.register(Arc::new(AnalyzeConversationsMultiTool::new(
        Arc::clone(&deps.store),
        Arc::clone(&deps.vector_index),
        deps.extractor(),
        deps.relevance,
    )))?;
    registry.register(Arc::new(RequestClarificationTool))?;
    registry.register(Arc::new(GetConversationsTool::new(Arc::clone(&deps.store))))?;
    registry.register(Arc::new(GetMessagesTool::new(Arc::clone(&deps.store))))?;
    Ok(())
}

/// Reads a required, non-blank string parameter.
fn required_str<'a>(call: &'a ToolCall, name: &str) -> Result<&'a str, ToolExecutionError> {
    call.str_parameter(name)
        .ok_or_else(|| ValidationError::empty_field(name).into())
}

/// Reads an optional integer limit, clamped into `1..=max`.
fn limit_parameter(call: &ToolCall, default: usize, max: usize) -> usize {
    call.u64_parameter("limit")
        .map_or(default, |v| usize::try_from(v).unwrap_or(max))
        .clamp(1, max)
}

/// Loads a conversation the user takes part in.
async fn participant_conversation(
    store: &dyn ConversationStore,
    user_id: &UserId,
    conversation_id: &ConversationId,
) -> Result<ConversationSummary, ToolExecutionError> {
    let conversation = store
        .get_conversation(conversation_id)
        .await?
        .ok_or_else(|| StoreError::conversation_not_found(conversation_id))?;
    if !conversation.has_participant(user_id) {
        return Err(StoreError::NotParticipant {
            user_id: user_id.to_string(),
            conversation_id: conversation_id.to_string(),
        }
        .into());
    }
    Ok(conversation)
}

/// Turns expected misses into `error` results; passes real failures on.
fn recover(err: ToolExecutionError) -> Result<ToolResult, ToolExecutionError> {
    match err {
        ToolExecutionError::ValidationFailed(_)
        | ToolExecutionError::Store(StoreError::NotFound { .. })
        | ToolExecutionError::Store(StoreError::NotParticipant { .. })
        | ToolExecutionError::Store(StoreError::Invalid(_)) => {
            tracing::debug!(error = %err, "Tool miss reported as result");
            Ok(ToolResult::failure(err.to_error_info()))
        }
        other => Err(other),
    }
}


#[cfg(test)]
mod tests {
    use super::test_support::*;
    use super::*;
    use crate::domain::tools::names;
    use crate::domain::foundation::ErrorKind;
    use serde_json::json;

    #[tokio::test]
    async fn registers_all_builtin_tools_once() {
        let fixture = fixture().await;
        let mut registry = ToolRegistry::new();
        register_builtin_tools(&mut registry, &fixture.deps()).unwrap();

        assert_eq!(registry.tool_count(), names::ALL.len());
        for name in names::ALL {
            assert!(registry.has_tool(name), "missing {}", name);
        }
        assert!(matches!(
            register_builtin_tools(&mut registry, &fixture.deps()),
            Err(RegistryError::DuplicateTool(_))
        ));
    }

    #[test]
    fn limit_is_clamped() {
        let call = ToolCall::new("get_messages", json!({"limit": 500}));
        assert_eq!(limit_parameter(&call, 20, 100), 100);
        let call = ToolCall::new("get_messages", json!({"limit": 0}));
        assert_eq!(limit_parameter(&call, 20, 100), 1);
        let call = ToolCall::new("get_messages", json!({}));
        assert_eq!(limit_parameter(&call, 20, 100), 20);
    }

    #[test]
    fn misses_become_error_results() {
        let result = recover(StoreError::conversation_not_found("c-9").into()).unwrap();
        assert_eq!(result.error().unwrap().code, ErrorKind::NotFound);

        let result = recover(ValidationError::empty_field("name").into()).unwrap();
        assert_eq!(result.error().unwrap().code, ErrorKind::ValidationError);

        assert!(recover(StoreError::unavailable("down").into()).is_err());
    }

    #[tokio::test]
    async fn outsiders_cannot_load_conversation() {
        let fixture = fixture().await;
        let result = participant_conversation(&fixture.store, &uid(ME), &cid("c-private")).await;

        assert!(matches!(
            result,
            Err(ToolExecutionError::Store(StoreError::NotParticipant { .. }))
        ));
    }
}
