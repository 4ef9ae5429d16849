//! Retrieval-augmented answering over one conversation.

use serde_json::{json, Value};
use std::sync::Arc;

use crate::domain::foundation::{ConversationId, UserId};
use crate::domain::retrieval::{
    extraction_system_prompt, extraction_user_message, parse_extraction, Extraction,
    RetrievalSettings, RetrievedContext,
};
use crate::domain::tools::ToolResult;
use crate::ports::{
    AIError, AIProvider, CompletionPurpose, CompletionRequest, ConversationStore, MessageRole,
    RequestMetadata, ToolExecutionError, VectorIndex, VectorQuery,
};

const EXTRACTION_MAX_TOKENS: u32 = 512;

/// Retrieves context for a question and asks the model to answer from it.
#[derive(Clone)]
pub struct RagExtractor {
    store: Arc<dyn ConversationStore>,
    index: Arc<dyn VectorIndex>,
    ai: Arc<dyn AIProvider>,
    settings: RetrievalSettings,
}

/// Answer plus the context it was drawn from.
#[derive(Debug, Clone)]
pub struct Answer {
    pub extraction: Extraction,
    pub context: RetrievedContext,
}

impl Answer {
    /// Builds the tool result, recording how retrieval went.
    pub fn into_result(
        self,
        conversation_id: &ConversationId,
        extra: Option<(&str, Value)>,
        remaining_steps: usize,
    ) -> ToolResult {
        let mut data = json!({
            "answer": self.extraction.answer,
            "confidence": self.extraction.confidence,
            "supporting_message_ids": self.extraction.supporting_message_ids,
            "conversation_id": conversation_id.as_str(),
        });
        if let (Some((key, value)), Some(map)) = (extra, data.as_object_mut()) {
            map.insert(key.to_string(), value);
        }
        ToolResult::continue_or_complete(data, remaining_steps)
            .with_metadata("used_rag", json!(self.context.used_rag))
            .with_metadata("retrieval_degraded", json!(self.context.retrieval_degraded))
    }
}

impl RagExtractor {
    pub fn new(
        store: Arc<dyn ConversationStore>,
        index: Arc<dyn VectorIndex>,
        ai: Arc<dyn AIProvider>,
        settings: RetrievalSettings,
    ) -> Self {
        Self {
            store,
            index,
            ai,
            settings,
        }
    }

    /// Assembles context for `query` from one conversation.
    ///
    /// Index failures fall back to the most recent messages.
    pub async fn retrieve(
        &self,
        user_id: &UserId,
        conversation_id: &ConversationId,
        query: &str,
        trace_id: &str,
    ) -> Result<RetrievedContext, ToolExecutionError> {
        let search = self
            .index
            .search(VectorQuery::within(
                query,
                user_id.clone(),
                conversation_id.clone(),
                self.settings.top_k,
            ))
            .await;

        match search {
            Ok(hits) if hits.len() >= self.settings.min_hits => {
                Ok(RetrievedContext::from_hits(hits, Vec::new(), &self.settings))
            }
            Ok(hits) => {
                let recent = self.recent(conversation_id).await?;
                Ok(RetrievedContext::from_hits(hits, recent, &self.settings))
            }
            Err(e) => {
                tracing::warn!(
                    trace_id = %trace_id,
                    conversation_id = %conversation_id,
                    error = %e,
                    "Vector search failed, using recent messages"
                );
                let recent = self.recent(conversation_id).await?;
                Ok(RetrievedContext::degraded(recent))
            }
        }
    }

    /// Answers `query` from a retrieved context.
    pub async fn extract(
        &self,
        user_id: &UserId,
        query: &str,
        context: &RetrievedContext,
        trace_id: &str,
    ) -> Result<Extraction, ToolExecutionError> {
        if context.is_empty() {
            return Ok(Extraction::nothing_found());
        }

        let request = CompletionRequest::new(RequestMetadata::new(
            user_id.clone(),
            CompletionPurpose::Extraction,
            trace_id,
        ))
        .with_system_prompt(extraction_system_prompt())
        .with_message(MessageRole::User, extraction_user_message(query, context))
        .with_max_tokens(EXTRACTION_MAX_TOKENS)
        .with_temperature(0.0);

        let response = self.ai.complete(request).await?;
        let extraction = parse_extraction(&response.content).map_err(AIError::parse)?;
        Ok(extraction.sanitized(context))
    }

    /// Retrieves and extracts in one go.
    pub async fn answer(
        &self,
        user_id: &UserId,
        conversation_id: &ConversationId,
        query: &str,
        trace_id: &str,
    ) -> Result<Answer, ToolExecutionError> {
        let context = self.retrieve(user_id, conversation_id, query, trace_id).await?;
        let extraction = self.extract(user_id, query, &context, trace_id).await?;

        tracing::debug!(
            trace_id = %trace_id,
            conversation_id = %conversation_id,
            context_messages = context.messages.len(),
            used_rag = context.used_rag,
            retrieval_degraded = context.retrieval_degraded,
            confidence = extraction.confidence,
            "Extracted answer"
        );
        Ok(Answer {
            extraction,
            context,
        })
    }

    async fn recent(
        &self,
        conversation_id: &ConversationId,
    ) -> Result<Vec<crate::domain::messaging::Message>, ToolExecutionError> {
        Ok(self
            .store
            .get_messages(conversation_id, self.settings.recent_limit, None)
            .await?)
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::*;
    use super::*;

    fn extractor(fixture: &Fixture) -> RagExtractor {
        RagExtractor::new(
            Arc::new(fixture.store.clone()),
            Arc::new(fixture.index.clone()),
            Arc::new(fixture.ai.clone()),
            RetrievalSettings::default(),
        )
    }

    #[tokio::test]
    async fn sparse_hits_are_topped_up_with_recent_messages() {
        let fixture = fixture().await;
        let context = extractor(&fixture)
            .retrieve(&uid(ME), &cid("c-sarah"), "dinner", "t")
            .await
            .unwrap();

        assert!(context.used_rag);
        assert!(!context.retrieval_degraded);
        assert_eq!(context.messages.len(), 3);
    }

    #[tokio::test]
    async fn index_outage_degrades_to_recent_messages() {
        let fixture = fixture().await;
        fixture.index.set_available(false);

        let context = extractor(&fixture)
            .retrieve(&uid(ME), &cid("c-mike"), "deadline", "t")
            .await
            .unwrap();

        assert!(context.retrieval_degraded);
        assert!(!context.used_rag);
        assert_eq!(context.messages.len(), 2);
    }

    #[tokio::test]
    async fn answer_drops_unknown_citations() {
        let fixture = fixture().await;
        let ai = fixture.ai.clone().with_response_for(
            CompletionPurpose::Extraction,
            r#"{"answer": "Friday at 7", "confidence": 1.4, "supporting_message_ids": ["m-made-up"]}"#,
        );

        let answer = extractor(&fixture)
            .answer(&uid(ME), &cid("c-sarah"), "when is dinner", "t")
            .await
            .unwrap();

        assert_eq!(answer.extraction.answer, "Friday at 7");
        assert_eq!(answer.extraction.confidence, 1.0);
        assert!(answer.extraction.supporting_message_ids.is_empty());
        assert_eq!(ai.call_count_for(CompletionPurpose::Extraction), 1);
    }

    #[tokio::test]
    async fn empty_conversation_skips_the_model() {
        let fixture = fixture().await;
        fixture
            .store
            .add_conversation(&cid("c-empty"), "Empty", vec![uid(ME), uid("u-mike")])
            .await;

        let answer = extractor(&fixture)
            .answer(&uid(ME), &cid("c-empty"), "anything new", "t")
            .await
            .unwrap();

        assert_eq!(answer.extraction, Extraction::nothing_found());
        assert_eq!(fixture.ai.call_count(), 0);
    }

    #[tokio::test]
    async fn unparseable_reply_is_an_ai_error() {
        let fixture = fixture().await;
        let _ = fixture
            .ai
            .clone()
            .with_response_for(CompletionPurpose::Extraction, "It was Friday I think");

        let result = extractor(&fixture)
            .answer(&uid(ME), &cid("c-sarah"), "when is dinner", "t")
            .await;

        assert!(matches!(result, Err(ToolExecutionError::AI(AIError::Parse(_)))));
    }
}
