//! analyze_conversations_multi - answers a question across conversations.
//!
//! Candidate conversations are ranked by a blend of semantic relevance and
//! recency. One clear winner is answered directly; several qualifying
//! conversations become a clarification whose options each carry the
//! single-conversation analysis to run once the user picks one. When the
//! index is down the most recently active conversations are offered
//! instead.

use async_trait::async_trait;
use futures::future::join_all;
use serde_json::json;
use std::sync::Arc;

use crate::domain::foundation::{ErrorInfo, Timestamp};
use crate::domain::messaging::ConversationSort;
use crate::domain::retrieval::{
    decide, recency_only, score_conversations, ConversationScore, RelevanceDecision,
    RelevanceSettings,
};
use crate::domain::tools::names::ANALYZE_CONVERSATION;
use crate::domain::tools::{
    definitions, reasons, ClarificationOption, ClarificationPayload, ToolCall, ToolDefinition,
    ToolResult,
};
use crate::ports::{
    ConversationStore, ToolContext, ToolExecutionError, ToolHandler, VectorIndex, VectorQuery,
};

use super::{participant_conversation, recover, required_str, RagExtractor};

const SUBTITLE_CHARS: usize = 60;

pub struct AnalyzeConversationsMultiTool {
    store: Arc<dyn ConversationStore>,
    index: Arc<dyn VectorIndex>,
    extractor: RagExtractor,
    settings: RelevanceSettings,
}

impl AnalyzeConversationsMultiTool {
    pub fn new(
        store: Arc<dyn ConversationStore>,
        index: Arc<dyn VectorIndex>,
        extractor: RagExtractor,
        settings: RelevanceSettings,
    ) -> Self {
        Self {
            store,
            index,
            extractor,
            settings,
        }
    }

    /// Ranks conversations; the flag is set when the index was unusable.
    async fn rank(
        &self,
        query: &str,
        settings: &RelevanceSettings,
        ctx: &ToolContext,
    ) -> Result<(RelevanceDecision, bool), ToolExecutionError> {
        let now = Timestamp::now();
        let search = self
            .index
            .search(VectorQuery::across_conversations(
                query,
                ctx.user_id.clone(),
                settings.top_k,
            ))
            .await;

        match search {
            Ok(hits) => {
                let scores = score_conversations(&hits, &now, settings);
                tracing::debug!(
                    trace_id = %ctx.trace_id,
                    hits = hits.len(),
                    candidates = scores.len(),
                    "Scored conversations"
                );
                Ok((decide(scores, settings), false))
            }
            Err(e) => {
                tracing::warn!(
                    trace_id = %ctx.trace_id,
                    error = %e,
                    "Vector search failed, ranking conversations by recency"
                );
                let conversations = self
                    .store
                    .list_conversations(&ctx.user_id, ConversationSort::LastActivity, settings.top_k)
                    .await?;
                let mut scores = recency_only(&conversations, &now, settings);
                let decision = match scores.len() {
                    0 => RelevanceDecision::None,
                    1 => RelevanceDecision::Single(scores.remove(0)),
                    _ => RelevanceDecision::Multiple(scores),
                };
                Ok((decision, true))
            }
        }
    }

    async fn options(&self, scores: &[ConversationScore], query: &str) -> Vec<ClarificationOption> {
        let lookups = scores
            .iter()
            .map(|score| self.store.get_conversation(&score.conversation_id));
        let conversations = join_all(lookups).await;

        scores
            .iter()
            .zip(conversations)
            .map(|(score, conversation)| {
                let title = match conversation {
                    Ok(Some(c)) => c.title,
                    _ => score.conversation_id.to_string(),
                };
                let resume = ToolCall::new(
                    ANALYZE_CONVERSATION,
                    json!({
                        "conversation_id": score.conversation_id.as_str(),
                        "query": query,
                    }),
                );
                ClarificationOption::new(
                    score.conversation_id.as_str(),
                    title,
                    subtitle(&score.snippet),
                    score.composite,
                )
                .with_metadata("last_activity", json!(score.last_activity))
                .with_resume_steps(&[resume])
            })
            .collect()
    }

    async fn run(&self, call: &ToolCall, ctx: &ToolContext) -> Result<ToolResult, ToolExecutionError> {
        let query = required_str(call, "query")?;
        let settings = match call.u64_parameter("time_window_hours") {
            Some(hours) => self.settings.with_window_hours(hours),
            None => self.settings,
        };

        let (decision, degraded) = self.rank(query, &settings, ctx).await?;

        let result = match decision {
            RelevanceDecision::Single(score) => {
                let conversation = participant_conversation(
                    self.store.as_ref(),
                    &ctx.user_id,
                    &score.conversation_id,
                )
                .await?;
                let answer = self
                    .extractor
                    .answer(&ctx.user_id, &conversation.id, query, &ctx.trace_id)
                    .await?;
                answer
                    .into_result(
                        &conversation.id,
                        Some(("conversation_title", conversation.title.into())),
                        ctx.remaining_steps,
                    )
                    .with_metadata("conversation_score", json!(score.composite))
            }
            RelevanceDecision::Multiple(scores) => {
                let options = self.options(&scores, query).await;
                ToolResult::clarification_needed(ClarificationPayload::new(
                    reasons::MULTIPLE_CONVERSATIONS,
                    options,
                ))
            }
            RelevanceDecision::None => ToolResult::failure(
                ErrorInfo::not_found("I couldn't find anything about that in your recent conversations")
                    .with_suggestion("Try a longer time window or mention who you talked to"),
            ),
        };

        if degraded {
            Ok(result.with_metadata("retrieval_degraded", json!(true)))
        } else {
            Ok(result)
        }
    }
}

fn subtitle(snippet: &str) -> String {
    let mut chars = snippet.chars();
    let head: String = chars.by_ref().take(SUBTITLE_CHARS).collect();
    if chars.next().is_some() {
        format!("{}...", head.trim_end())
    } else {
        head
    }
}

#[async_trait]
impl ToolHandler for AnalyzeConversationsMultiTool {
    fn definition(&self) -> ToolDefinition {
        definitions::analyze_conversations_multi_tool()
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
    use crate::domain::retrieval::RetrievalSettings;
    use crate::domain::tools::NextAction;
    use crate::ports::CompletionPurpose;
    use serde_json::Value;

    fn tool(fixture: &Fixture) -> AnalyzeConversationsMultiTool {
        AnalyzeConversationsMultiTool::new(
            Arc::new(fixture.store.clone()),
            Arc::new(fixture.index.clone()),
            RagExtractor::new(
                Arc::new(fixture.store.clone()),
                Arc::new(fixture.index.clone()),
                Arc::new(fixture.ai.clone()),
                RetrievalSettings::default(),
            ),
            RelevanceSettings::default(),
        )
    }

    async fn ask(fixture: &Fixture, params: Value) -> ToolResult {
        tool(fixture)
            .handle(&ToolCall::new("analyze_conversations_multi", params), &ctx(0))
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn single_relevant_conversation_is_answered() {
        let fixture = fixture().await;
        let _ = fixture.ai.clone().with_response_for(
            CompletionPurpose::Extraction,
            r#"{"answer": "Monday", "confidence": 0.8, "supporting_message_ids": []}"#,
        );

        let result = ask(&fixture, json!({"query": "When is the project deadline?"})).await;

        assert_eq!(result.next_action(), NextAction::Complete);
        assert_eq!(result.data_str("conversation_id"), Some("c-mike"));
        assert_eq!(result.data_str("answer"), Some("Monday"));
        assert_eq!(result.metadata()["used_rag"], json!(true));
    }

    #[tokio::test]
    async fn several_relevant_conversations_ask_which_one() {
        let fixture = fixture().await;
        let now = Timestamp::now();
        fixture
            .store
            .add_message_at(&cid("c-john-smith"), &uid("u-john-smith"), "Is the project deadline still Monday?", now.minus_hours(1))
            .await
            .unwrap();

        let result = ask(&fixture, json!({"query": "project deadline"})).await;

        assert_eq!(result.next_action(), NextAction::ClarificationNeeded);
        let payload = result.clarification().unwrap();
        assert_eq!(payload.reason, reasons::MULTIPLE_CONVERSATIONS);
        let mut ids: Vec<_> = payload.options.iter().map(|o| o.id.as_str()).collect();
        ids.sort_unstable();
        assert_eq!(ids, vec!["c-john-smith", "c-mike"]);

        let option = &payload.options[0];
        let steps = option.resume_steps();
        assert_eq!(steps.len(), 1);
        assert_eq!(steps[0].name(), ANALYZE_CONVERSATION);
        assert_eq!(steps[0].str_parameter("conversation_id"), Some(option.id.as_str()));
        assert_eq!(steps[0].str_parameter("query"), Some("project deadline"));
        assert!(payload.options.iter().any(|o| o.title == "Mike Chen"));
        assert_eq!(fixture.ai.call_count(), 0);
    }

    #[tokio::test]
    async fn nothing_relevant_is_not_found() {
        let fixture = fixture().await;
        let result = ask(&fixture, json!({"query": "quarterly tax filing"})).await;

        let error = result.error().unwrap();
        assert_eq!(error.code, ErrorKind::NotFound);
        assert!(error.suggestion.is_some());
    }

    #[tokio::test]
    async fn time_window_excludes_old_conversations() {
        let fixture = fixture().await;
        let result = ask(&fixture, json!({"query": "dinner Friday", "time_window_hours": 12})).await;

        // The only visible dinner talk is 28-30 hours old.
        assert_eq!(result.error().unwrap().code, ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn other_peoples_conversations_are_never_offered() {
        let fixture = fixture().await;
        let result = ask(&fixture, json!({"query": "surprise party"})).await;

        assert_eq!(result.error().unwrap().code, ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn index_outage_offers_recent_conversations() {
        let fixture = fixture().await;
        fixture.index.set_available(false);

        let result = ask(&fixture, json!({"query": "project deadline"})).await;

        assert_eq!(result.metadata()["retrieval_degraded"], json!(true));
        let payload = result.clarification().unwrap();
        let ids: Vec<_> = payload.options.iter().map(|o| o.id.as_str()).collect();
        assert_eq!(ids, vec!["c-john-smith", "c-mike", "c-sarah"]);
    }

    #[test]
    fn long_snippets_are_shortened() {
        let long = "word ".repeat(30);
        let short = subtitle(&long);
        assert!(short.ends_with("..."));
        assert!(short.chars().count() <= SUBTITLE_CHARS + 3);
        assert_eq!(subtitle("Dinner Friday"), "Dinner Friday");
    }
}
