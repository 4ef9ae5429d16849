//! Chain Planner - Turns a command into a proposed chain via the LLM.
//!
//! The reply is parsed but not trusted; callers run the result through the
//! chain validator before anything executes.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::timeout;

use crate::domain::foundation::UserId;
use crate::domain::orchestration::{
    parse_plan, AppContext, ChainPlan, OrchestrationError, PlannerPrompt, PreflightReport,
};
use crate::domain::tools::ToolDefinition;
use crate::ports::{
    AIProvider, CompletionPurpose, CompletionRequest, MessageRole, RequestMetadata,
};

const PLANNER_MAX_TOKENS: u32 = 1024;

/// One planning request.
#[derive(Debug, Clone, Copy)]
pub struct PlanningInput<'a> {
    pub command: &'a str,
    pub context: &'a AppContext,
    pub preflight: &'a PreflightReport,
    pub tools: &'a [ToolDefinition],
    pub user_id: &'a UserId,
    pub trace_id: &'a str,
}

/// Plans chains with a language model.
pub struct ChainPlanner {
    ai: Arc<dyn AIProvider>,
    timeout: Duration,
    max_steps: usize,
}

impl ChainPlanner {
    pub fn new(ai: Arc<dyn AIProvider>, timeout: Duration, max_steps: usize) -> Self {
        Self {
            ai,
            timeout,
            max_steps,
        }
    }

    /// Builds the prompt, calls the model at temperature 0 and parses the plan.
    pub async fn plan(&self, input: PlanningInput<'_>) -> Result<ChainPlan, OrchestrationError> {
        let prompt = PlannerPrompt {
            tools: input.tools,
            context: input.context,
            preflight: input.preflight,
            max_steps: self.max_steps,
        };

        let request = CompletionRequest::new(RequestMetadata::new(
            input.user_id.clone(),
            CompletionPurpose::Planning,
            input.trace_id,
        ))
        .with_system_prompt(prompt.system_prompt())
        .with_message(MessageRole::User, PlannerPrompt::user_message(input.command))
        .with_max_tokens(PLANNER_MAX_TOKENS)
        .with_temperature(0.0);

        let response = timeout(self.timeout, self.ai.complete(request))
            .await
            .map_err(|_| {
                tracing::warn!(trace_id = %input.trace_id, "Planner timed out");
                OrchestrationError::PlanningTimeout(self.timeout.as_secs())
            })?
            .map_err(|e| {
                tracing::warn!(trace_id = %input.trace_id, error = %e, "Planner call failed");
                OrchestrationError::Planning(e.to_string())
            })?;

        let steps = parse_plan(&response.content)?;
        let plan = ChainPlan::from_planner(steps);

        tracing::info!(
            trace_id = %input.trace_id,
            tools = ?plan.tool_names(),
            "Planned chain"
        );
        Ok(plan)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::ai::{MockAIProvider, MockError};
    use crate::domain::orchestration::{preflight, PlanSource, Screen};
    use crate::domain::tools::definitions::builtin_tools;

    async fn plan_with(
        provider: MockAIProvider,
        timeout: Duration,
    ) -> Result<ChainPlan, OrchestrationError> {
        let context = AppContext::new("u-1", Screen::ConversationList);
        let report = preflight("Tell John hi", &context);
        let tools = builtin_tools();
        let user_id = UserId::new("u-1").unwrap();

        ChainPlanner::new(Arc::new(provider), timeout, 3)
            .plan(PlanningInput {
                command: "Tell John hi",
                context: &context,
                preflight: &report,
                tools: &tools,
                user_id: &user_id,
                trace_id: "trace-1",
            })
            .await
    }

    #[tokio::test]
    async fn parses_planner_reply() {
        let provider = MockAIProvider::new().with_response(
            r#"{"tools": [
                {"tool": "lookup_contacts", "parameters": {"name": "John"}},
                {"tool": "send_message", "parameters": {"content": "hi", "recipient_id": "$prev.contact_id"}}
            ]}"#,
        );

        let plan = plan_with(provider, Duration::from_secs(5)).await.unwrap();

        assert_eq!(plan.tool_names(), vec!["lookup_contacts", "send_message"]);
        assert_eq!(plan.source(), PlanSource::Planner);
    }

    #[tokio::test]
    async fn requests_deterministic_completion() {
        let provider = MockAIProvider::new().with_response(r#"[]"#);
        let _ = plan_with(provider.clone(), Duration::from_secs(5)).await;

        let call = &provider.get_calls()[0];
        assert_eq!(call.temperature, Some(0.0));
        assert_eq!(call.purpose(), CompletionPurpose::Planning);
        assert!(call.system_prompt.as_deref().unwrap().contains("# PARAMETER MAPPING"));
        assert_eq!(call.messages[0].content, "Command: \"Tell John hi\"");
    }

    #[tokio::test]
    async fn provider_errors_become_planning_errors() {
        let provider = MockAIProvider::new().with_error(MockError::AuthenticationFailed);

        let err = plan_with(provider, Duration::from_secs(5)).await.unwrap_err();
        assert!(matches!(err, OrchestrationError::Planning(_)));
    }

    #[tokio::test]
    async fn slow_provider_times_out() {
        let provider = MockAIProvider::new()
            .with_response("[]")
            .with_delay(Duration::from_millis(200));

        let err = plan_with(provider, Duration::from_millis(20)).await.unwrap_err();
        assert!(matches!(err, OrchestrationError::PlanningTimeout(_)));
    }

    #[tokio::test]
    async fn prose_reply_is_rejected() {
        let provider = MockAIProvider::new().with_response("Sure! I'll send that message.");

        let err = plan_with(provider, Duration::from_secs(5)).await.unwrap_err();
        assert!(matches!(err, OrchestrationError::Planning(_)));
    }
}
