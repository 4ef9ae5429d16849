//! InvokeCommandHandler - Entry point for one natural-language command.
//!
//! Pre-flight, then either a deterministic resume plan or the planner, then
//! the chain validator, then the executor. Every outcome, including
//! rejection before anything ran, comes back as a [`CommandResponse`].

use std::sync::Arc;
use std::time::Duration;

use uuid::Uuid;

use crate::domain::foundation::{ConversationId, ErrorInfo, UserId};
use crate::domain::orchestration::{
    build_resume, preflight, AppContext, ChainPlan, ChainState, ChainValidator, CommandResponse,
    OrchestrationError, PlanSource, ResumeOutcome, MAX_CHAIN_LENGTH,
};
use crate::domain::tools::ToolDefinition;
use crate::ports::{AIProvider, ToolContext};

use crate::application::executor::{ChainExecutor, ChainOutcome};
use crate::application::planner::{ChainPlanner, PlanningInput};
use crate::application::ToolRegistry;

/// Command to run a user's instruction.
#[derive(Debug, Clone)]
pub struct InvokeCommand {
    pub command: String,
    pub context: AppContext,
}

/// Result of one invocation.
#[derive(Debug, Clone, PartialEq)]
pub struct InvokeCommandResult {
    pub response: CommandResponse,
    pub trace_id: String,
    /// Final chain state; `None` if no chain ran
    pub chain_state: Option<ChainState>,
    /// Where the plan came from; `None` if none was built
    pub plan_source: Option<PlanSource>,
    pub tools_invoked: usize,
}

/// Limits applied to every invocation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrchestratorSettings {
    pub max_chain_length: usize,
    pub planner_timeout: Duration,
    pub tool_timeout: Duration,
}

impl Default for OrchestratorSettings {
    fn default() -> Self {
        Self {
            max_chain_length: MAX_CHAIN_LENGTH,
            planner_timeout: Duration::from_secs(20),
            tool_timeout: Duration::from_secs(20),
        }
    }
}

/// Handler for natural-language commands.
pub struct InvokeCommandHandler {
    registry: Arc<ToolRegistry>,
    tools: Vec<ToolDefinition>,
    planner: ChainPlanner,
    validator: ChainValidator,
    executor: ChainExecutor,
}

impl InvokeCommandHandler {
    pub fn new(
        registry: Arc<ToolRegistry>,
        ai: Arc<dyn AIProvider>,
        settings: OrchestratorSettings,
    ) -> Self {
        let validator = ChainValidator::new(settings.max_chain_length);
        Self {
            tools: registry.definitions(),
            planner: ChainPlanner::new(ai, settings.planner_timeout, settings.max_chain_length),
            executor: ChainExecutor::new(Arc::clone(&registry), validator, settings.tool_timeout),
            validator,
            registry,
        }
    }

    pub async fn handle(&self, cmd: InvokeCommand) -> InvokeCommandResult {
        let trace_id = Uuid::new_v4().to_string();
        tracing::info!(
            trace_id = %trace_id,
            screen = %cmd.context.current_screen,
            resume = cmd.context.is_resume(),
            "Invoking command"
        );

        let mut result = InvokeCommandResult {
            response: CommandResponse::failed(&ErrorInfo::tool_execution("Not started")),
            trace_id,
            chain_state: None,
            plan_source: None,
            tools_invoked: 0,
        };

        let plan = match self.plan(&cmd, &result.trace_id).await {
            Ok(Planned::Chain(plan)) => plan,
            Ok(Planned::Answered(response)) => {
                result.response = response;
                return result;
            }
            Err(e) => {
                tracing::warn!(trace_id = %result.trace_id, error = %e, "Command rejected");
                result.response = CommandResponse::failed(&e.to_error_info());
                return result;
            }
        };
        result.plan_source = Some(plan.source());

        let ctx = match tool_context(&cmd, &result.trace_id) {
            Ok(ctx) => ctx,
            Err(e) => {
                result.response = CommandResponse::failed(&e.to_error_info());
                return result;
            }
        };

        match self.executor.execute(&plan, &ctx).await {
            Ok(run) => {
                tracing::info!(
                    trace_id = %result.trace_id,
                    state = %run.state,
                    tools_invoked = run.tools_invoked,
                    "Chain finished"
                );
                result.chain_state = Some(run.state);
                result.tools_invoked = run.tools_invoked;
                result.response = match &run.outcome {
                    ChainOutcome::Completed { tool, result: last } => {
                        CommandResponse::completed(tool, last)
                    }
                    ChainOutcome::Clarification(payload) => CommandResponse::clarification(payload),
                    ChainOutcome::Failed(error) => CommandResponse::failed(error),
                }
                .with_metadata(&run.metadata);
            }
            Err(e) => {
                tracing::error!(trace_id = %result.trace_id, error = %e, "Chain aborted");
                result.chain_state = Some(ChainState::Failed);
                result.response = CommandResponse::failed(&e.to_error_info());
            }
        }
        result
    }

    /// Builds and validates the chain, or answers without one.
    async fn plan(&self, cmd: &InvokeCommand, trace_id: &str) -> Result<Planned, OrchestrationError> {
        let report = preflight(&cmd.command, &cmd.context).into_result()?;
        for warning in &report.warnings {
            tracing::debug!(trace_id = %trace_id, warning = %warning, "Pre-flight warning");
        }

        let plan = match &cmd.context.clarification_response {
            Some(response) => match build_resume(&cmd.command, response)? {
                ResumeOutcome::Plan(plan) => plan,
                ResumeOutcome::Selected(option) => {
                    tracing::info!(trace_id = %trace_id, option = %option.id, "Clarification answered directly");
                    return Ok(Planned::Answered(CommandResponse::selected(&option)));
                }
            },
            None => {
                let user_id = parse_user(&cmd.context)?;
                self.planner
                    .plan(PlanningInput {
                        command: &cmd.command,
                        context: &cmd.context,
                        preflight: &report,
                        tools: &self.tools,
                        user_id: &user_id,
                        trace_id,
                    })
                    .await?
            }
        };

        if let Err(e) = self.validator.validate(&plan, self.registry.as_ref()) {
            tracing::warn!(
                trace_id = %trace_id,
                tools = ?plan.tool_names(),
                error = %e,
                "Plan failed validation"
            );
            return Err(e);
        }
        Ok(Planned::Chain(plan))
    }
}

enum Planned {
    Chain(ChainPlan),
    Answered(CommandResponse),
}

fn parse_user(context: &AppContext) -> Result<UserId, OrchestrationError> {
    UserId::new(context.current_user_id.trim())
        .map_err(|e| OrchestrationError::InvalidCommand(e.to_string()))
}

fn tool_context(cmd: &InvokeCommand, trace_id: &str) -> Result<ToolContext, OrchestrationError> {
    let user_id = parse_user(&cmd.context)?;
    let conversation_id = if cmd.context.in_conversation() {
        cmd.context
            .conversation_id()
            .map(ConversationId::new)
            .transpose()
            .map_err(|e| OrchestrationError::InvalidCommand(e.to_string()))?
    } else {
        None
    };
    Ok(ToolContext::new(user_id, cmd.command.trim(), trace_id).with_conversation(conversation_id))
}
