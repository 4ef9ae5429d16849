//! Chain Executor - Runs a validated plan one step at a time.
//!
//! Each step's parameters are resolved from the previous step's output,
//! re-checked against the tool schema, and the tool is invoked under a
//! timeout. The tool's `next_action` alone decides what happens next.

use serde_json::{Map, Value};
use std::sync::Arc;
use std::time::Duration;

use tokio::time::timeout;

use crate::domain::foundation::{ErrorInfo, ErrorKind, StateMachine};
use crate::domain::orchestration::{
    parameter_mapper, ChainPlan, ChainState, ChainValidator, OrchestrationError,
};
use crate::domain::tools::{ClarificationPayload, NextAction, ToolCall, ToolResult};
use crate::ports::ToolContext;

use super::ToolRegistry;

/// How a chain ended.
#[derive(Debug, Clone, PartialEq)]
pub enum ChainOutcome {
    /// The named tool completed the chain.
    Completed { tool: String, result: ToolResult },
    /// A tool needs the user to choose; nothing after it ran.
    Clarification(ClarificationPayload),
    /// The chain aborted.
    Failed(ErrorInfo),
}

/// Record of one chain execution.
#[derive(Debug, Clone, PartialEq)]
pub struct ChainRun {
    pub state: ChainState,
    pub outcome: ChainOutcome,
    /// Number of tools actually invoked
    pub tools_invoked: usize,
    /// Metadata of the last tool result, such as `retrieval_degraded`
    pub metadata: Map<String, Value>,
}

impl ChainRun {
    fn with_metadata(mut self, metadata: Map<String, Value>) -> Self {
        self.metadata = metadata;
        self
    }
}

/// Executes chains against the tool registry.
pub struct ChainExecutor {
    registry: Arc<ToolRegistry>,
    validator: ChainValidator,
    tool_timeout: Duration,
}

impl ChainExecutor {
    pub fn new(registry: Arc<ToolRegistry>, validator: ChainValidator, tool_timeout: Duration) -> Self {
        Self {
            registry,
            validator,
            tool_timeout,
        }
    }

    /// Runs `plan` to a terminal state.
    ///
    /// Only an illegal state transition is returned as `Err`; every tool
    /// outcome, including failures, is reported through [`ChainRun`].
    pub async fn execute(
        &self,
        plan: &ChainPlan,
        ctx: &ToolContext,
    ) -> Result<ChainRun, OrchestrationError> {
        let state = ChainState::Planned.transition_to(ChainState::Running)?;
        let steps = plan.steps();
        let mut previous: Option<(String, Map<String, Value>)> = None;
        let mut invoked = 0;

        for (index, planned) in steps.iter().enumerate() {
            let step = index + 1;
            let remaining = steps.len() - step;

            let call = match self.prepare(step, planned, previous.as_ref()) {
                Ok(call) => call,
                Err(e) => {
                    tracing::warn!(trace_id = %ctx.trace_id, step, error = %e, "Step rejected after mapping");
                    return finish(state, ChainOutcome::Failed(e.to_error_info()), invoked);
                }
            };
            let tool = call.name().to_string();
            let handler = match self.registry.get(&tool) {
                Ok(handler) => handler,
                Err(e) => {
                    return finish(state, ChainOutcome::Failed(ErrorInfo::not_found(e.to_string())), invoked);
                }
            };

            tracing::info!(trace_id = %ctx.trace_id, step, tool = %tool, remaining, "Executing step");
            invoked += 1;

            let result = match timeout(self.tool_timeout, handler.handle(&call, &ctx.at_step(remaining))).await {
                Ok(Ok(result)) => result,
                Ok(Err(e)) => {
                    tracing::warn!(trace_id = %ctx.trace_id, step, tool = %tool, error = %e, "Tool failed");
                    let info = ErrorInfo::tool_execution(format!("{} failed: {}", tool, e))
                        .with_suggestion("Please try again in a moment");
                    return finish(state, ChainOutcome::Failed(info), invoked);
                }
                Err(_) => {
                    tracing::warn!(trace_id = %ctx.trace_id, step, tool = %tool, "Tool timed out");
                    let info = ErrorInfo::new(
                        ErrorKind::Timeout,
                        format!("{} did not finish within {}s", tool, self.tool_timeout.as_secs()),
                    )
                    .with_suggestion("Please try again in a moment");
                    return finish(state, ChainOutcome::Failed(info), invoked);
                }
            };

            tracing::debug!(trace_id = %ctx.trace_id, step, tool = %tool, next_action = %result.next_action(), "Step finished");

            let metadata = result.metadata().clone();
            match result.next_action() {
                NextAction::Continue if remaining > 0 => {
                    let data = result.data().cloned().unwrap_or_default();
                    previous = Some((tool, data));
                }
                NextAction::Continue => {
                    let info = ErrorInfo::tool_execution(format!(
                        "{} asked to continue but the chain is exhausted",
                        tool
                    ));
                    return finish(state, ChainOutcome::Failed(info), invoked);
                }
                NextAction::ClarificationNeeded => {
                    let Some(payload) = result.into_clarification() else {
                        let info = ErrorInfo::tool_execution(format!(
                            "{} requested clarification without options",
                            tool
                        ));
                        return finish(state, ChainOutcome::Failed(info), invoked);
                    };
                    tracing::info!(
                        trace_id = %ctx.trace_id,
                        tool = %tool,
                        reason = %payload.reason,
                        options = payload.options.len(),
                        "Chain paused for clarification"
                    );
                    let payload = payload.with_resume_steps(&steps[step..]);
                    return finish(state, ChainOutcome::Clarification(payload), invoked)
                        .map(|run| run.with_metadata(metadata));
                }
                NextAction::Complete => {
                    return finish(state, ChainOutcome::Completed { tool, result }, invoked)
                        .map(|run| run.with_metadata(metadata));
                }
                NextAction::Error => {
                    let info = result.error().cloned().unwrap_or_else(|| {
                        ErrorInfo::tool_execution(format!("{} reported an error", tool))
                    });
                    tracing::info!(trace_id = %ctx.trace_id, tool = %tool, code = %info.code, "Tool reported error");
                    return finish(state, ChainOutcome::Failed(info), invoked)
                        .map(|run| run.with_metadata(metadata));
                }
            }
        }

        finish(
            state,
            ChainOutcome::Failed(ErrorInfo::tool_execution("The chain ended without a result")),
            invoked,
        )
    }

    fn prepare(
        &self,
        step: usize,
        planned: &ToolCall,
        previous: Option<&(String, Map<String, Value>)>,
    ) -> Result<ToolCall, OrchestrationError> {
        let call = match previous {
            Some((tool, data)) => parameter_mapper::resolve_call(planned, tool, data)?,
            None => planned.clone(),
        };
        let schema = self
            .registry
            .definition(call.name())
            .ok_or_else(|| OrchestrationError::UnknownTool {
                tool: call.name().to_string(),
                step,
            })?;
        self.validator.validate_resolved(step, &call, schema)?;
        Ok(call)
    }
}

fn finish(
    state: ChainState,
    outcome: ChainOutcome,
    tools_invoked: usize,
) -> Result<ChainRun, OrchestrationError> {
    let target = match outcome {
        ChainOutcome::Completed { .. } => ChainState::Complete,
        ChainOutcome::Clarification(_) => ChainState::Clarifying,
        ChainOutcome::Failed(_) => ChainState::Failed,
    };
    Ok(ChainRun {
        state: state.transition_to(target)?,
        outcome,
        tools_invoked,
        metadata: Map::new(),
    })
}
