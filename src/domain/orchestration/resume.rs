//! Deterministic plan rebuilding on clarification resume.
//!
//! The caller re-sends the original command with the option it picked. The
//! option carries the steps that were still pending when execution paused,
//! so the plan is rebuilt without the planning model and without repeating
//! the step that asked for clarification.

use serde_json::{json, Map, Value};

use crate::domain::tools::names::{
    ANALYZE_CONVERSATION, ANALYZE_CONVERSATIONS_MULTI, LOOKUP_CONTACTS, REQUEST_CLARIFICATION,
};
use crate::domain::tools::{reasons, ClarificationOption, ClarificationResponse, ToolCall};

use super::parameter_mapper;
use super::{ChainPlan, OrchestrationError};

/// What a resumed invocation should do.
#[derive(Debug, Clone, PartialEq)]
pub enum ResumeOutcome {
    /// Run these steps.
    Plan(ChainPlan),
    /// The choice itself is the answer.
    Selected(ClarificationOption),
}

/// Builds the continuation for a clarification answer.
pub fn build_resume(
    command: &str,
    response: &ClarificationResponse,
) -> Result<ResumeOutcome, OrchestrationError> {
    let option = &response.selected_option;
    if option.id.trim().is_empty() {
        return Err(OrchestrationError::InvalidCommand(
            "the selected option has no id".to_string(),
        ));
    }

    let reason = response.original_reason.as_str();
    if reason == reasons::AMBIGUOUS_CONTACT && !option.has_resume_steps() {
        return Err(OrchestrationError::MissingResumeSteps {
            reason: reason.to_string(),
        });
    }

    let mut steps = option.resume_steps();
    steps.retain(|step| step.name() != LOOKUP_CONTACTS);

    if steps.is_empty() {
        if reason == reasons::MULTIPLE_CONVERSATIONS {
            let call = ToolCall::new(
                ANALYZE_CONVERSATION,
                json!({"conversation_id": option.id, "query": command.trim()}),
            );
            return Ok(ResumeOutcome::Plan(ChainPlan::from_resume(vec![call])));
        }
        return Ok(ResumeOutcome::Selected(option.clone()));
    }

    let selection = selection_data(reason, option);
    steps[0] = parameter_mapper::resolve_call(&steps[0], origin_tool(reason), &selection)?;

    Ok(ResumeOutcome::Plan(ChainPlan::from_resume(steps)))
}

/// Output the paused tool would have produced had the choice been obvious.
pub fn selection_data(reason: &str, option: &ClarificationOption) -> Map<String, Value> {
    let mut data = Map::new();
    data.insert("id".to_string(), json!(option.id));
    data.insert("title".to_string(), json!(option.title));
    match reason {
        reasons::AMBIGUOUS_CONTACT => {
            data.insert("contact_id".to_string(), json!(option.id));
            data.insert("display_name".to_string(), json!(option.title));
        }
        reasons::MULTIPLE_CONVERSATIONS => {
            data.insert("conversation_id".to_string(), json!(option.id));
        }
        _ => {}
    }
    data
}

fn origin_tool(reason: &str) -> &'static str {
    match reason {
        reasons::AMBIGUOUS_CONTACT => LOOKUP_CONTACTS,
        reasons::MULTIPLE_CONVERSATIONS => ANALYZE_CONVERSATIONS_MULTI,
        _ => REQUEST_CLARIFICATION,
    }
}
