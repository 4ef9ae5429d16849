//! Orchestration errors.
//!
//! Everything here is detected before or between tool invocations. Each
//! variant maps onto an [`ErrorKind`] and renders to a user-facing
//! [`ErrorInfo`].

use thiserror::Error;

use crate::domain::foundation::{ErrorInfo, ErrorKind, ValidationError};
use crate::domain::tools::ParameterType;

/// Errors raised while planning, validating or stepping a chain.
///
/// Step numbers are 1-based.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum OrchestrationError {
    #[error("Invalid command: {0}")]
    InvalidCommand(String),

    #[error("The plan contains no steps")]
    EmptyPlan,

    #[error("The plan has {actual} steps; at most {max} are allowed")]
    ChainLengthExceeded { max: usize, actual: usize },

    #[error("Tool '{tool}' is planned twice in a row (step {step})")]
    DuplicateTool { tool: String, step: usize },

    #[error("Unknown tool '{tool}' at step {step}")]
    UnknownTool { tool: String, step: usize },

    #[error("Step {step} ({tool}) is missing required parameter '{parameter}'")]
    MissingParameter {
        step: usize,
        tool: String,
        parameter: String,
    },

    #[error("Step {step} ({tool}): parameter '{parameter}' must be of type {expected}")]
    InvalidParameterType {
        step: usize,
        tool: String,
        parameter: String,
        expected: ParameterType,
    },

    #[error("Step {step} ({tool}): parameter '{parameter}' holds unresolved placeholder \"{value}\"")]
    Placeholder {
        step: usize,
        tool: String,
        parameter: String,
        value: String,
    },

    #[error("Step {step} ({tool}): reference \"{reference}\" is invalid: {reason}")]
    InvalidReference {
        step: usize,
        tool: String,
        reference: String,
        reason: String,
    },

    #[error("Could not resolve \"{reference}\" for {tool}.{parameter} from the previous step")]
    UnresolvedReference {
        tool: String,
        parameter: String,
        reference: String,
    },

    #[error("The selected option for '{reason}' was sent back without its pending steps")]
    MissingResumeSteps { reason: String },

    #[error("Planning failed: {0}")]
    Planning(String),

    #[error("Planning timed out after {0} seconds")]
    PlanningTimeout(u64),

    #[error("Invalid chain state transition: {0}")]
    InvalidTransition(#[from] ValidationError),
}

impl OrchestrationError {
    /// Returns the error category.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::ChainLengthExceeded { .. } => ErrorKind::ChainLengthExceeded,
            Self::DuplicateTool { .. } => ErrorKind::DuplicateTool,
            Self::Planning(_) => ErrorKind::PlanningError,
            Self::PlanningTimeout(_) => ErrorKind::Timeout,
            Self::InvalidTransition(_) => ErrorKind::ToolExecutionError,
            Self::InvalidCommand(_)
            | Self::EmptyPlan
            | Self::UnknownTool { .. }
            | Self::MissingParameter { .. }
            | Self::InvalidParameterType { .. }
            | Self::Placeholder { .. }
            | Self::InvalidReference { .. }
            | Self::UnresolvedReference { .. }
            | Self::MissingResumeSteps { .. } => ErrorKind::ValidationError,
        }
    }

    /// Returns a hint for the user where one helps.
    pub fn suggestion(&self) -> Option<&'static str> {
        match self {
            Self::InvalidCommand(_) => Some("Try a short instruction such as \"Tell Sam I'm running late\""),
            Self::ChainLengthExceeded { .. } => Some("Split the request into smaller commands"),
            Self::MissingResumeSteps { .. } => {
                Some("Send the chosen option back exactly as it was offered, including its metadata")
            }
            Self::Planning(_) | Self::PlanningTimeout(_) => Some("Please try again in a moment"),
            Self::UnresolvedReference { .. } | Self::MissingParameter { .. } => {
                Some("Try naming the contact or opening the conversation you meant first")
            }
            _ => None,
        }
    }

    /// Converts into a user-facing error description.
    pub fn to_error_info(&self) -> ErrorInfo {
        let info = ErrorInfo::new(self.kind(), self.to_string());
        match self.suggestion() {
            Some(suggestion) => info.with_suggestion(suggestion),
            None => info,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn structural_errors_map_to_their_kinds() {
        assert_eq!(
            OrchestrationError::ChainLengthExceeded { max: 3, actual: 4 }.kind(),
            ErrorKind::ChainLengthExceeded
        );
        assert_eq!(
            OrchestrationError::DuplicateTool {
                tool: "send_message".into(),
                step: 2
            }
            .kind(),
            ErrorKind::DuplicateTool
        );
        assert_eq!(OrchestrationError::EmptyPlan.kind(), ErrorKind::ValidationError);
    }

    #[test]
    fn planning_timeout_is_a_timeout() {
        assert_eq!(OrchestrationError::PlanningTimeout(10).kind(), ErrorKind::Timeout);
    }

    #[test]
    fn error_info_carries_suggestion() {
        let info = OrchestrationError::InvalidCommand("empty".into()).to_error_info();

        assert_eq!(info.code, ErrorKind::ValidationError);
        assert!(info.message.contains("empty"));
        assert!(info.suggestion.is_some());
    }

    #[test]
    fn message_names_step_and_tool() {
        let err = OrchestrationError::MissingParameter {
            step: 2,
            tool: "send_message".into(),
            parameter: "content".into(),
        };
        assert_eq!(
            err.to_string(),
            "Step 2 (send_message) is missing required parameter 'content'"
        );
    }
}
