//! Pre-flight Validator - Command sanity checks before planning.
//!
//! Errors stop the invocation. Warnings and suggestions are annotations that
//! get forwarded to the planner prompt.

use serde::{Deserialize, Serialize};

use crate::domain::tools::names::{ANALYZE_CONVERSATION, ANALYZE_CONVERSATIONS_MULTI};

use super::{AppContext, OrchestrationError};

/// Longest accepted command, in characters.
pub const MAX_COMMAND_LENGTH: usize = 1000;

const INTERROGATIVES: [&str; 7] = ["who", "what", "when", "where", "which", "how", "why"];

/// Outcome of pre-flight checks.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreflightReport {
    pub valid: bool,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
    pub suggestions: Vec<String>,
}

impl PreflightReport {
    /// Converts a failed report into an error.
    pub fn into_result(self) -> Result<Self, OrchestrationError> {
        if self.valid {
            Ok(self)
        } else {
            Err(OrchestrationError::InvalidCommand(self.errors.join("; ")))
        }
    }
}

/// Returns true if the command reads like an information question.
///
/// Looks at the leading word ("When is the meeting?"), and at any
/// interrogative when the command ends with a question mark ("Did Sam say
/// where we meet?").
pub fn is_information_query(command: &str) -> bool {
    let lowered = command.trim().to_lowercase();
    let mut words = lowered
        .split_whitespace()
        .map(|w| w.trim_matches(|c: char| !c.is_alphanumeric() && c != '\''))
        .map(|w| w.split('\'').next().unwrap_or(w));

    let leading = match words.next() {
        Some(word) => word,
        None => return false,
    };
    if INTERROGATIVES.contains(&leading) {
        return true;
    }
    lowered.ends_with('?') && words.any(|w| INTERROGATIVES.contains(&w))
}

/// Runs all pre-flight checks.
pub fn preflight(command: &str, context: &AppContext) -> PreflightReport {
    let mut report = PreflightReport::default();
    let trimmed = command.trim();

    if trimmed.is_empty() {
        report.errors.push("Command is empty".to_string());
    }
    let length = trimmed.chars().count();
    if length > MAX_COMMAND_LENGTH {
        report.errors.push(format!(
            "Command is {} characters long; the limit is {}",
            length, MAX_COMMAND_LENGTH
        ));
    }
    if context.current_user_id.trim().is_empty() {
        report.errors.push("currentUserId is required".to_string());
    }

    if context.current_screen.is_conversation_view() && context.conversation_id().is_none() {
        report.warnings.push(
            "Conversation screen without currentConversationId; the open conversation cannot be used"
                .to_string(),
        );
    }

    if !trimmed.is_empty() && is_information_query(trimmed) && !context.in_conversation() {
        report.warnings.push(format!(
            "Information question outside a conversation: use {} instead of {}",
            ANALYZE_CONVERSATIONS_MULTI, ANALYZE_CONVERSATION
        ));
        report.suggestions.push(format!(
            "Plan a single {} step with the question as query",
            ANALYZE_CONVERSATIONS_MULTI
        ));
    }

    report.valid = report.errors.is_empty();
    report
}
