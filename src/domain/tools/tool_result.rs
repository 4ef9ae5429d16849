//! Tool execution result value object.
//!
//! `next_action` is the only field the executor branches on; everything
//! else is payload.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::domain::foundation::ErrorInfo;

use super::ClarificationPayload;

/// What the executor should do after a tool returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NextAction {
    /// Proceed to the next planned step
    Continue,
    /// Pause and ask the user to choose
    ClarificationNeeded,
    /// The chain produced its final answer
    Complete,
    /// Abort the chain
    Error,
}

impl std::fmt::Display for NextAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Continue => "continue",
            Self::ClarificationNeeded => "clarification_needed",
            Self::Complete => "complete",
            Self::Error => "error",
        };
        write!(f, "{}", s)
    }
}

/// Outcome of a tool execution.
///
/// # Examples
///
/// ```
/// use command_orchestrator::domain::tools::{NextAction, ToolResult};
///
/// let result = ToolResult::continue_or_complete(serde_json::json!({"contact_id": "u1"}), 1);
/// assert_eq!(result.next_action(), NextAction::Continue);
/// assert_eq!(result.data_str("contact_id"), Some("u1"));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolResult {
    success: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    data: Option<Map<String, Value>>,

    next_action: NextAction,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    clarification: Option<ClarificationPayload>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    error: Option<ErrorInfo>,

    /// Annotations that never influence control flow (e.g. `used_rag`)
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    metadata: Map<String, Value>,
}

fn into_object(data: Value) -> Map<String, Value> {
    match data {
        Value::Object(map) => map,
        Value::Null => Map::new(),
        other => {
            let mut map = Map::new();
            map.insert("value".to_string(), other);
            map
        }
    }
}

impl ToolResult {
    /// Successful intermediate result; the chain should proceed.
    pub fn proceed(data: Value) -> Self {
        Self::successful(data, NextAction::Continue)
    }

    /// Successful final result.
    pub fn complete(data: Value) -> Self {
        Self::successful(data, NextAction::Complete)
    }

    /// `Continue` if more steps are planned, otherwise `Complete`.
    pub fn continue_or_complete(data: Value, remaining_steps: usize) -> Self {
        if remaining_steps > 0 {
            Self::proceed(data)
        } else {
            Self::complete(data)
        }
    }

    /// Pause for user disambiguation.
    pub fn clarification_needed(payload: ClarificationPayload) -> Self {
        Self {
            success: true,
            data: None,
            next_action: NextAction::ClarificationNeeded,
            clarification: Some(payload),
            error: None,
            metadata: Map::new(),
        }
    }

    /// Failed result; the chain aborts.
    pub fn failure(error: ErrorInfo) -> Self {
        Self {
            success: false,
            data: None,
            next_action: NextAction::Error,
            clarification: None,
            error: Some(error),
            metadata: Map::new(),
        }
    }

    fn successful(data: Value, next_action: NextAction) -> Self {
        Self {
            success: true,
            data: Some(into_object(data)),
            next_action,
            clarification: None,
            error: None,
            metadata: Map::new(),
        }
    }

    /// Adds a metadata annotation.
    pub fn with_metadata(mut self, key: impl Into<String>, value: Value) -> Self {
        self.metadata.insert(key.into(), value);
        self
    }

    /// Returns whether the tool succeeded.
    pub fn is_success(&self) -> bool {
        self.success
    }

    /// Returns the control signal.
    pub fn next_action(&self) -> NextAction {
        self.next_action
    }

    /// Returns the output data (if any).
    pub fn data(&self) -> Option<&Map<String, Value>> {
        self.data.as_ref()
    }

    /// Returns a data field as a string.
    pub fn data_str(&self, field: &str) -> Option<&str> {
        self.data.as_ref()?.get(field)?.as_str()
    }

    /// Returns the clarification payload (if paused).
    pub fn clarification(&self) -> Option<&ClarificationPayload> {
        self.clarification.as_ref()
    }

    /// Consumes self and returns the clarification payload.
    pub fn into_clarification(self) -> Option<ClarificationPayload> {
        self.clarification
    }

    /// Returns the error (if failed).
    pub fn error(&self) -> Option<&ErrorInfo> {
        self.error.as_ref()
    }

    /// Returns the metadata annotations.
    pub fn metadata(&self) -> &Map<String, Value> {
        &self.metadata
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::ErrorKind;
    use crate::domain::tools::{reasons, ClarificationOption};
    use serde_json::json;

    #[test]
    fn continue_or_complete_depends_on_remaining_steps() {
        assert_eq!(
            ToolResult::continue_or_complete(json!({}), 2).next_action(),
            NextAction::Continue
        );
        assert_eq!(
            ToolResult::continue_or_complete(json!({}), 0).next_action(),
            NextAction::Complete
        );
    }

    #[test]
    fn failure_carries_error_info() {
        let result = ToolResult::failure(ErrorInfo::not_found("nobody"));

        assert!(!result.is_success());
        assert_eq!(result.next_action(), NextAction::Error);
        assert_eq!(result.error().unwrap().code, ErrorKind::NotFound);
    }

    #[test]
    fn clarification_result_exposes_payload() {
        let payload = ClarificationPayload::new(
            reasons::AMBIGUOUS_CONTACT,
            vec![ClarificationOption::new("u1", "John", "", 0.8)],
        );
        let result = ToolResult::clarification_needed(payload.clone());

        assert_eq!(result.next_action(), NextAction::ClarificationNeeded);
        assert_eq!(result.into_clarification(), Some(payload));
    }

    #[test]
    fn scalar_data_is_wrapped() {
        let result = ToolResult::complete(json!("done"));
        assert_eq!(result.data_str("value"), Some("done"));
    }

    #[test]
    fn serializes_next_action_snake_case() {
        let result = ToolResult::clarification_needed(ClarificationPayload::new("r", vec![]));
        let json = serde_json::to_value(&result).unwrap();

        assert_eq!(json["next_action"], "clarification_needed");
        assert!(json.get("metadata").is_none());
    }

    #[test]
    fn metadata_is_kept_separate_from_data() {
        let result = ToolResult::complete(json!({"answer": "Friday"}))
            .with_metadata("used_rag", json!(true));

        assert_eq!(result.metadata()["used_rag"], true);
        assert!(result.data().unwrap().get("used_rag").is_none());
    }
}
