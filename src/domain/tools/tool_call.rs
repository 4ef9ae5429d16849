//! Tool call value object.
//!
//! A request to invoke a named tool, produced by the planner (or by the
//! clarification resume path) and consumed by the executor.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A request to invoke a tool.
///
/// Parameters are always a JSON object; anything else supplied by a model is
/// normalised to an empty object and caught by validation.
///
/// # Examples
///
/// ```
/// use command_orchestrator::domain::tools::ToolCall;
///
/// let call = ToolCall::new(
///     "send_message",
///     serde_json::json!({ "recipient_id": "$prev.contact_id", "content": "On my way" }),
/// );
/// assert_eq!(call.str_parameter("content"), Some("On my way"));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    /// Name of the tool to invoke
    tool: String,

    /// Parameters for the tool
    #[serde(default)]
    parameters: Map<String, Value>,
}

impl ToolCall {
    /// Creates a new tool call.
    pub fn new(tool: impl Into<String>, parameters: Value) -> Self {
        let parameters = match parameters {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        Self {
            tool: tool.into(),
            parameters,
        }
    }

    /// Returns the tool name.
    pub fn name(&self) -> &str {
        &self.tool
    }

    /// Returns the parameters.
    pub fn parameters(&self) -> &Map<String, Value> {
        &self.parameters
    }

    /// Returns a single parameter value, treating JSON null as absent.
    pub fn parameter(&self, name: &str) -> Option<&Value> {
        self.parameters.get(name).filter(|v| !v.is_null())
    }

    /// Returns a parameter as a trimmed, non-empty string.
    pub fn str_parameter(&self, name: &str) -> Option<&str> {
        self.parameter(name)
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }

    /// Returns a parameter as an unsigned integer.
    pub fn u64_parameter(&self, name: &str) -> Option<u64> {
        self.parameter(name).and_then(Value::as_u64)
    }

    /// Sets or replaces a parameter.
    pub fn set_parameter(&mut self, name: impl Into<String>, value: Value) {
        self.parameters.insert(name.into(), value);
    }

    /// Consumes self and returns the parameters.
    pub fn into_parameters(self) -> Map<String, Value> {
        self.parameters
    }
}
