//! request_clarification - planner-initiated questions.

use async_trait::async_trait;
use serde_json::Value;

use crate::domain::foundation::{ErrorInfo, ValidationError};
use crate::domain::tools::{
    definitions, ClarificationOption, ClarificationPayload, ToolCall, ToolDefinition, ToolResult,
};
use crate::ports::{ToolContext, ToolExecutionError, ToolHandler};

use super::{recover, required_str};

/// Confidence given to options the planner did not score.
const DEFAULT_CONFIDENCE: f64 = 1.0;

/// Pauses the chain with the planner's own question and options.
pub struct RequestClarificationTool;

impl RequestClarificationTool {
    fn run(&self, call: &ToolCall) -> Result<ToolResult, ToolExecutionError> {
        let question = required_str(call, "question")?;
        let raw = call
            .parameter("options")
            .and_then(Value::as_array)
            .ok_or_else(|| ValidationError::empty_field("options"))?;

        let options: Vec<ClarificationOption> = raw.iter().filter_map(parse_option).collect();
        if options.is_empty() {
            return Ok(ToolResult::failure(
                ErrorInfo::validation("A clarification needs at least one option")
                    .with_suggestion("Rephrase the command with more detail"),
            ));
        }

        Ok(ToolResult::clarification_needed(ClarificationPayload::new(
            question, options,
        )))
    }
}

/// Reads one `{id, title, subtitle?, confidence?}` entry; bare strings are
/// used as both id and title.
fn parse_option(value: &Value) -> Option<ClarificationOption> {
    if let Some(text) = value.as_str().map(str::trim).filter(|s| !s.is_empty()) {
        return Some(ClarificationOption::new(text, text, "", DEFAULT_CONFIDENCE));
    }
    let object = value.as_object()?;
    let text = |key: &str| {
        object
            .get(key)
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
    };
    let id = text("id")?;
    let title = text("title").unwrap_or(id);
    let confidence = object
        .get("confidence")
        .and_then(Value::as_f64)
        .unwrap_or(DEFAULT_CONFIDENCE);
    Some(ClarificationOption::new(
        id,
        title,
        text("subtitle").unwrap_or_default(),
        confidence,
    ))
}

#[async_trait]
impl ToolHandler for RequestClarificationTool {
    fn definition(&self) -> ToolDefinition {
        definitions::request_clarification_tool()
    }

    async fn handle(&self, call: &ToolCall, _ctx: &ToolContext) -> Result<ToolResult, ToolExecutionError> {
        self.run(call).or_else(recover)
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::*;
    use super::*;
    use crate::domain::foundation::ErrorKind;
    use serde_json::json;

    async fn ask(params: Value) -> ToolResult {
        RequestClarificationTool
            .handle(&ToolCall::new("request_clarification", params), &ctx(0))
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn builds_payload_from_options() {
        let result = ask(json!({
            "question": "Which meeting?",
            "options": [
                {"id": "standup", "title": "Daily standup", "confidence": 0.4},
                {"id": "retro", "title": "Retro", "subtitle": "Friday"},
                "planning",
                {"title": "no id"}
            ]
        }))
        .await;

        let payload = result.clarification().unwrap();
        assert_eq!(payload.reason, "Which meeting?");
        let ids: Vec<_> = payload.options.iter().map(|o| o.id.as_str()).collect();
        assert_eq!(ids, vec!["retro", "planning", "standup"]);
        assert_eq!(payload.options[0].subtitle, "Friday");
    }

    #[tokio::test]
    async fn empty_options_fail_validation() {
        let result = ask(json!({"question": "Which one?", "options": []})).await;
        assert_eq!(result.error().unwrap().code, ErrorKind::ValidationError);
    }

    #[tokio::test]
    async fn missing_options_fail_validation() {
        let result = ask(json!({"question": "Which one?"})).await;
        assert_eq!(result.error().unwrap().code, ErrorKind::ValidationError);
    }
}
