//! Caller-facing invocation response.

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use crate::domain::foundation::ErrorInfo;
use crate::domain::tools::names::{
    ANALYZE_CONVERSATION, ANALYZE_CONVERSATIONS_MULTI, GET_CONVERSATIONS, GET_MESSAGES,
    LOOKUP_CONTACTS, RESOLVE_CONVERSATION, SEND_MESSAGE, SUMMARIZE_CONVERSATION,
};
use crate::domain::tools::{reasons, ClarificationOption, ClarificationPayload, ToolResult};

/// What the UI should do with a response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseAction {
    Navigate,
    ShowSummary,
    ShowClarification,
    ShowAnalysis,
    ShowError,
}

impl ResponseAction {
    /// Action for a chain that completed on `tool`.
    pub fn for_tool(tool: &str) -> Self {
        match tool {
            SUMMARIZE_CONVERSATION => Self::ShowSummary,
            ANALYZE_CONVERSATION | ANALYZE_CONVERSATIONS_MULTI => Self::ShowAnalysis,
            _ => Self::Navigate,
        }
    }
}

/// Result of one invocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommandResponse {
    pub success: bool,
    pub response: String,
    pub action: ResponseAction,
    pub payload: Value,
}

impl CommandResponse {
    /// Response for a chain that completed on `tool`.
    pub fn completed(tool: &str, result: &ToolResult) -> Self {
        let data = result.data().cloned().unwrap_or_default();
        let response = describe_completion(tool, &data);

        let mut payload = data;
        payload.insert("tool".to_string(), json!(tool));
        if !result.metadata().is_empty() {
            payload.insert("metadata".to_string(), Value::Object(result.metadata().clone()));
        }

        Self {
            success: true,
            response,
            action: ResponseAction::for_tool(tool),
            payload: Value::Object(payload),
        }
    }

    /// Response for a paused chain.
    pub fn clarification(payload: &ClarificationPayload) -> Self {
        let response = match payload.reason.as_str() {
            reasons::AMBIGUOUS_CONTACT => "Several contacts match. Which one did you mean?".to_string(),
            reasons::MULTIPLE_CONVERSATIONS => {
                "Several conversations could answer this. Which one should I look in?".to_string()
            }
            other => other.to_string(),
        };
        Self {
            success: true,
            response,
            action: ResponseAction::ShowClarification,
            payload: serde_json::to_value(payload).unwrap_or(Value::Null),
        }
    }

    /// Response when the user's choice needs no further tools.
    pub fn selected(option: &ClarificationOption) -> Self {
        Self {
            success: true,
            response: format!("Opening {}", option.title),
            action: ResponseAction::Navigate,
            payload: json!({"id": option.id, "title": option.title}),
        }
    }

    /// Merges tool metadata into `payload.metadata`.
    pub fn with_metadata(mut self, metadata: &Map<String, Value>) -> Self {
        if metadata.is_empty() {
            return self;
        }
        if let Value::Object(payload) = &mut self.payload {
            let entry = payload
                .entry("metadata")
                .or_insert_with(|| Value::Object(Map::new()));
            if let Value::Object(existing) = entry {
                existing.extend(metadata.iter().map(|(k, v)| (k.clone(), v.clone())));
            }
        }
        self
    }

    /// Response for a failed invocation.
    pub fn failed(error: &ErrorInfo) -> Self {
        Self {
            success: false,
            response: error.message.clone(),
            action: ResponseAction::ShowError,
            payload: serde_json::to_value(error).unwrap_or(Value::Null),
        }
    }
}

fn describe_completion(tool: &str, data: &Map<String, Value>) -> String {
    let text = |field: &str| data.get(field).and_then(Value::as_str).map(str::to_string);
    let count = |field: &str| data.get(field).and_then(Value::as_array).map_or(0, Vec::len);

    match tool {
        SEND_MESSAGE => "Message sent".to_string(),
        LOOKUP_CONTACTS => text("display_name")
            .map(|name| format!("Found {}", name))
            .unwrap_or_else(|| "Contact found".to_string()),
        RESOLVE_CONVERSATION => text("title")
            .map(|title| format!("Opening {}", title))
            .unwrap_or_else(|| "Conversation found".to_string()),
        GET_CONVERSATIONS => format!("Found {} conversations", count("conversations")),
        GET_MESSAGES => format!("Loaded {} messages", count("messages")),
        SUMMARIZE_CONVERSATION => text("summary").unwrap_or_else(|| "No summary available".to_string()),
        _ => text("answer")
            .or_else(|| text("message"))
            .unwrap_or_else(|| "Done".to_string()),
    }
}
