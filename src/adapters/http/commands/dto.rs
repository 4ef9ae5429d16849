//! Data transfer objects for command endpoints.

use serde::{Deserialize, Serialize};

use crate::application::InvokeCommandResult;
use crate::domain::orchestration::{AppContext, ResponseAction};

// ═══════════════════════════════════════════════════════════════════════════
// Request DTOs
// ═══════════════════════════════════════════════════════════════════════════

/// Request to run a command.
///
/// Resuming after a clarification is the same request with
/// `appContext.clarificationResponse` set.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvokeCommandRequest {
    /// Free text as the user typed it
    pub command: String,
    /// Snapshot of where the user is in the app
    #[serde(default)]
    pub app_context: Option<AppContext>,
}

// ═══════════════════════════════════════════════════════════════════════════
// Response DTOs
// ═══════════════════════════════════════════════════════════════════════════

/// Response to a command.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvokeCommandResponse {
    pub success: bool,
    /// Short text for the user
    pub response: String,
    pub action: ResponseAction,
    pub payload: serde_json::Value,
    /// Correlates the response with server logs
    pub trace_id: String,
}

impl From<InvokeCommandResult> for InvokeCommandResponse {
    fn from(result: InvokeCommandResult) -> Self {
        Self {
            success: result.response.success,
            response: result.response.response,
            action: result.response.action,
            payload: result.response.payload,
            trace_id: result.trace_id,
        }
    }
}

/// Liveness response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

impl HealthResponse {
    pub fn ok() -> Self {
        Self {
            status: "ok".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

/// Error body for requests the engine never saw.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ErrorResponse {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            code: "BAD_REQUEST".to_string(),
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }
}
