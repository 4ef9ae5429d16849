//! Tool Handler Port - Interface for executing one tool.
//!
//! Each built-in tool is a handler registered under its definition's name.
//! A handler returns `Ok(ToolResult)` for every outcome it understands,
//! including "not found" and "please clarify"; `Err` is reserved for
//! failures it could not turn into a result.
//!
//! # Example
//!
//! ```ignore
//! use async_trait::async_trait;
//!
//! struct Ping;
//!
//! #[async_trait]
//! impl ToolHandler for Ping {
//!     fn definition(&self) -> ToolDefinition {
//!         ToolDefinition::new("ping", "Replies pong")
//!     }
//!
//!     async fn handle(&self, _call: &ToolCall, ctx: &ToolContext) -> Result<ToolResult, ToolExecutionError> {
//!         Ok(ToolResult::continue_or_complete(json!({"reply": "pong"}), ctx.remaining_steps))
//!     }
//! }
//! ```

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::foundation::{ConversationId, ErrorInfo, ErrorKind, UserId, ValidationError};
use crate::domain::tools::{ToolCall, ToolDefinition, ToolResult};

use super::{AIError, StoreError};

/// Port for a single executable tool.
#[async_trait]
pub trait ToolHandler: Send + Sync {
    /// Schema of the tool. Must be stable for the lifetime of the handler.
    fn definition(&self) -> ToolDefinition;

    /// Executes the tool.
    async fn handle(&self, call: &ToolCall, ctx: &ToolContext)
        -> Result<ToolResult, ToolExecutionError>;
}

/// What a tool knows about the invocation it runs in.
#[derive(Debug, Clone)]
pub struct ToolContext {
    /// User the command came from
    pub user_id: UserId,
    /// Conversation open on screen, if any
    pub current_conversation_id: Option<ConversationId>,
    /// Original command text
    pub command: String,
    /// Steps planned after this one
    pub remaining_steps: usize,
    /// Trace ID shared by every call in one invocation
    pub trace_id: String,
}

impl ToolContext {
    pub fn new(user_id: UserId, command: impl Into<String>, trace_id: impl Into<String>) -> Self {
        Self {
            user_id,
            current_conversation_id: None,
            command: command.into(),
            remaining_steps: 0,
            trace_id: trace_id.into(),
        }
    }

    pub fn with_conversation(mut self, conversation_id: Option<ConversationId>) -> Self {
        self.current_conversation_id = conversation_id;
        self
    }

    /// Returns a copy positioned at a step with `remaining` steps after it.
    pub fn at_step(&self, remaining: usize) -> Self {
        Self {
            remaining_steps: remaining,
            ..self.clone()
        }
    }

    /// Returns true if this is the last planned step.
    pub fn is_last_step(&self) -> bool {
        self.remaining_steps == 0
    }
}

/// Errors that can occur during tool execution.
#[derive(Debug, Error)]
pub enum ToolExecutionError {
    /// Tool not found
    #[error("Tool not found: {0}")]
    ToolNotFound(String),

    /// Parameter validation failed
    #[error("Validation error: {0}")]
    ValidationFailed(#[from] ValidationError),

    /// Store or directory call failed
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Model call failed
    #[error("AI error: {0}")]
    AI(#[from] AIError),

    /// Infrastructure/system error
    #[error("System error: {0}")]
    SystemError(String),
}

impl ToolExecutionError {
    /// Creates a system error.
    pub fn system(message: impl Into<String>) -> Self {
        Self::SystemError(message.into())
    }

    /// Converts into a user-facing error description.
    pub fn to_error_info(&self) -> ErrorInfo {
        match self {
            Self::ToolNotFound(name) => {
                ErrorInfo::not_found(format!("No tool named '{}' is available", name))
            }
            Self::ValidationFailed(e) => ErrorInfo::validation(e.to_string()),
            Self::Store(StoreError::NotFound { entity, .. }) => {
                ErrorInfo::not_found(format!("That {} could not be found", entity))
            }
            Self::Store(StoreError::NotParticipant { .. }) => {
                ErrorInfo::not_found("That conversation could not be found")
            }
            Self::AI(AIError::Timeout { .. }) => ErrorInfo::new(ErrorKind::Timeout, self.to_string()),
            _ => ErrorInfo::tool_execution(self.to_string())
                .with_suggestion("Please try again in a moment"),
        }
    }
}
