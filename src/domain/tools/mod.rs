//! Tools module - Value objects shared by planner, validator and executor.
//!
//! - [`ToolDefinition`] - Schema of a tool
//! - [`ToolCall`] - A planned invocation
//! - [`ToolResult`] - Outcome and control signal of an invocation
//! - [`ClarificationPayload`] - Pause request with scored options

mod clarification;
pub mod definitions;
pub mod names;
mod tool_call;
mod tool_definition;
mod tool_result;

pub use clarification::{
    reasons, ClarificationOption, ClarificationPayload, ClarificationResponse,
    ClarificationState, RESUME_STEPS_KEY,
};
pub use tool_call::ToolCall;
pub use tool_definition::{ParameterSpec, ParameterType, ToolDefinition};
pub use tool_result::{NextAction, ToolResult};
