//! Application handlers.
//!
//! Command handlers that drive the engine for one request.

mod invoke_command;

pub use invoke_command::{
    InvokeCommand, InvokeCommandHandler, InvokeCommandResult, OrchestratorSettings,
};
