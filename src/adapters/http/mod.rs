//! HTTP adapters - REST API implementations.

pub mod commands;

pub use commands::{commands_router, CommandsAppState};
