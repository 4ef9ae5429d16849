//! Commands HTTP adapter - REST API for natural-language commands.
//!
//! Provides endpoints for:
//! - Invoking a command (and resuming after a clarification)
//! - Liveness checks

pub mod dto;
pub mod handlers;
pub mod routes;

pub use dto::*;

pub use handlers::CommandsAppState;
pub use routes::{commands_router, commands_routes};
