//! Axum router configuration for command endpoints.

use axum::{
    routing::{get, post},
    Router,
};

use super::handlers::{health, invoke_command, CommandsAppState};

/// Create the command API routes.
///
/// # Routes
///
/// - `POST /commands` - Run or resume a command
/// - `GET /health` - Liveness check
pub fn commands_routes() -> Router<CommandsAppState> {
    Router::new()
        .route("/commands", post(invoke_command))
        .route("/health", get(health))
}

/// Create the command router with its state applied.
///
/// # Example
///
/// ```ignore
/// let app = commands_router(CommandsAppState::new(handler))
///     .layer(TraceLayer::new_for_http());
/// ```
pub fn commands_router(state: CommandsAppState) -> Router {
    commands_routes().with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn routes_are_defined() {
        let _router = commands_routes();
    }
}
