//! HTTP handlers for command endpoints.

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use crate::application::{InvokeCommand, InvokeCommandHandler};
use crate::domain::orchestration::{AppContext, Screen};

use super::dto::{ErrorResponse, HealthResponse, InvokeCommandRequest, InvokeCommandResponse};

/// Application state for command endpoints.
#[derive(Clone)]
pub struct CommandsAppState {
    pub handler: Arc<InvokeCommandHandler>,
}

impl CommandsAppState {
    pub fn new(handler: Arc<InvokeCommandHandler>) -> Self {
        Self { handler }
    }
}

/// Run a command.
///
/// POST /commands
///
/// Engine outcomes, failures included, are 200 responses carrying
/// `success` and `action`. Only bodies that cannot be read are rejected.
pub async fn invoke_command(
    State(state): State<CommandsAppState>,
    payload: Result<Json<InvokeCommandRequest>, JsonRejection>,
) -> Response {
    let Json(request) = match payload {
        Ok(json) => json,
        Err(rejection) => {
            tracing::debug!(error = %rejection.body_text(), "Rejected command body");
            return (
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse::bad_request("Request body must be {command, appContext}")
                    .with_details(serde_json::json!({"reason": rejection.body_text()}))),
            )
                .into_response();
        }
    };

    let context = request
        .app_context
        .unwrap_or_else(|| AppContext::new("", Screen::Other));
    let result = state
        .handler
        .handle(InvokeCommand {
            command: request.command,
            context,
        })
        .await;

    (StatusCode::OK, Json(InvokeCommandResponse::from(result))).into_response()
}

/// Liveness check.
///
/// GET /health
pub async fn health() -> impl IntoResponse {
    Json(HealthResponse::ok())
}
