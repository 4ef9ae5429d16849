//! Command orchestrator HTTP server.

use std::sync::Arc;
use std::time::Duration;

use axum::http::HeaderValue;
use tokio::net::TcpListener;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use command_orchestrator::adapters::http::{commands_router, CommandsAppState};
use command_orchestrator::adapters::memory::{
    seed_demo_data, InMemoryContactDirectory, InMemoryConversationStore, InMemoryVectorIndex,
};
use command_orchestrator::adapters::{MockAIProvider, OpenAIConfig, OpenAIProvider};
use command_orchestrator::application::{
    register_builtin_tools, InvokeCommandHandler, OrchestratorSettings, ToolDependencies,
    ToolRegistry,
};
use command_orchestrator::config::{AiConfig, AiProvider, AppConfig, Environment, ServerConfig};
use command_orchestrator::ports::AIProvider as CompletionProvider;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load()?;
    init_tracing(&config.server);
    config.validate()?;

    let store = InMemoryConversationStore::new();
    let directory = InMemoryContactDirectory::new();
    let index = InMemoryVectorIndex::new(store.clone());
    if config.server.environment == Environment::Development {
        let user = seed_demo_data(&store, &directory).await?;
        tracing::info!(user_id = %user, "Demo data loaded");
    }

    let ai = ai_provider(&config.ai)?;
    let deps = ToolDependencies::new(
        Arc::new(store),
        Arc::new(directory),
        Arc::new(index),
        Arc::clone(&ai),
    )
    .with_fuzzy(config.engine.fuzzy)
    .with_retrieval(config.engine.retrieval)
    .with_relevance(config.engine.relevance);

    let mut registry = ToolRegistry::new();
    register_builtin_tools(&mut registry, &deps)?;
    tracing::info!(tools = ?registry.tool_names(), "Tools registered");

    let handler = InvokeCommandHandler::new(
        Arc::new(registry),
        ai,
        OrchestratorSettings {
            max_chain_length: config.engine.max_chain_length,
            planner_timeout: config.engine.planner_timeout(),
            tool_timeout: config.engine.tool_timeout(),
        },
    );

    let app = commands_router(CommandsAppState::new(Arc::new(handler)))
        .layer(TimeoutLayer::new(Duration::from_secs(
            config.server.request_timeout_secs,
        )))
        .layer(cors_layer(&config.server))
        .layer(TraceLayer::new_for_http());

    let addr = config.server.socket_addr()?;
    let listener = TcpListener::bind(addr).await?;
    tracing::info!(%addr, environment = ?config.server.environment, "Listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

fn init_tracing(server: &ServerConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(server.log_level.as_str()));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    if server.is_production() {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn ai_provider(config: &AiConfig) -> Result<Arc<dyn CompletionProvider>, Box<dyn std::error::Error>> {
    match (&config.provider, &config.openai_api_key) {
        (AiProvider::OpenAI, Some(key)) => {
            let provider = OpenAIProvider::new(
                OpenAIConfig::from_secret(key.clone())
                    .with_model(config.model.as_str())
                    .with_base_url(config.base_url.as_str())
                    .with_timeout(config.timeout())
                    .with_max_retries(config.max_retries),
            )?;
            tracing::info!(model = %config.model, "Using OpenAI-compatible provider");
            Ok(Arc::new(provider))
        }
        _ => {
            tracing::warn!("Using mock AI provider; commands will not be planned by a real model");
            Ok(Arc::new(MockAIProvider::new()))
        }
    }
}

fn cors_layer(server: &ServerConfig) -> CorsLayer {
    let origins: Vec<HeaderValue> = server
        .cors_origins_list()
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();
    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);
    if origins.is_empty() {
        layer.allow_origin(Any)
    } else {
        layer.allow_origin(AllowOrigin::list(origins))
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
    }
}
