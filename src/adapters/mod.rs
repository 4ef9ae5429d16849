//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the engine to external systems:
//! - `ai` - Language model providers (OpenAI-compatible, mock)
//! - `memory` - In-memory store, contact directory and vector index
//! - `http` - REST surface (axum)

pub mod ai;
pub mod http;
pub mod memory;

pub use ai::{MockAIProvider, OpenAIConfig, OpenAIProvider};
pub use memory::{InMemoryContactDirectory, InMemoryConversationStore, InMemoryVectorIndex};
