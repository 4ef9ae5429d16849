//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the engine and the outside world. Adapters implement these ports.
//!
//! ## Collaborator Ports
//!
//! - `ConversationStore` - Conversations and messages
//! - `ContactDirectory` - The user's contacts
//! - `VectorIndex` - Semantic search over messages
//! - `AIProvider` - LLM completions for planning, extraction and summaries
//!
//! ## Tool Port
//!
//! - `ToolHandler` - One executable tool, dispatched by name

mod ai_provider;
mod contact_directory;
mod conversation_store;
mod tool_handler;
mod vector_index;

pub use ai_provider::{
    AIError, AIProvider, ChatMessage, CompletionPurpose, CompletionRequest, CompletionResponse,
    FinishReason, MessageRole, ProviderInfo, RequestMetadata, TokenUsage,
};
pub use contact_directory::ContactDirectory;
pub use conversation_store::{ConversationStore, StoreError};
pub use tool_handler::{ToolContext, ToolExecutionError, ToolHandler};
pub use vector_index::{VectorIndex, VectorIndexError, VectorQuery};
