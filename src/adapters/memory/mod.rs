//! In-memory adapters for the collaborator ports.
//!
//! - `InMemoryConversationStore` - Conversations and messages
//! - `InMemoryContactDirectory` - Per-user contact lists
//! - `InMemoryVectorIndex` - Lexical similarity search over the store

mod contact_directory;
mod conversation_store;
mod demo;
mod vector_index;

pub use contact_directory::InMemoryContactDirectory;
pub use conversation_store::InMemoryConversationStore;
pub use demo::{seed_demo_data, DEMO_USER_ID};
pub use vector_index::InMemoryVectorIndex;
