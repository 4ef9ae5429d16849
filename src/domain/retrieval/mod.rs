//! Retrieval module - Context assembly and relevance scoring for
//! question answering over conversations.

mod context;
mod extraction;
mod relevance;

pub use context::{RetrievalSettings, RetrievedContext, VectorHit};
pub use extraction::{
    extraction_system_prompt, extraction_user_message, parse_extraction, Extraction,
};
pub use relevance::{
    decide, recency_only, recency_score, score_conversations, ConversationScore,
    RelevanceDecision, RelevanceSettings,
};
