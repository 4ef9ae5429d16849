//! Tool Definitions - Schemas for the built-in messaging tools.
//!
//! Handlers live in the application layer; these functions only describe
//! the tools so that the planner prompt, the chain validator and the
//! handlers agree on one schema.

use super::names;
use super::{ParameterType, ToolDefinition};

// ═══════════════════════════════════════════════════════════════════════════
// Tool Definitions - Contacts & Conversations
// ═══════════════════════════════════════════════════════════════════════════

/// Creates the lookup_contacts tool definition.
pub fn lookup_contacts_tool() -> ToolDefinition {
    ToolDefinition::new(
        names::LOOKUP_CONTACTS,
        "Find a contact by (partial) name. Pauses for clarification if several contacts match.",
    )
    .with_parameter(
        "name",
        ParameterType::String,
        "Name exactly as the user wrote it, e.g. \"John\"",
        true,
    )
    .with_output_fields(["contact_id", "display_name"])
}

/// Creates the resolve_conversation tool definition.
pub fn resolve_conversation_tool() -> ToolDefinition {
    ToolDefinition::new(
        names::RESOLVE_CONVERSATION,
        "Find the direct conversation between the current user and a contact.",
    )
    .with_parameter(
        "contact_id",
        ParameterType::String,
        "Contact id, normally \"$prev.contact_id\" after lookup_contacts",
        true,
    )
    .with_output_fields(["conversation_id", "title"])
}

/// Creates the get_conversations tool definition.
pub fn get_conversations_tool() -> ToolDefinition {
    ToolDefinition::new(
        names::GET_CONVERSATIONS,
        "List the user's most recently active conversations.",
    )
    .with_parameter(
        "limit",
        ParameterType::Integer,
        "Maximum number of conversations (default 10)",
        false,
    )
    .with_output_fields(["conversation_id", "conversations"])
}

/// Creates the get_messages tool definition.
pub fn get_messages_tool() -> ToolDefinition {
    ToolDefinition::new(names::GET_MESSAGES, "Read recent messages from one conversation.")
        .with_parameter(
            "conversation_id",
            ParameterType::String,
            "Conversation to read",
            true,
        )
        .with_parameter(
            "limit",
            ParameterType::Integer,
            "Maximum number of messages (default 20)",
            false,
        )
        .with_output_fields(["conversation_id", "messages"])
}

// ═══════════════════════════════════════════════════════════════════════════
// Tool Definitions - Actions
// ═══════════════════════════════════════════════════════════════════════════

/// Creates the send_message tool definition.
///
/// Either `recipient_id` or `conversation_id` must be supplied; the handler
/// enforces that since the schema has no "one of" notion.
pub fn send_message_tool() -> ToolDefinition {
    ToolDefinition::new(
        names::SEND_MESSAGE,
        "Send a message to a contact or into a conversation.",
    )
    .with_parameter(
        "content",
        ParameterType::String,
        "Message text only, without the recipient's name or the verb (\"I'm on my way\")",
        true,
    )
    .with_parameter(
        "recipient_id",
        ParameterType::String,
        "Contact id, normally \"$prev.contact_id\"",
        false,
    )
    .with_parameter(
        "conversation_id",
        ParameterType::String,
        "Conversation id, when the target conversation is already known",
        false,
    )
    .with_output_fields(["message_id", "conversation_id"])
}

/// Creates the request_clarification tool definition.
pub fn request_clarification_tool() -> ToolDefinition {
    ToolDefinition::new(
        names::REQUEST_CLARIFICATION,
        "Ask the user to choose between options when the command is ambiguous.",
    )
    .with_parameter(
        "question",
        ParameterType::String,
        "Question shown to the user",
        true,
    )
    .with_parameter(
        "options",
        ParameterType::Array,
        "Choices as [{\"id\", \"title\", \"subtitle\"}]",
        true,
    )
}

// ═══════════════════════════════════════════════════════════════════════════
// Tool Definitions - Reading & Reasoning
// ═══════════════════════════════════════════════════════════════════════════

/// Creates the summarize_conversation tool definition.
pub fn summarize_conversation_tool() -> ToolDefinition {
    ToolDefinition::new(
        names::SUMMARIZE_CONVERSATION,
        "Summarize the recent messages of one conversation.",
    )
    .with_parameter(
        "conversation_id",
        ParameterType::String,
        "Conversation to summarize",
        true,
    )
    .with_parameter(
        "limit",
        ParameterType::Integer,
        "Number of recent messages to consider (default 50)",
        false,
    )
    .with_output_fields(["summary", "message_count"])
}

/// Creates the analyze_conversation tool definition.
pub fn analyze_conversation_tool() -> ToolDefinition {
    ToolDefinition::new(
        names::ANALYZE_CONVERSATION,
        "Answer a question using the messages of ONE known conversation.",
    )
    .with_parameter(
        "conversation_id",
        ParameterType::String,
        "Conversation to search",
        true,
    )
    .with_parameter(
        "query",
        ParameterType::String,
        "The user's question",
        true,
    )
    .with_output_fields([
        "answer",
        "confidence",
        "supporting_message_ids",
        "conversation_id",
    ])
}

/// Creates the analyze_conversations_multi tool definition.
pub fn analyze_conversations_multi_tool() -> ToolDefinition {
    ToolDefinition::new(
        names::ANALYZE_CONVERSATIONS_MULTI,
        "Answer a question by searching ALL of the user's recent conversations. Use when no conversation is open.",
    )
    .with_parameter(
        "query",
        ParameterType::String,
        "The user's question",
        true,
    )
    .with_parameter(
        "time_window_hours",
        ParameterType::Integer,
        "Only consider messages from the last N hours (0 = no limit)",
        false,
    )
    .with_output_fields([
        "answer",
        "confidence",
        "supporting_message_ids",
        "conversation_id",
    ])
}

/// Returns every built-in definition in catalogue order.
pub fn builtin_tools() -> Vec<ToolDefinition> {
    vec![
        lookup_contacts_tool(),
        resolve_conversation_tool(),
        send_message_tool(),
        summarize_conversation_tool(),
        analyze_conversation_tool(),
        analyze_conversations_multi_tool(),
        request_clarification_tool(),
        get_conversations_tool(),
        get_messages_tool(),
    ]
}
