//! Names of the built-in tools.

pub const LOOKUP_CONTACTS: &str = "lookup_contacts";
pub const RESOLVE_CONVERSATION: &str = "resolve_conversation";
pub const SEND_MESSAGE: &str = "send_message";
pub const SUMMARIZE_CONVERSATION: &str = "summarize_conversation";
pub const ANALYZE_CONVERSATION: &str = "analyze_conversation";
pub const ANALYZE_CONVERSATIONS_MULTI: &str = "analyze_conversations_multi";
pub const REQUEST_CLARIFICATION: &str = "request_clarification";
pub const GET_CONVERSATIONS: &str = "get_conversations";
pub const GET_MESSAGES: &str = "get_messages";

/// All built-in tool names in catalogue order.
pub const ALL: [&str; 9] = [
    LOOKUP_CONTACTS,
    RESOLVE_CONVERSATION,
    SEND_MESSAGE,
    SUMMARIZE_CONVERSATION,
    ANALYZE_CONVERSATION,
    ANALYZE_CONVERSATIONS_MULTI,
    REQUEST_CLARIFICATION,
    GET_CONVERSATIONS,
    GET_MESSAGES,
];
