//! Application context snapshot sent with every command.
//!
//! The engine keeps nothing between invocations; whatever it needs to know
//! about "where the user is" arrives here.

use serde::{Deserialize, Serialize};

use crate::domain::tools::{ClarificationResponse, ClarificationState};

/// Screen the user issued the command from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Screen {
    Conversation,
    ConversationList,
    Contacts,
    Profile,
    Settings,
    #[default]
    #[serde(other)]
    Other,
}

impl Screen {
    /// Returns true for screens showing a single conversation.
    pub fn is_conversation_view(&self) -> bool {
        matches!(self, Screen::Conversation)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Screen::Conversation => "conversation",
            Screen::ConversationList => "conversation_list",
            Screen::Contacts => "contacts",
            Screen::Profile => "profile",
            Screen::Settings => "settings",
            Screen::Other => "other",
        }
    }
}

impl std::fmt::Display for Screen {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Caller-supplied state for one invocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppContext {
    #[serde(default)]
    pub current_screen: Screen,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_conversation_id: Option<String>,

    /// Missing on the wire deserializes to empty and fails pre-flight
    #[serde(default)]
    pub current_user_id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub clarification_response: Option<ClarificationResponse>,
}

impl AppContext {
    /// Creates a context for a user on a screen.
    pub fn new(user_id: impl Into<String>, screen: Screen) -> Self {
        Self {
            current_screen: screen,
            current_conversation_id: None,
            current_user_id: user_id.into(),
            clarification_response: None,
        }
    }

    /// Sets the open conversation.
    pub fn with_conversation(mut self, conversation_id: impl Into<String>) -> Self {
        self.current_conversation_id = Some(conversation_id.into());
        self
    }

    /// Attaches the user's answer to a previous clarification.
    pub fn with_clarification_response(mut self, response: ClarificationResponse) -> Self {
        self.clarification_response = Some(response);
        self
    }

    /// Returns the open conversation id, ignoring blanks.
    pub fn conversation_id(&self) -> Option<&str> {
        self.current_conversation_id
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }

    /// Returns true if a conversation is open and identified.
    pub fn in_conversation(&self) -> bool {
        self.current_screen.is_conversation_view() && self.conversation_id().is_some()
    }

    /// Returns true if this invocation resumes a clarification.
    pub fn is_resume(&self) -> bool {
        self.clarification_response.is_some()
    }

    /// Returns the clarification state this invocation starts in.
    pub fn clarification_state(&self) -> ClarificationState {
        ClarificationState::at_start(self.clarification_response.as_ref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn deserializes_camel_case_wire_format() {
        let ctx: AppContext = serde_json::from_value(json!({
            "currentScreen": "conversation",
            "currentConversationId": "c-1",
            "currentUserId": "u-1"
        }))
        .unwrap();

        assert_eq!(ctx.current_screen, Screen::Conversation);
        assert_eq!(ctx.conversation_id(), Some("c-1"));
        assert!(ctx.in_conversation());
        assert!(!ctx.is_resume());
    }

    #[test]
    fn unknown_screen_becomes_other() {
        let ctx: AppContext = serde_json::from_value(json!({
            "currentScreen": "camera",
            "currentUserId": "u-1"
        }))
        .unwrap();

        assert_eq!(ctx.current_screen, Screen::Other);
    }

    #[test]
    fn missing_user_id_deserializes_empty() {
        let ctx: AppContext =
            serde_json::from_value(json!({"currentScreen": "contacts"})).unwrap();
        assert!(ctx.current_user_id.is_empty());
    }

    #[test]
    fn blank_conversation_id_is_ignored() {
        let ctx = AppContext::new("u-1", Screen::Conversation).with_conversation("  ");
        assert!(ctx.conversation_id().is_none());
        assert!(!ctx.in_conversation());
    }

    #[test]
    fn resume_state_is_resolved() {
        let ctx: AppContext = serde_json::from_value(json!({
            "currentScreen": "conversation_list",
            "currentUserId": "u-1",
            "clarificationResponse": {
                "selectedOption": {"id": "u-2", "title": "John Doe", "confidence": 0.8},
                "originalReason": "ambiguous_contact"
            }
        }))
        .unwrap();

        assert!(ctx.is_resume());
        assert_eq!(ctx.clarification_state(), ClarificationState::Resolved);
    }
}
