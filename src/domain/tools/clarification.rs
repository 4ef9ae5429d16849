//! Clarification value objects.
//!
//! When a tool cannot proceed without the user choosing among candidates it
//! returns a [`ClarificationPayload`]. Nothing is persisted server-side: the
//! caller re-sends the original command with the chosen
//! [`ClarificationOption`] inside a [`ClarificationResponse`], and the engine
//! resumes from that alone.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::domain::foundation::StateMachine;

use super::ToolCall;

/// Well-known clarification reasons emitted by built-in tools.
pub mod reasons {
    /// Several contacts matched a name with similar confidence.
    pub const AMBIGUOUS_CONTACT: &str = "ambiguous_contact";
    /// Several conversations are relevant to a cross-conversation question.
    pub const MULTIPLE_CONVERSATIONS: &str = "multiple_conversations";
}

/// Metadata key under which remaining planned steps travel with an option.
pub const RESUME_STEPS_KEY: &str = "resume_steps";

/// An option presented to the user for disambiguation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClarificationOption {
    /// Opaque handle returned verbatim on resume (contact or conversation id)
    pub id: String,
    /// Primary display label
    pub title: String,
    /// Secondary display label
    #[serde(default)]
    pub subtitle: String,
    /// Match confidence in [0, 1]
    pub confidence: f64,
    /// Extra data carried through the round trip
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Map<String, Value>>,
}

impl ClarificationOption {
    /// Creates a new option. Confidence is clamped into [0, 1].
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        subtitle: impl Into<String>,
        confidence: f64,
    ) -> Self {
        let confidence = if confidence.is_nan() {
            0.0
        } else {
            confidence.clamp(0.0, 1.0)
        };
        Self {
            id: id.into(),
            title: title.into(),
            subtitle: subtitle.into(),
            confidence,
            metadata: None,
        }
    }

    /// Adds a metadata entry.
    pub fn with_metadata(mut self, key: impl Into<String>, value: Value) -> Self {
        self.metadata
            .get_or_insert_with(Map::new)
            .insert(key.into(), value);
        self
    }

    /// Returns a metadata value.
    pub fn metadata_value(&self, key: &str) -> Option<&Value> {
        self.metadata.as_ref().and_then(|m| m.get(key))
    }

    /// Attaches the calls to run once this option is chosen.
    pub fn with_resume_steps(self, steps: &[ToolCall]) -> Self {
        match serde_json::to_value(steps) {
            Ok(value) => self.with_metadata(RESUME_STEPS_KEY, value),
            Err(_) => self,
        }
    }

    /// Returns the calls to run once this option is chosen.
    ///
    /// Malformed metadata yields an empty list.
    pub fn resume_steps(&self) -> Vec<ToolCall> {
        self.metadata_value(RESUME_STEPS_KEY)
            .cloned()
            .and_then(|v| serde_json::from_value(v).ok())
            .unwrap_or_default()
    }

    /// Returns true if resume steps were attached, even an empty list.
    pub fn has_resume_steps(&self) -> bool {
        self.metadata_value(RESUME_STEPS_KEY).is_some()
    }
}

/// Payload returned to the caller when execution pauses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClarificationPayload {
    /// Why the pause happened (see [`reasons`])
    pub reason: String,
    /// Candidates, highest confidence first
    pub options: Vec<ClarificationOption>,
}

impl ClarificationPayload {
    /// Creates a payload with options sorted by descending confidence.
    pub fn new(reason: impl Into<String>, mut options: Vec<ClarificationOption>) -> Self {
        options.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));
        Self {
            reason: reason.into(),
            options,
        }
    }

    /// Stamps the still-pending planned steps onto every option.
    ///
    /// Steps a tool attached itself run first, followed by `pending`. Options
    /// are stamped even when nothing is pending so a resume can tell "no
    /// further work" apart from metadata the caller failed to send back.
    pub fn with_resume_steps(mut self, pending: &[ToolCall]) -> Self {
        self.options = self
            .options
            .into_iter()
            .map(|option| {
                let mut steps = option.resume_steps();
                steps.extend_from_slice(pending);
                option.with_resume_steps(&steps)
            })
            .collect();
        self
    }
}

/// The caller's answer to a clarification, sent back with the original command.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClarificationResponse {
    pub selected_option: ClarificationOption,
    pub original_reason: String,
}

/// Lifecycle of a clarification across two stateless invocations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClarificationState {
    /// No clarification involved
    None,
    /// A tool asked the user to choose
    Pending,
    /// The caller returned a choice
    Resolved,
}

impl ClarificationState {
    /// Derives the state an invocation starts in.
    pub fn at_start(response: Option<&ClarificationResponse>) -> Self {
        if response.is_some() {
            Self::Resolved
        } else {
            Self::None
        }
    }

    /// Returns true if execution is paused on the user.
    pub fn is_pending(&self) -> bool {
        matches!(self, Self::Pending)
    }
}

impl StateMachine for ClarificationState {
    fn can_transition_to(&self, target: &Self) -> bool {
        use ClarificationState::*;
        matches!(
            (self, target),
            (None, Pending) | (Pending, Resolved) | (Resolved, Pending)
        )
    }

    fn valid_transitions(&self) -> Vec<Self> {
        use ClarificationState::*;
        match self {
            None => vec![Pending],
            Pending => vec![Resolved],
            Resolved => vec![Pending],
        }
    }
}

impl std::fmt::Display for ClarificationState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::None => write!(f, "None"),
            Self::Pending => write!(f, "Pending"),
            Self::Resolved => write!(f, "Resolved"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn option_confidence_is_clamped() {
        assert_eq!(ClarificationOption::new("a", "A", "", 1.7).confidence, 1.0);
        assert_eq!(ClarificationOption::new("a", "A", "", -0.2).confidence, 0.0);
        assert_eq!(ClarificationOption::new("a", "A", "", f64::NAN).confidence, 0.0);
    }

    #[test]
    fn payload_sorts_options_descending() {
        let payload = ClarificationPayload::new(
            reasons::AMBIGUOUS_CONTACT,
            vec![
                ClarificationOption::new("u1", "John Smith", "", 0.7),
                ClarificationOption::new("u2", "John Doe", "", 0.9),
            ],
        );

        assert_eq!(payload.options[0].id, "u2");
        assert_eq!(payload.options[1].id, "u1");
    }

    #[test]
    fn resume_steps_roundtrip_through_metadata() {
        let steps = vec![ToolCall::new(
            "send_message",
            json!({"recipient_id": "$prev.contact_id", "content": "hi"}),
        )];
        let option = ClarificationOption::new("u1", "John", "", 0.8).with_resume_steps(&steps);

        assert_eq!(option.resume_steps(), steps);
    }

    #[test]
    fn malformed_resume_metadata_yields_no_steps() {
        let option = ClarificationOption::new("u1", "John", "", 0.8)
            .with_metadata(RESUME_STEPS_KEY, json!("garbage"));

        assert!(option.resume_steps().is_empty());
    }

    #[test]
    fn pending_steps_follow_tool_supplied_steps() {
        let own = vec![ToolCall::new("analyze_conversation", json!({"query": "q"}))];
        let planned = vec![ToolCall::new("send_message", json!({"content": "x"}))];
        let payload = ClarificationPayload::new(
            reasons::MULTIPLE_CONVERSATIONS,
            vec![
                ClarificationOption::new("c1", "Team", "", 0.9).with_resume_steps(&own),
                ClarificationOption::new("c2", "Family", "", 0.8),
            ],
        )
        .with_resume_steps(&planned);

        let mut chained = own.clone();
        chained.extend(planned.clone());
        assert_eq!(payload.options[0].resume_steps(), chained);
        assert_eq!(payload.options[1].resume_steps(), planned);
    }

    #[test]
    fn nothing_pending_still_marks_options() {
        let payload = ClarificationPayload::new(
            reasons::AMBIGUOUS_CONTACT,
            vec![ClarificationOption::new("u1", "John Smith", "", 0.9)],
        )
        .with_resume_steps(&[]);

        assert!(payload.options[0].has_resume_steps());
        assert!(payload.options[0].resume_steps().is_empty());
        assert!(!ClarificationOption::new("u2", "John Doe", "", 0.9).has_resume_steps());
    }

    #[test]
    fn response_uses_camel_case_on_the_wire() {
        let json = json!({
            "selectedOption": {"id": "u1", "title": "John", "confidence": 0.5},
            "originalReason": "ambiguous_contact"
        });
        let response: ClarificationResponse = serde_json::from_value(json).unwrap();

        assert_eq!(response.selected_option.id, "u1");
        assert_eq!(response.selected_option.subtitle, "");
        assert_eq!(response.original_reason, reasons::AMBIGUOUS_CONTACT);
    }

    #[test]
    fn state_transitions() {
        assert_eq!(ClarificationState::at_start(None), ClarificationState::None);
        assert!(ClarificationState::None.can_transition_to(&ClarificationState::Pending));
        assert!(ClarificationState::Pending.can_transition_to(&ClarificationState::Resolved));
        assert!(!ClarificationState::None.can_transition_to(&ClarificationState::Resolved));
        assert!(ClarificationState::Resolved
            .transition_to(ClarificationState::None)
            .is_err());
    }
}
