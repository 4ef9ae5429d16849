//! Extraction step contract.
//!
//! The model answers a question from a transcript and cites message ids.
//! Its reply is untrusted: confidence is clamped and citations of messages
//! that were never shown are dropped.

use serde::{Deserialize, Serialize};

use super::RetrievedContext;

/// Answer produced from retrieved messages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Extraction {
    pub answer: String,
    pub confidence: f64,
    #[serde(default)]
    pub supporting_message_ids: Vec<String>,
}

impl Extraction {
    /// Answer used when there is nothing to read.
    pub fn nothing_found() -> Self {
        Self {
            answer: "I couldn't find anything about that in the conversation.".to_string(),
            confidence: 0.0,
            supporting_message_ids: Vec::new(),
        }
    }

    /// Clamps confidence and drops citations outside the context.
    pub fn sanitized(mut self, context: &RetrievedContext) -> Self {
        self.confidence = if self.confidence.is_nan() {
            0.0
        } else {
            self.confidence.clamp(0.0, 1.0)
        };
        self.supporting_message_ids.retain(|id| context.contains(id));
        self.supporting_message_ids.dedup();
        self
    }
}

/// System prompt for the extraction step.
pub fn extraction_system_prompt() -> &'static str {
    "You answer questions about a chat conversation using ONLY the transcript provided. \
     Each line starts with the message id in square brackets. \
     Reply with JSON only: {\"answer\": string, \"confidence\": number between 0 and 1, \
     \"supporting_message_ids\": [ids of the lines you used]}. \
     If the transcript does not contain the answer, say so and use a confidence below 0.3."
}

/// User message for the extraction step.
pub fn extraction_user_message(query: &str, context: &RetrievedContext) -> String {
    format!(
        "Question: {}\n\nTranscript:\n{}",
        query.trim(),
        context.transcript()
    )
}

/// Parses the model's reply.
pub fn parse_extraction(reply: &str) -> Result<Extraction, String> {
    let start = reply.find('{').ok_or("extraction reply contained no JSON")?;
    let end = reply.rfind('}').ok_or("extraction reply contained no JSON")?;
    if end < start {
        return Err("extraction reply contained no JSON".to_string());
    }
    serde_json::from_str(&reply[start..=end])
        .map_err(|e| format!("failed to parse extraction JSON: {}", e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::{ConversationId, MessageId, Timestamp, UserId};
    use crate::domain::messaging::Message;

    fn context() -> RetrievedContext {
        RetrievedContext::degraded(vec![Message {
            id: MessageId::new("m-1").unwrap(),
            conversation_id: ConversationId::new("c-1").unwrap(),
            sender_id: UserId::new("u-1").unwrap(),
            sender_name: "Sam".to_string(),
            content: "Dinner is Friday at 7".to_string(),
            sent_at: Timestamp::now(),
        }])
    }

    #[test]
    fn parses_fenced_reply() {
        let reply = "```json\n{\"answer\": \"Friday at 7\", \"confidence\": 0.9, \"supporting_message_ids\": [\"m-1\"]}\n```";
        let extraction = parse_extraction(reply).unwrap();

        assert_eq!(extraction.answer, "Friday at 7");
        assert_eq!(extraction.supporting_message_ids, vec!["m-1".to_string()]);
    }

    #[test]
    fn missing_citations_default_to_empty() {
        let extraction = parse_extraction(r#"{"answer": "no idea", "confidence": 0.1}"#).unwrap();
        assert!(extraction.supporting_message_ids.is_empty());
    }

    #[test]
    fn rejects_prose() {
        assert!(parse_extraction("Friday, I think").is_err());
    }

    #[test]
    fn sanitize_clamps_and_drops_unknown_ids() {
        let extraction = Extraction {
            answer: "Friday".to_string(),
            confidence: 1.4,
            supporting_message_ids: vec!["m-1".to_string(), "m-404".to_string()],
        }
        .sanitized(&context());

        assert_eq!(extraction.confidence, 1.0);
        assert_eq!(extraction.supporting_message_ids, vec!["m-1".to_string()]);
    }

    #[test]
    fn user_message_contains_transcript() {
        let message = extraction_user_message(" When is dinner? ", &context());
        assert!(message.starts_with("Question: When is dinner?"));
        assert!(message.contains("[m-1]"));
    }
}
