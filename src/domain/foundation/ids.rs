//! Strongly-typed identifier value objects.
//!
//! Identifiers are issued by external collaborators (the conversation store
//! and the contact directory), so they are opaque strings rather than UUIDs.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::ValidationError;

macro_rules! string_id {
    ($(#[$doc:meta])* $name:ident, $field:literal) => {
        $(#[$doc])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Creates a new identifier, returning error if blank.
            pub fn new(id: impl Into<String>) -> Result<Self, ValidationError> {
                let id = id.into();
                if id.trim().is_empty() {
                    return Err(ValidationError::empty_field($field));
                }
                Ok(Self(id))
            }

            /// Returns the inner string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

string_id!(
    /// Identifier of an application user (also used for contacts).
    UserId,
    "user_id"
);

string_id!(
    /// Identifier of a conversation in the conversation store.
    ConversationId,
    "conversation_id"
);

string_id!(
    /// Identifier of a single message.
    MessageId,
    "message_id"
);

impl MessageId {
    /// Generates a fresh random message id.
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }
}
