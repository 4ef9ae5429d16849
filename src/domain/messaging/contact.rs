//! Contact record.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::UserId;

/// A user the current user can message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contact {
    pub id: UserId,
    pub display_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

impl Contact {
    pub fn new(id: UserId, display_name: impl Into<String>) -> Self {
        Self {
            id,
            display_name: display_name.into(),
            email: None,
        }
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    /// Secondary label for clarification options.
    pub fn subtitle(&self) -> String {
        self.email.clone().unwrap_or_default()
    }
}
