//! Contact Directory Port - Read access to the user's contacts.

use async_trait::async_trait;

use crate::domain::foundation::UserId;
use crate::domain::messaging::Contact;

use super::StoreError;

/// Port for looking up who a user can message.
#[async_trait]
pub trait ContactDirectory: Send + Sync {
    /// Lists every contact of `user_id`.
    async fn list_contacts(&self, user_id: &UserId) -> Result<Vec<Contact>, StoreError>;
}
