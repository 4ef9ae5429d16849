//! In-Memory Contact Directory

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::foundation::UserId;
use crate::domain::messaging::Contact;
use crate::ports::{ContactDirectory, StoreError};

/// In-memory contact lists keyed by owner.
#[derive(Debug, Clone, Default)]
pub struct InMemoryContactDirectory {
    contacts: Arc<RwLock<HashMap<UserId, Vec<Contact>>>>,
}

impl InMemoryContactDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a contact to `owner`'s list, replacing any entry with the same id.
    pub async fn add_contact(&self, owner: &UserId, contact: Contact) {
        let mut contacts = self.contacts.write().await;
        let list = contacts.entry(owner.clone()).or_default();
        list.retain(|c| c.id != contact.id);
        list.push(contact);
    }
}

#[async_trait]
impl ContactDirectory for InMemoryContactDirectory {
    async fn list_contacts(&self, user_id: &UserId) -> Result<Vec<Contact>, StoreError> {
        Ok(self
            .contacts
            .read()
            .await
            .get(user_id)
            .cloned()
            .unwrap_or_default())
    }
}
