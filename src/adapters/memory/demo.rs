//! Demo data for local development.
//!
//! Seeds one user with a handful of contacts and conversations so the
//! server can be exercised without a real messaging backend.

use crate::domain::foundation::{ConversationId, Timestamp, UserId};
use crate::domain::messaging::Contact;
use crate::ports::StoreError;

use super::{InMemoryContactDirectory, InMemoryConversationStore};

/// The user every demo conversation belongs to.
pub const DEMO_USER_ID: &str = "u-demo";

const PEOPLE: [(&str, &str); 4] = [
    ("u-john-smith", "John Smith"),
    ("u-john-doe", "John Doe"),
    ("u-sarah", "Sarah Connor"),
    ("u-mike", "Mike Chen"),
];

const MESSAGES: [(&str, &str, &str, i64); 6] = [
    ("c-demo-sarah", "u-sarah", "Are we still on for dinner on Friday?", 30),
    ("c-demo-sarah", DEMO_USER_ID, "Yes, Friday at 7 at Luigi's", 29),
    ("c-demo-mike", "u-mike", "The project deadline moved to Monday", 6),
    ("c-demo-mike", DEMO_USER_ID, "Thanks, I'll update the plan", 5),
    ("c-demo-john-smith", "u-john-smith", "Can you send me the slides before the meeting?", 3),
    ("c-demo-john-doe", "u-john-doe", "Good game last night", 1),
];

/// Seeds the demo user, contacts, conversations and messages.
pub async fn seed_demo_data(
    store: &InMemoryConversationStore,
    directory: &InMemoryContactDirectory,
) -> Result<UserId, StoreError> {
    let me = UserId::new(DEMO_USER_ID)?;
    store.add_user(&me, "Demo User").await;

    for (id, name) in PEOPLE {
        let user = UserId::new(id)?;
        store.add_user(&user, name).await;
        directory
            .add_contact(
                &me,
                Contact::new(user.clone(), name).with_email(format!("{}@example.com", &id[2..])),
            )
            .await;
        let conversation = ConversationId::new(format!("c-demo-{}", &id[2..]))?;
        store
            .add_conversation(&conversation, name, vec![me.clone(), user])
            .await;
    }

    let now = Timestamp::now();
    for (conversation, sender, content, hours_ago) in MESSAGES {
        store
            .add_message_at(
                &ConversationId::new(conversation)?,
                &UserId::new(sender)?,
                content,
                now.minus_hours(hours_ago),
            )
            .await?;
    }

    tracing::debug!(
        user_id = %me,
        contacts = PEOPLE.len(),
        messages = MESSAGES.len(),
        "Seeded demo data"
    );
    Ok(me)
}
