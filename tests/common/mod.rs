//! Shared fixture for the integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use command_orchestrator::adapters::memory::{
    InMemoryContactDirectory, InMemoryConversationStore, InMemoryVectorIndex,
};
use command_orchestrator::adapters::MockAIProvider;
use command_orchestrator::application::{
    register_builtin_tools, InvokeCommand, InvokeCommandHandler, OrchestratorSettings,
    ToolDependencies, ToolRegistry,
};
use command_orchestrator::domain::foundation::{ConversationId, Timestamp, UserId};
use command_orchestrator::domain::messaging::Contact;
use command_orchestrator::domain::orchestration::{AppContext, Screen};

pub const ME: &str = "u-alex";

pub fn uid(s: &str) -> UserId {
    UserId::new(s).unwrap()
}

pub fn cid(s: &str) -> ConversationId {
    ConversationId::new(s).unwrap()
}

pub struct World {
    pub store: InMemoryConversationStore,
    pub directory: InMemoryContactDirectory,
    pub index: InMemoryVectorIndex,
    pub ai: MockAIProvider,
}

impl World {
    /// Alex with two Johns, Sarah and Mike, and a recent chat with each
    /// except John Doe.
    pub async fn new(ai: MockAIProvider) -> Self {
        let store = InMemoryConversationStore::new();
        let directory = InMemoryContactDirectory::new();
        let people = [
            (ME, "Alex Morgan"),
            ("u-john-smith", "John Smith"),
            ("u-john-doe", "John Doe"),
            ("u-sarah", "Sarah Connor"),
            ("u-mike", "Mike Chen"),
        ];
        for (id, name) in people {
            store.add_user(&uid(id), name).await;
            if id != ME {
                directory
                    .add_contact(
                        &uid(ME),
                        Contact::new(uid(id), name).with_email(format!("{}@example.com", id)),
                    )
                    .await;
            }
        }

        store
            .add_conversation(&cid("c-sarah"), "Sarah Connor", vec![uid(ME), uid("u-sarah")])
            .await;
        store
            .add_conversation(&cid("c-mike"), "Mike Chen", vec![uid(ME), uid("u-mike")])
            .await;
        store
            .add_conversation(&cid("c-john-smith"), "John Smith", vec![uid(ME), uid("u-john-smith")])
            .await;

        let now = Timestamp::now();
        let messages = [
            ("c-sarah", "u-sarah", "Are we still on for dinner on Friday?", 30),
            ("c-sarah", ME, "Yes! Dinner Friday at 7 at Luigi's", 29),
            ("c-mike", "u-mike", "The project deadline moved to Monday", 5),
            ("c-mike", ME, "Thanks, I'll update the plan", 4),
            ("c-john-smith", "u-john-smith", "Good game last night", 2),
        ];
        for (conversation, sender, content, hours_ago) in messages {
            store
                .add_message_at(&cid(conversation), &uid(sender), content, now.minus_hours(hours_ago))
                .await
                .unwrap();
        }

        let index = InMemoryVectorIndex::new(store.clone());
        Self {
            store,
            directory,
            index,
            ai,
        }
    }

    pub fn handler(&self, settings: OrchestratorSettings) -> InvokeCommandHandler {
        let deps = ToolDependencies::new(
            Arc::new(self.store.clone()),
            Arc::new(self.directory.clone()),
            Arc::new(self.index.clone()),
            Arc::new(self.ai.clone()),
        );
        let mut registry = ToolRegistry::new();
        register_builtin_tools(&mut registry, &deps).unwrap();
        InvokeCommandHandler::new(Arc::new(registry), Arc::new(self.ai.clone()), settings)
    }
}

pub fn command(text: &str) -> InvokeCommand {
    InvokeCommand {
        command: text.to_string(),
        context: AppContext::new(ME, Screen::ConversationList),
    }
}
