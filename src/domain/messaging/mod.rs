//! Messaging module - Records read from the conversation store and
//! contact directory.

mod contact;
mod conversation;
mod message;

pub use contact::Contact;
pub use conversation::{ConversationSort, ConversationSummary};
pub use message::Message;
