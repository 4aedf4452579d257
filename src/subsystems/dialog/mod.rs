//! Dialog subsystem — per-conversation add-expense state machine.
//!
//! # Flow
//!
//! A channel hands raw text to [`Dialog::handle`]. The text is resolved once
//! into an [`Input`], the conversation is fetched (or created idle) from the
//! [`ConversationStore`], [`machine::transition`] decides the outcome and
//! the result is committed while the conversation lock is still held, so a
//! transition is one atomic read-modify-write per conversation.

pub mod command;
pub mod machine;
pub mod state;
pub mod store;

pub use command::{Button, Input};
pub use machine::Reply;
pub use state::{ConversationState, Stage};
pub use store::{ConversationId, ConversationStore};

use std::sync::Arc;

use tracing::{debug, info};

use crate::error::AppError;

/// Entry point for inbound messages, shared by all channels.
pub struct Dialog {
    store: Arc<ConversationStore>,
}

impl Dialog {
    pub fn new(store: Arc<ConversationStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<ConversationStore> {
        &self.store
    }

    /// Run one transition for `conversation_id` and return the reply to send.
    pub fn handle(
        &self,
        conversation_id: ConversationId,
        sender: &str,
        text: &str,
    ) -> Result<Reply, AppError> {
        debug!(%conversation_id, "{sender}: {text}");

        let input = Input::parse(text);
        let (handle, created) = self.store.get_or_create(conversation_id)?;
        if created {
            info!(%conversation_id, "new conversation");
        }

        let mut conversation = handle
            .lock()
            .map_err(|_| AppError::Dialog(format!("conversation {conversation_id} lock poisoned")))?;

        let previous = conversation.stage();
        let outcome = machine::transition(&conversation, &input);
        conversation.apply(outcome.next, outcome.effect);

        info!(%conversation_id, "{previous} -> {}", outcome.next);
        Ok(outcome.reply)
    }

    /// Snapshot of one conversation, if it exists.
    pub fn snapshot(&self, conversation_id: ConversationId) -> Option<ConversationState> {
        let handle = self.store.get(conversation_id)?;
        let conversation = handle.lock().ok()?;
        Some(conversation.clone())
    }
}
