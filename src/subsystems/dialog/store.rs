//! In-memory conversation store.
//!
//! The id map and each conversation have separate locks: the map lock is
//! held only for lookup/insert, the entry lock for one whole transition.
//! Nothing is ever evicted.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::error::AppError;
use super::state::ConversationState;

/// Stable identifier of one chat.
pub type ConversationId = i64;

/// Shared handle to a single conversation.
pub type ConversationHandle = Arc<Mutex<ConversationState>>;

#[derive(Default)]
pub struct ConversationStore {
    conversations: Mutex<HashMap<ConversationId, ConversationHandle>>,
}

impl ConversationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the conversation for `id`, inserting a fresh idle one if absent.
    ///
    /// The flag is `true` when this call created the entry.
    pub fn get_or_create(&self, id: ConversationId) -> Result<(ConversationHandle, bool), AppError> {
        let mut conversations = self
            .conversations
            .lock()
            .map_err(|_| AppError::Dialog("conversation store lock poisoned".into()))?;

        if let Some(existing) = conversations.get(&id) {
            return Ok((existing.clone(), false));
        }
        let fresh: ConversationHandle = Arc::new(Mutex::new(ConversationState::new()));
        conversations.insert(id, fresh.clone());
        Ok((fresh, true))
    }

    /// Existing conversation for `id`, without creating one.
    pub fn get(&self, id: ConversationId) -> Option<ConversationHandle> {
        self.conversations.lock().ok()?.get(&id).cloned()
    }

    pub fn len(&self) -> usize {
        self.conversations.lock().map(|c| c.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
