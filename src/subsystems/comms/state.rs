//! Shared state for the comms subsystem — capability boundary for channels.
//!
//! Channels receive an `Arc<CommsState>` and only reach the dialog through
//! [`CommsState::handle_text`]. Lifecycle signals go to the comms manager
//! through [`CommsState::report_event`].

use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::warn;

use crate::error::AppError;
use crate::subsystems::dialog::{ConversationId, Dialog, Reply};

/// Events a channel sends back to the comms manager.
#[derive(Debug)]
pub enum CommsEvent {
    /// Channel has stopped (clean exit or EOF).
    ChannelShutdown { channel_id: String },
    /// An update arrived with no text content and was ignored.
    UnsupportedUpdate { channel_id: String },
}

pub struct CommsState {
    dialog: Arc<Dialog>,
    event_tx: mpsc::Sender<CommsEvent>,
}

impl CommsState {
    pub fn new(dialog: Arc<Dialog>, event_tx: mpsc::Sender<CommsEvent>) -> Self {
        Self { dialog, event_tx }
    }

    /// Feed one inbound text message into the dialog and return the reply.
    pub fn handle_text(
        &self,
        channel_id: &str,
        conversation_id: ConversationId,
        sender: &str,
        text: &str,
    ) -> Result<Reply, AppError> {
        self.dialog
            .handle(conversation_id, sender, text)
            .map_err(|e| AppError::Comms(format!("{channel_id}: {e}")))
    }

    /// Non-blocking: drops the event with a warning if the manager is
    /// behind or gone.
    pub fn report_event(&self, event: CommsEvent) {
        if let Err(e) = self.event_tx.try_send(event) {
            warn!("comms event dropped: {e}");
        }
    }
}
