//! Comms subsystem — the transports that carry dialog messages.
//!
//! Each channel (Telegram, PTY) implements [`runtime::Component`] and is
//! spawned as an independent task by [`start`]. Channels capture their
//! [`Arc<CommsState>`] at construction and never touch the conversation
//! store directly.
//!
//! [`start`] is synchronous: it returns a [`SubsystemHandle`] as soon as the
//! tasks are spawned.

mod state;
#[cfg(feature = "channel-pty")]
pub mod pty;
#[cfg(feature = "channel-telegram")]
pub mod telegram;

pub use state::{CommsEvent, CommsState};

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::config::Config;
use crate::error::AppError;
use crate::subsystems::dialog::Dialog;
use crate::subsystems::runtime::{Component, SubsystemHandle, spawn_components};

/// Telegram rejects messages over 4096 characters; stay a little under.
pub const MAX_MESSAGE_LENGTH: usize = 4000;

/// Split `text` into pieces of at most `max_chars` characters.
///
/// Always yields at least one piece so an empty reply still produces a send.
pub fn chunk_text(text: &str, max_chars: usize) -> Vec<String> {
    let chars: Vec<char> = text.chars().collect();
    if chars.is_empty() {
        return vec![String::new()];
    }
    chars
        .chunks(max_chars.max(1))
        .map(|c| c.iter().collect())
        .collect()
}

/// Spawn all configured channels.
///
/// Fails only when the Telegram channel is enabled without a token; that
/// check happens here so it stops startup instead of a running task.
pub fn start(
    config: &Config,
    dialog: Arc<Dialog>,
    shutdown: CancellationToken,
) -> Result<SubsystemHandle, AppError> {
    let (event_tx, event_rx) = mpsc::channel::<CommsEvent>(32);
    let state = Arc::new(CommsState::new(dialog, event_tx));

    let mut components: Vec<Box<dyn Component>> = Vec::new();

    #[cfg(feature = "channel-telegram")]
    {
        if config.comms_telegram_should_load() {
            let token = config.require_bot_token()?;
            info!(bot_name = %config.bot_name, "loading telegram channel");
            components.push(Box::new(telegram::TelegramChannel::new(
                "telegram0",
                token,
                state.clone(),
            )));
        }
    }
    #[cfg(not(feature = "channel-telegram"))]
    {
        if config.comms_telegram_should_load() {
            return Err(AppError::Config(
                "telegram channel enabled but not compiled (feature channel-telegram)".into(),
            ));
        }
    }

    #[cfg(feature = "channel-pty")]
    {
        if config.comms_pty_should_load() {
            info!("loading pty channel");
            components.push(Box::new(pty::PtyChannel::new(
                "pty0",
                config.comms.pty.conversation_id,
                state.clone(),
            )));
        }
    }

    if components.is_empty() {
        info!("no comms channels configured — waiting for shutdown");
    }

    // Monitoring only; ends when every channel has dropped its state.
    drop(state);
    tokio::spawn(async move {
        let mut rx = event_rx;
        while let Some(event) = rx.recv().await {
            match event {
                CommsEvent::ChannelShutdown { ref channel_id } => {
                    debug!(channel_id, "channel reported shutdown");
                }
                CommsEvent::UnsupportedUpdate { ref channel_id } => {
                    info!(channel_id, "unsupported update");
                }
            }
        }
    });

    Ok(spawn_components(components, shutdown))
}
