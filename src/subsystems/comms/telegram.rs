//! Telegram comms channel — long-polls the Bot API, runs each text message
//! through the dialog and replies to the same chat.
//!
//! Non-empty choice lists become a reply keyboard with one button per row;
//! an empty list removes whatever keyboard the user was shown.

use std::sync::Arc;

use teloxide::prelude::*;
use teloxide::types::{KeyboardButton, KeyboardMarkup, KeyboardRemove, ReplyMarkup, User};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::error::AppError;
use crate::subsystems::dialog::Reply;
use crate::subsystems::runtime::{Component, ComponentFuture};
use super::state::{CommsEvent, CommsState};
use super::{MAX_MESSAGE_LENGTH, chunk_text};

pub struct TelegramChannel {
    channel_id: String,
    token: String,
    state: Arc<CommsState>,
}

impl TelegramChannel {
    pub fn new(channel_id: impl Into<String>, token: impl Into<String>, state: Arc<CommsState>) -> Self {
        Self {
            channel_id: channel_id.into(),
            token: token.into(),
            state,
        }
    }
}

impl Component for TelegramChannel {
    fn id(&self) -> &str {
        &self.channel_id
    }

    fn run(self: Box<Self>, shutdown: CancellationToken) -> ComponentFuture {
        Box::pin(run_telegram(self.channel_id, self.token, self.state, shutdown))
    }
}

/// Keyboard markup for a reply's choices.
pub fn reply_markup(choices: &[String]) -> ReplyMarkup {
    if choices.is_empty() {
        return ReplyMarkup::KeyboardRemove(KeyboardRemove::new());
    }
    let rows = choices.iter().map(|label| vec![KeyboardButton::new(label.clone())]);
    ReplyMarkup::Keyboard(KeyboardMarkup::new(rows))
}

fn sender_label(from: Option<&User>) -> String {
    match from {
        Some(user) => user.username.clone().unwrap_or_else(|| user.first_name.clone()),
        None => "unknown".to_string(),
    }
}

/// Send `reply` to `chat_id`, chunked to Telegram's length limit. The
/// keyboard rides on the last chunk.
async fn send_reply(bot: &Bot, chat_id: ChatId, reply: &Reply) -> Result<(), teloxide::RequestError> {
    let chunks = chunk_text(&reply.text, MAX_MESSAGE_LENGTH);
    let last = chunks.len() - 1;

    for (i, chunk) in chunks.into_iter().enumerate() {
        let request = bot.send_message(chat_id, chunk);
        if i == last {
            request.reply_markup(reply_markup(&reply.choices)).await?;
        } else {
            request.await?;
        }
    }
    Ok(())
}

async fn run_telegram(
    channel_id: String,
    token: String,
    state: Arc<CommsState>,
    shutdown: CancellationToken,
) -> Result<(), AppError> {
    info!(%channel_id, "telegram channel starting");

    let bot = Bot::new(token);

    let state_clone = state.clone();
    let channel_id_clone = channel_id.clone();

    let handler = Update::filter_message().endpoint(move |bot: Bot, msg: Message| {
        let state = state_clone.clone();
        let channel_id = channel_id_clone.clone();
        async move {
            let Some(text) = msg.text() else {
                state.report_event(CommsEvent::UnsupportedUpdate { channel_id });
                return respond(());
            };

            let conversation_id = msg.chat.id.0;
            let sender = sender_label(msg.from.as_ref());
            debug!(%channel_id, %conversation_id, %sender, "telegram received message");

            match state.handle_text(&channel_id, conversation_id, &sender, text) {
                Ok(reply) => {
                    if let Err(e) = send_reply(&bot, msg.chat.id, &reply).await {
                        warn!(%channel_id, %conversation_id, "failed to send telegram reply: {e}");
                    }
                }
                Err(e) => warn!(%channel_id, %conversation_id, "dialog error: {e}"),
            }
            respond(())
        }
    });

    let mut dispatcher = Dispatcher::builder(bot, handler).build();

    tokio::select! {
        biased;

        _ = shutdown.cancelled() => {
            info!(%channel_id, "shutdown signal received — closing telegram channel");
        }
        _ = dispatcher.dispatch() => {
            warn!(%channel_id, "telegram dispatcher exited unexpectedly");
        }
    }

    state.report_event(CommsEvent::ChannelShutdown { channel_id });
    Ok(())
}
