//! PTY (console) channel — reads lines from stdin as one conversation and
//! prints replies to stdout.
//!
//! Useful for walking through the dialog without a bot token. Runs until the
//! `shutdown` token is cancelled (Ctrl-C) or stdin is closed.

use std::sync::Arc;

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::error::AppError;
use crate::subsystems::dialog::{ConversationId, Reply};
use crate::subsystems::runtime::{Component, ComponentFuture};
use super::state::{CommsEvent, CommsState};

const SENDER: &str = "console";

pub struct PtyChannel {
    channel_id: String,
    conversation_id: ConversationId,
    state: Arc<CommsState>,
}

impl PtyChannel {
    pub fn new(
        channel_id: impl Into<String>,
        conversation_id: ConversationId,
        state: Arc<CommsState>,
    ) -> Self {
        Self {
            channel_id: channel_id.into(),
            conversation_id,
            state,
        }
    }
}

impl Component for PtyChannel {
    fn id(&self) -> &str {
        &self.channel_id
    }

    fn run(self: Box<Self>, shutdown: CancellationToken) -> ComponentFuture {
        Box::pin(async move {
            info!(channel_id = %self.channel_id, "pty channel started — type a message and press Enter. Ctrl-C to quit.");
            let stdin = BufReader::new(tokio::io::stdin());
            let stdout = tokio::io::stdout();
            let result = serve_lines(
                &self.channel_id,
                self.conversation_id,
                &self.state,
                stdin,
                stdout,
                shutdown,
            )
            .await;
            self.state.report_event(CommsEvent::ChannelShutdown {
                channel_id: self.channel_id.clone(),
            });
            result
        })
    }
}

/// Render a reply for the console: the text, then the choices as hints.
pub fn render_reply(reply: &Reply) -> String {
    if reply.choices.is_empty() {
        return reply.text.clone();
    }
    let hints: Vec<String> = reply.choices.iter().map(|c| format!("[{c}]")).collect();
    format!("{}\n{}", reply.text, hints.join(" "))
}

async fn serve_lines<R, W>(
    channel_id: &str,
    conversation_id: ConversationId,
    state: &CommsState,
    reader: R,
    mut writer: W,
    shutdown: CancellationToken,
) -> Result<(), AppError>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut lines = reader.lines();

    loop {
        writer.write_all(b"> ").await?;
        writer.flush().await?;

        tokio::select! {
            biased;

            _ = shutdown.cancelled() => {
                info!(%channel_id, "shutdown signal received — closing console channel");
                break;
            }

            line = lines.next_line() => {
                let input = match line {
                    Err(e) => {
                        warn!(%channel_id, "pty read error: {e}");
                        break;
                    }
                    Ok(None) => {
                        info!(%channel_id, "pty stdin closed");
                        break;
                    }
                    Ok(Some(input)) => input,
                };
                if input.trim().is_empty() {
                    continue;
                }
                debug!(%channel_id, input = %input, "pty received line");

                let reply = state.handle_text(channel_id, conversation_id, SENDER, &input)?;
                writer.write_all(render_reply(&reply).as_bytes()).await?;
                writer.write_all(b"\n").await?;
            }
        }
    }

    writer.flush().await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::subsystems::dialog::{ConversationStore, Dialog, Stage};
    use tokio::sync::mpsc;

    fn comms() -> (CommsState, Arc<Dialog>) {
        let (tx, _rx) = mpsc::channel(4);
        let dialog = Arc::new(Dialog::new(Arc::new(ConversationStore::new())));
        (CommsState::new(dialog.clone(), tx), dialog)
    }

    #[test]
    fn render_plain_and_menu_replies() {
        assert_eq!(render_reply(&Reply::plain("Enter a category")), "Enter a category");
        assert_eq!(
            render_reply(&Reply::with_menu("Hi there!")),
            "Hi there!\n[Add expense] [Categories] [Show all expenses]"
        );
    }

    #[tokio::test]
    async fn console_session_records_expense() {
        let (state, dialog) = comms();
        let input: &[u8] = b"/start\nAdd expense\n\nFood\n42\n";
        let mut output = Vec::new();

        serve_lines("pty0", 3, &state, input, &mut output, CancellationToken::new())
            .await
            .unwrap();

        let printed = String::from_utf8(output).unwrap();
        assert!(printed.contains("Hi there!"));
        assert!(printed.contains("Enter the amount"));
        assert!(printed.contains("Expense added"));

        let conversation = dialog.snapshot(3).unwrap();
        assert_eq!(conversation.stage(), Stage::Idle);
        assert_eq!(conversation.amounts("Food"), Some(&[42][..]));
    }

    #[tokio::test]
    async fn cancelled_channel_exits_without_reading() {
        let (state, dialog) = comms();
        let shutdown = CancellationToken::new();
        shutdown.cancel();
        let input: &[u8] = b"/start\n";
        let mut output = Vec::new();

        serve_lines("pty0", 1, &state, input, &mut output, shutdown)
            .await
            .unwrap();
        assert!(dialog.snapshot(1).is_none());
    }
}
