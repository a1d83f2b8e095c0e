//! Line-based chat adapter for running without a host framework.
//!
//! Every input line is treated as a chat message: menu commands are run
//! through the [`CommandSurface`]; anything else is ignored.  Replies are
//! written one per block, images as their file path.

use std::io;

use async_trait::async_trait;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::application::command_surface::{ChatReply, ChatSink, CommandSurface};
use crate::application::commands::parse_chat_command;

/// [`ChatSink`] that writes replies to a byte stream (stdout in production).
pub struct ConsoleSink<W> {
    out: Mutex<W>,
}

impl<W> ConsoleSink<W> {
    pub fn new(out: W) -> Self {
        Self { out: Mutex::new(out) }
    }

    /// Returns the underlying writer.
    pub fn into_inner(self) -> W {
        self.out.into_inner()
    }
}

#[async_trait]
impl<W> ChatSink for ConsoleSink<W>
where
    W: AsyncWrite + Unpin + Send,
{
    async fn send(&self, reply: ChatReply) {
        let block = match reply {
            ChatReply::Text(text) => format!("{text}\n\n"),
            ChatReply::Image(path) => format!("[image] {}\n\n", path.display()),
        };
        let mut out = self.out.lock().await;
        let written = async {
            out.write_all(block.as_bytes()).await?;
            out.flush().await
        }
        .await;
        if let Err(e) = written {
            warn!("failed to write reply: {e}");
        }
    }
}

/// Reads chat lines from `input` until end of input or `shutdown`.
pub async fn run_console<R>(
    input: R,
    surface: &CommandSurface,
    sink: &dyn ChatSink,
    shutdown: CancellationToken,
) -> io::Result<()>
where
    R: AsyncBufRead + Unpin,
{
    let mut lines = input.lines();
    info!("console ready; type /help or /help_admin");

    loop {
        let line = tokio::select! {
            line = lines.next_line() => line?,
            _ = shutdown.cancelled() => break,
        };
        let Some(line) = line else {
            debug!("console input closed");
            break;
        };

        match parse_chat_command(&line) {
            Some(command) => surface.handle(command, sink).await,
            None => debug!("ignoring non-command line"),
        }
    }
    Ok(())
}
