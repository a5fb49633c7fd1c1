//! ConsoleUseCase: runs RCon commands and renders their output.
//!
//! The use case owns an [`RconClient`] and is generic over its transport, so
//! tests drive it with the scripted transport from `rcon-core` and the binary
//! drives it over UDP. Input and output are tokio async streams; tests pass
//! byte slices and `Vec<u8>`.

use rcon_core::{RconClient, RconError, Transport};
use thiserror::Error;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{debug, info};

/// Prompt printed before each interactive command.
pub const PROMPT: &str = "> ";

/// Error type for the console use case.
#[derive(Debug, Error)]
pub enum ConsoleError {
    /// The RCon exchange failed; the session is over.
    #[error(transparent)]
    Rcon(#[from] RconError),

    /// Reading commands or writing output failed.
    #[error("console I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Presentation switches.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConsoleOptions {
    /// Suppress server notices and client-side banners. Command responses
    /// are still written.
    pub quiet: bool,
}

/// The console use case.
pub struct ConsoleUseCase<T: Transport> {
    client: RconClient<T>,
    options: ConsoleOptions,
}

impl<T: Transport> ConsoleUseCase<T> {
    /// Wraps a client. The client is expected to be logged in already.
    pub fn new(client: RconClient<T>, options: ConsoleOptions) -> Self {
        Self { client, options }
    }

    /// Gives the client back.
    pub fn into_client(self) -> RconClient<T> {
        self.client
    }

    /// Runs one command and writes any notices, then the response.
    ///
    /// # Errors
    ///
    /// [`ConsoleError::Rcon`] if the exchange fails, [`ConsoleError::Io`] if
    /// the output cannot be written.
    pub async fn run_command<W>(&mut self, command: &str, out: &mut W) -> Result<(), ConsoleError>
    where
        W: AsyncWrite + Unpin,
    {
        let mut notices = Vec::new();
        let response = self
            .client
            .execute(command, |text| notices.push(text.to_string()))
            .await?;

        if !self.options.quiet {
            for notice in &notices {
                write_line(out, notice).await?;
            }
        }
        write_line(out, &response).await?;
        out.flush().await?;
        Ok(())
    }

    /// Reads commands line by line until `exit`, `quit` or end of input.
    ///
    /// Blank lines are skipped. The first failing command ends the loop.
    ///
    /// # Errors
    ///
    /// Same as [`ConsoleUseCase::run_command`], plus read errors on `input`.
    pub async fn run_interactive<R, W>(&mut self, input: R, out: &mut W) -> Result<(), ConsoleError>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        if !self.options.quiet {
            write_line(out, "Type 'exit' or 'quit' to exit interactive mode.").await?;
        }

        let mut lines = input.lines();
        loop {
            if !self.options.quiet {
                out.write_all(PROMPT.as_bytes()).await?;
                out.flush().await?;
            }

            let Some(line) = lines.next_line().await? else {
                debug!("end of input");
                break;
            };
            let command = line.trim();
            if command.is_empty() {
                continue;
            }
            if is_exit_command(command) {
                break;
            }

            self.run_command(command, out).await?;
        }

        info!("interactive session finished");
        Ok(())
    }
}

fn is_exit_command(command: &str) -> bool {
    command == "exit" || command == "quit"
}

async fn write_line<W>(out: &mut W, text: &str) -> std::io::Result<()>
where
    W: AsyncWrite + Unpin,
{
    out.write_all(text.as_bytes()).await?;
    out.write_all(b"\n").await
}

// ── Tests ─────────────────────────────────────────────────────────────────────
