//! `rcon` command-line entry point.
//!
//! ```text
//! main()
//!  └─ Cli::parse()               -- host, port, command, flags
//!  └─ ClientConfig::load()       -- password (+ optional timeout)
//!  └─ UdpTransport::connect()    -- resolve and connect the UDP socket
//!  └─ RconClient::login()
//!  └─ ConsoleUseCase
//!       ├─ run_command()         -- one-shot mode
//!       └─ run_interactive()     -- `-i`, until exit/quit/EOF/Ctrl+C
//! ```
//!
//! Logging goes to stderr and defaults to `warn`, so stdout carries only
//! server output. Set `RUST_LOG=debug` to see every packet, or `trace` for
//! hex dumps.

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use tokio::io::BufReader;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use rcon_client::application::console::{ConsoleOptions, ConsoleUseCase};
use rcon_client::infrastructure::network::UdpTransport;
use rcon_client::infrastructure::storage::config::{ClientConfig, DEFAULT_CONFIG_FILE};
use rcon_core::RconClient;

// ── CLI argument definitions ──────────────────────────────────────────────────

/// BattlEye RCon client.
///
/// Logs in with the password from the config file, then runs COMMAND or, with
/// `-i`, reads commands from stdin.
#[derive(Debug, Parser)]
#[command(name = "rcon", about = "Remote console client for BattlEye RCon servers", version)]
struct Cli {
    /// Quiet mode: no server notices or client-side banners.
    #[arg(short, long)]
    quiet: bool,

    /// Interactive mode: read commands from stdin until `exit` or `quit`.
    #[arg(short, long)]
    interactive: bool,

    /// Config file holding the RCon password.
    #[arg(long, default_value = DEFAULT_CONFIG_FILE, env = "RCON_CONFIG")]
    config: PathBuf,

    /// Receive timeout in milliseconds. Overrides the config file; 500 if
    /// neither sets it.
    #[arg(long, env = "RCON_TIMEOUT_MS")]
    timeout_ms: Option<u64>,

    /// Server host name or IP address.
    host: String,

    /// Server RCon port.
    port: u16,

    /// Command to run; words are joined with spaces.
    #[arg(
        required_unless_present = "interactive",
        trailing_var_arg = true,
        allow_hyphen_values = true
    )]
    command: Vec<String>,
}

impl Cli {
    fn one_shot_command(&self) -> Option<String> {
        if self.command.is_empty() {
            None
        } else {
            Some(self.command.join(" "))
        }
    }

    fn receive_timeout(&self, config: &ClientConfig) -> Duration {
        self.timeout_ms
            .map(Duration::from_millis)
            .unwrap_or_else(|| config.timeout())
    }
}

// ── Entry point ───────────────────────────────────────────────────────────────

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = ClientConfig::load(&cli.config).context("failed to load RCon config")?;
    let timeout = cli.receive_timeout(&config);

    let transport = UdpTransport::connect(&cli.host, cli.port)
        .await
        .with_context(|| format!("failed to connect to {}:{}", cli.host, cli.port))?;
    let mut client = RconClient::new(transport).with_receive_timeout(timeout);

    client.login(&config.password).await.context("login failed")?;

    let options = ConsoleOptions { quiet: cli.quiet };
    let mut console = ConsoleUseCase::new(client, options);
    let mut stdout = tokio::io::stdout();

    if cli.interactive {
        let stdin = BufReader::new(tokio::io::stdin());
        tokio::select! {
            result = console.run_interactive(stdin, &mut stdout) => {
                result.context("interactive session ended with an error")?;
            }
            _ = tokio::signal::ctrl_c() => {
                info!("received Ctrl+C, leaving interactive mode");
            }
        }
    } else if let Some(command) = cli.one_shot_command() {
        console
            .run_command(&command, &mut stdout)
            .await
            .with_context(|| format!("command '{command}' failed"))?;
    }

    Ok(())
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_words_are_joined() {
        // Arrange
        let cli = Cli::parse_from(["rcon", "127.0.0.1", "2302", "say", "-1", "hello"]);

        // Assert
        assert_eq!(cli.one_shot_command().as_deref(), Some("say -1 hello"));
        assert!(!cli.interactive);
    }

    #[test]
    fn test_flags_before_positionals() {
        let cli = Cli::parse_from(["rcon", "-q", "-i", "example.org", "2302"]);

        assert!(cli.quiet);
        assert!(cli.interactive);
        assert_eq!(cli.host, "example.org");
        assert_eq!(cli.port, 2302);
        assert_eq!(cli.one_shot_command(), None);
    }

    #[test]
    fn test_command_is_required_without_interactive() {
        assert!(Cli::try_parse_from(["rcon", "127.0.0.1", "2302"]).is_err());
    }

    #[test]
    fn test_invalid_port_is_rejected() {
        assert!(Cli::try_parse_from(["rcon", "127.0.0.1", "99999", "players"]).is_err());
    }

    #[test]
    fn test_cli_timeout_overrides_config() {
        let config = ClientConfig {
            password: "x".to_string(),
            timeout_ms: 900,
        };

        let with_flag =
            Cli::parse_from(["rcon", "--timeout-ms", "250", "127.0.0.1", "2302", "players"]);
        assert_eq!(with_flag.receive_timeout(&config), Duration::from_millis(250));
    }
}
