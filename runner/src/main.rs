//! Runs a pool of blinkygram bots against one server, or probes it with echoes.

mod fleet;
mod probe;
mod secrets;

use std::num::NonZeroUsize;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[derive(Parser)]
#[command(
    name = "blinky-runner",
    version,
    about = "blinkygram bot runner and connectivity probe"
)]
struct Cli {
    /// Log filter directive, e.g. `info` or `client=debug`. Defaults to
    /// `RUST_LOG`, then `info`.
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Connect one client per worker and run a bot on each until stopped.
    Run(RunArgs),
    /// Echo a payload a number of times and print round-trip times.
    Ping(PingArgs),
}

/// Where the server lives and how long to wait on it.
#[derive(Args, Debug, Clone)]
struct ServerArgs {
    /// Server host name or address.
    #[arg(long, env = "BOT_SERVER_HOST")]
    host: String,
    /// Server TCP port.
    #[arg(long, env = "BOT_SERVER_PORT")]
    port: u16,
    /// Socket timeout in seconds for connect, send and receive.
    #[arg(long, default_value_t = 10)]
    timeout_secs: u64,
}

impl ServerArgs {
    fn client_config(&self) -> client::ClientConfig {
        client::ClientConfig::default().with_timeout(Duration::from_secs(self.timeout_secs))
    }
}

#[derive(Args, Debug)]
struct RunArgs {
    #[command(flatten)]
    server: ServerArgs,
    /// Number of bots, each on its own connection.
    #[arg(long, env = "BOT_WORKERS", default_value = "1")]
    workers: NonZeroUsize,
    /// Account every worker logs in with.
    #[arg(long, env = "BOT_USERNAME", default_value = "marketbot")]
    username: String,
    /// Password file; a random password is generated into it if missing.
    #[arg(long, env = "BOT_PASSWORD_FILE", default_value = "./storage/password")]
    password_file: PathBuf,
    /// PEM public key published on registration.
    #[arg(long, env = "BOT_PUBKEY_FILE", default_value = "./storage/key.pub.pem")]
    pubkey_file: PathBuf,
    /// Seconds between keepalive echoes.
    #[arg(long, default_value_t = 10)]
    keepalive_secs: u64,
    /// Print a JSON summary of per-worker counters on exit.
    #[arg(long)]
    json: bool,
}

#[derive(Args, Debug)]
struct PingArgs {
    #[command(flatten)]
    server: ServerArgs,
    /// Number of echoes to send.
    #[arg(long, default_value_t = 4)]
    count: u32,
    /// Echo payload.
    #[arg(long, default_value = "PING")]
    payload: String,
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    init_logging(cli.log_level.as_deref())?;

    match cli.command {
        Command::Run(args) => {
            let report = fleet::run(&args)?;
            if args.json {
                println!(
                    "{}",
                    serde_json::to_string_pretty(&report).context("serialize report")?
                );
            }
            if report.failed {
                return Ok(ExitCode::FAILURE);
            }
        }
        Command::Ping(args) => probe::ping(&args)?,
    }
    Ok(ExitCode::SUCCESS)
}

fn init_logging(level: Option<&str>) -> Result<()> {
    let filter = match level {
        Some(directive) => EnvFilter::try_new(directive)
            .with_context(|| format!("invalid log level {directive:?}"))?,
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
    };
    FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();
    Ok(())
}
