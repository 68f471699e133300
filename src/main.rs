//! Research feed client: binary entrypoint.
//! Polls the agent backend, records new findings into the local timeline and
//! raises notifications; also hosts the small settings commands.

use std::io::{BufRead, Write};
use std::sync::{Arc, Mutex};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use radiantic_client::model::AgentStatus;
use radiantic_client::remote::{MAX_INTERVAL_MINUTES, MIN_INTERVAL_MINUTES};
use radiantic_client::timeline::render_text;
use radiantic_client::{Client, ClientConfig, RenderEvent, View};

#[derive(Debug, Parser)]
#[command(name = "radiantic-client", about = "Follow the research agent from your terminal")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Poll the backend and show new research as it lands (default).
    Watch,
    /// Print the stored timeline, newest first.
    History,
    /// Delete all saved research. Irreversible; asks first unless `--yes`.
    ClearHistory {
        #[arg(short, long)]
        yes: bool,
    },
    /// Set how often the agent researches (minutes, 1-60) and push it to the backend.
    SetInterval { minutes: u32 },
    /// Turn notifications on or off.
    Notifications { state: Toggle },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Toggle {
    On,
    Off,
}

/// `RUST_LOG` wins; otherwise info for this crate and warn elsewhere.
/// `LOG_FORMAT=json` switches to JSON lines.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("radiantic_client=info,warn"));
    let json = std::env::var("LOG_FORMAT").is_ok_and(|v| v.eq_ignore_ascii_case("json"));

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry.with(fmt::layer().json()).init();
    } else {
        registry.with(fmt::layer().compact().with_target(false)).init();
    }
}

/// Prints status changes and the timeline after each commit.
struct ConsoleView {
    last_status: Mutex<String>,
}

impl View for ConsoleView {
    fn render(&self, event: RenderEvent) {
        match event {
            RenderEvent::Status { status, text, .. } => {
                let mut last = self.last_status.lock().expect("status mutex poisoned");
                if *last == text {
                    return;
                }
                let marker = match status {
                    AgentStatus::Settled => "●",
                    AgentStatus::Busy => "◌",
                    AgentStatus::Connecting => "…",
                };
                println!("{marker} {text}");
                *last = text;
            }
            RenderEvent::History(history) => {
                println!("\n{}", render_text(&history));
            }
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env in local/dev; no-op when absent.
    let _ = dotenvy::dotenv();
    init_tracing();

    let cli = Cli::parse();
    let cfg = ClientConfig::load().context("loading client config")?;
    let client = Client::open(&cfg).await;

    match cli.command.unwrap_or(Command::Watch) {
        Command::Watch => watch(&client, &cfg).await,
        Command::History => {
            println!("{}", render_text(&client.store.load_history().await));
            Ok(())
        }
        Command::ClearHistory { yes } => clear_history(&client, yes).await,
        Command::SetInterval { minutes } => set_interval(&client, minutes).await,
        Command::Notifications { state } => notifications(&client, state).await,
    }
}

async fn watch(client: &Client, cfg: &ClientConfig) -> Result<()> {
    println!("{}", render_text(&client.store.load_history().await));

    let view = Arc::new(ConsoleView {
        last_status: Mutex::new(String::new()),
    });
    let mut poller = client.poller(cfg);
    poller.start(view);

    tokio::signal::ctrl_c().await.context("waiting for ctrl-c")?;
    tracing::info!("received ctrl-c, shutting down");
    poller.shutdown().await;
    Ok(())
}

async fn clear_history(client: &Client, yes: bool) -> Result<()> {
    if !yes {
        let stdin = std::io::stdin();
        if !confirm("Are you sure you want to delete all saved papers?", stdin.lock())? {
            println!("Nothing deleted");
            return Ok(());
        }
    }
    client.store.clear_history().await?;
    println!("History cleared");
    Ok(())
}

/// Prompts on stdout; only an explicit y/yes counts.
fn confirm(question: &str, mut input: impl BufRead) -> Result<bool> {
    print!("{question} [y/N] ");
    std::io::stdout().flush().context("flushing prompt")?;
    let mut answer = String::new();
    input.read_line(&mut answer).context("reading confirmation")?;
    Ok(matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes"))
}

async fn set_interval(client: &Client, minutes: u32) -> Result<()> {
    if !(MIN_INTERVAL_MINUTES..=MAX_INTERVAL_MINUTES).contains(&minutes) {
        anyhow::bail!("interval must be {MIN_INTERVAL_MINUTES}-{MAX_INTERVAL_MINUTES} minutes");
    }
    client.store.set_poll_interval_minutes(minutes).await?;

    // Sent once; the saved preference stands even if the backend is down.
    match client.http.push_interval(minutes).await {
        Ok(Some(ack)) => {
            println!("✅ Updated! ({}, {}s)", ack.message, ack.interval_seconds);
            Ok(())
        }
        Ok(None) => {
            println!("✅ Updated!");
            Ok(())
        }
        Err(e) => {
            println!("❌ Error");
            Err(e).context("pushing research interval")
        }
    }
}

async fn notifications(client: &Client, state: Toggle) -> Result<()> {
    match state {
        Toggle::On => {
            client.store.set_notifications_enabled(true).await?;
            let perm = client.dispatcher.request_permission().await;
            client.store.set_permission(perm).await?;
            println!("Notifications enabled (permission: {perm})");
        }
        Toggle::Off => {
            client.store.set_notifications_enabled(false).await?;
            println!("Notifications disabled");
        }
    }
    Ok(())
}
