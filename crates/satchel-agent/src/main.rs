//! # satchel-agent
//!
//! Satchel agent binary — records the local identity, connects to the
//! routing service, and serves the document store over the relay.

#![deny(unsafe_code)]

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tokio_util::sync::CancellationToken;
use tracing::info;

use satchel_relay::dispatch::handlers::register_all;
use satchel_relay::{AgentContext, MethodRegistry, RelayError, RelaySession, SessionConfig};
use satchel_settings::{
    Credentials, credentials_path, database_path, load_credentials, load_settings,
    save_credentials,
};
use satchel_store::DocumentStore;

/// Username recorded when `login` is run without one.
const DEFAULT_USERNAME: &str = "testuser";

/// Satchel agent.
#[derive(Parser, Debug)]
#[command(
    name = "satchel-agent",
    about = "Serve a local document store through a routing service"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Record the identity this agent serves as.
    Login {
        /// Username to present to the routing service.
        username: Option<String>,
    },
    /// Connect to the routing service and serve requests.
    Start,
    /// Show login state.
    Status,
    /// Pretty-print the local document tree.
    Data,
}

fn init_tracing() {
    use tracing_subscriber::EnvFilter;
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    match cli.command {
        Command::Login { username } => login(username),
        Command::Start => start().await,
        Command::Status => status(),
        Command::Data => data(),
    }
}

fn login(username: Option<String>) -> Result<()> {
    let username = username.unwrap_or_else(|| DEFAULT_USERNAME.to_owned());
    let credentials = Credentials::new(username.as_str());
    save_credentials(&credentials_path(), &credentials)
        .context("failed to write credentials file")?;
    println!("Logged in as: {username}");
    println!("Run `satchel-agent start` to begin serving");
    Ok(())
}

async fn start() -> Result<()> {
    let Some(credentials) =
        load_credentials(&credentials_path()).context("failed to read credentials file")?
    else {
        println!("Not logged in. Run `satchel-agent login` first");
        return Ok(());
    };
    let settings = load_settings().context("failed to load settings")?;
    info!(
        username = %credentials.username,
        url = %settings.router_url,
        "starting agent"
    );

    let store = DocumentStore::open(database_path());
    let ctx = Arc::new(AgentContext::new(store, credentials.username));
    let mut registry = MethodRegistry::new();
    register_all(&mut registry);

    let shutdown = CancellationToken::new();
    let signal_token = shutdown.clone();
    let _ = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("shutdown signal received");
            signal_token.cancel();
        }
    });

    let session = RelaySession::new(
        SessionConfig {
            router_url: settings.router_url,
            heartbeat_interval: Duration::from_millis(settings.heartbeat_interval_ms),
        },
        registry,
        ctx,
        shutdown,
    );

    match session.run().await {
        Ok(()) => Ok(()),
        Err(RelayError::AuthRejected { message }) => {
            eprintln!("Authentication failed: {message}");
            std::process::exit(1);
        }
        Err(error) => Err(error.into()),
    }
}

fn status() -> Result<()> {
    match load_credentials(&credentials_path()).context("failed to read credentials file")? {
        Some(credentials) => {
            println!("Username:  {}", credentials.username);
            println!("Logged in: {}", credentials.timestamp);
            println!();
            println!("To start: satchel-agent start");
        }
        None => println!("Not logged in"),
    }
    Ok(())
}

fn data() -> Result<()> {
    let store = DocumentStore::open(database_path());
    let text = serde_json::to_string_pretty(&store.snapshot())
        .context("failed to render document tree")?;
    println!("{text}");
    Ok(())
}
