use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use opal::{ActivityRequest, Config, FileAuthStore, PortalClient};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "opal")]
#[command(about = "Opal card balances and trip history")]
struct Cli {
    /// Path to config file
    #[arg(short, long, default_value = "opal.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Show card balances
    Overview,
    /// Show a card's transactions
    Activity {
        /// Card position on the overview page, from 0
        #[arg(long, default_value_t = 0)]
        card: usize,
        /// History page, 0 being the most recent
        #[arg(long, default_value_t = 0)]
        page: usize,
    },
    /// Show current configuration
    Config,
}

fn print_json(value: &impl Serialize) -> Result<()> {
    println!(
        "{}",
        serde_json::to_string_pretty(value).context("Failed to serialize output")?
    );
    Ok(())
}

fn show_config(config_path: &Path, config: &Config, store: &FileAuthStore) {
    println!("Config file: {}", config_path.display());
    println!("Portal: {}", config.base_url);
    println!("Time zone: {}", config.time_zone);
    println!("Auth file: {}", store.path().display());
}

/// Run `f` against a logged-in client, then save the session.
fn with_client(
    config: &Config,
    store: FileAuthStore,
    f: impl FnOnce(&mut PortalClient) -> Result<()>,
) -> Result<()> {
    let auth_file = store.path().to_path_buf();
    let mut client = PortalClient::new(config, store)
        .with_context(|| format!("Failed to set up client from {}", auth_file.display()))?;

    let result = f(&mut client);

    // Keep whatever session we ended up with, even after a failed fetch.
    client.save_auth().context("Failed to save session")?;
    result
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = Config::load_or_default(&cli.config)?;
    let store = FileAuthStore::new(config.auth_file_path()?);

    match cli.command {
        Command::Overview => with_client(&config, store, |client| {
            print_json(&client.fetch_overview()?)
        }),
        Command::Activity { card, page } => with_client(&config, store, |client| {
            print_json(&client.fetch_activity(ActivityRequest::new(card).with_page(page))?)
        }),
        Command::Config => {
            show_config(&cli.config, &config, &store);
            Ok(())
        }
    }
}
