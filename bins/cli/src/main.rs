//! Tally command-line driver.
//!
//! Replays JSON scripts against an in-memory ledger and mints identifiers.

mod script;

use std::fs;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};
use tally_core::id::IdGenerator;
use tally_core::ledger::LedgerService;
use tally_shared::{AccountId, AppConfig, LedgerConfig, LogConfig};
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::script::{Replay, Script};

/// Tally - double-entry ledger core
#[derive(Parser)]
#[command(name = "tally")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Replay a JSON script against an in-memory ledger
    Run {
        /// Path to the script
        #[arg(value_name = "SCRIPT")]
        path: PathBuf,
    },

    /// Print freshly generated ids
    Id {
        /// How many ids to print
        #[arg(short = 'n', long, default_value_t = 1)]
        count: usize,

        /// Print as a UUID instead of a decimal
        #[arg(long)]
        uuid: bool,
    },
}

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = AppConfig::load().context("Failed to load configuration")?;
    init_tracing(&config.log);

    let cli = Cli::parse();
    match cli.command {
        Commands::Run { path } => run_script(&path, config.ledger),
        Commands::Id { count, uuid } => print_ids(count, uuid),
    }
}

fn init_tracing(log: &LogConfig) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| log.filter.as_str().into());

    // stdout carries results; logs go to stderr.
    tracing_subscriber::registry()
        .with(filter)
        .with(log.json.then(|| fmt::layer().json().with_writer(io::stderr)))
        .with((!log.json).then(|| fmt::layer().with_writer(io::stderr)))
        .init();
}

fn run_script(path: &Path, ledger: LedgerConfig) -> anyhow::Result<()> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("Failed to read script {}", path.display()))?;
    let script: Script = serde_json::from_str(&raw)
        .with_context(|| format!("Failed to parse script {}", path.display()))?;
    info!(steps = script.steps.len(), path = %path.display(), "Replaying script");

    let mut replay = Replay::new(LedgerService::new(ledger));
    let mut out = BufWriter::new(io::stdout().lock());
    for (index, step) in script.steps.iter().enumerate() {
        let output = replay
            .run_step(index, step)
            .with_context(|| format!("Step {index} ({}) failed", step.op()))?;
        serde_json::to_writer(&mut out, &output)?;
        writeln!(out)?;
    }
    out.flush()?;

    info!(
        accounts = replay.store().accounts().count(),
        transfers = replay.store().transfers().count(),
        "Script finished"
    );
    Ok(())
}

fn print_ids(count: usize, uuid: bool) -> anyhow::Result<()> {
    let mut generator = IdGenerator::new();
    let mut out = io::stdout().lock();
    for _ in 0..count {
        let id = generator.next_id();
        if uuid {
            writeln!(out, "{}", AccountId(id).to_uuid())?;
        } else {
            writeln!(out, "{id}")?;
        }
    }
    Ok(())
}
