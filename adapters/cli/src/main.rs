#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that replays recorded world snapshots through the
//! fleet policy engine and prints each turn's commands on stdout.

mod scenario;

use std::{fs, io, path::PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use fleet_policy_system_governor::{Governor, GovernorConfig, Session, WallClock};
use fleet_policy_system_phase_profile::PhaseTable;
use fleet_policy_world::DirectNavigator;
use tracing_subscriber::EnvFilter;

use crate::scenario::{LineEmitter, ScenarioSource};

/// Command-line arguments accepted by the replay binary.
#[derive(Debug, Parser)]
#[command(name = "fleet-policy")]
#[command(about = "Replay world snapshots through the fleet decision engine")]
struct Cli {
    /// JSON file holding an array of world snapshots, one per turn.
    #[arg(long)]
    scenario: PathBuf,
    /// TOML file replacing the built-in phase table.
    #[arg(long)]
    profiles: Option<PathBuf>,
    /// Seed for phases that sample a subset of units.
    #[arg(long, default_value_t = 0)]
    seed: u64,
    /// Heading corrections the navigator tries before refusing a move.
    #[arg(long, default_value_t = 90)]
    navigator_corrections: u32,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    let table = match &cli.profiles {
        Some(path) => {
            let contents = fs::read_to_string(path)
                .with_context(|| format!("failed to read phase table at {}", path.display()))?;
            PhaseTable::from_toml_str(&contents)
                .with_context(|| format!("invalid phase table in {}", path.display()))?
        }
        None => PhaseTable::default(),
    };

    let mut source = ScenarioSource::from_path(&cli.scenario)?;
    let stdout = io::stdout();
    let mut emitter = LineEmitter::new(stdout.lock());

    let governor = Governor::new(GovernorConfig {
        table,
        shuffle_seed: cli.seed,
    });
    let navigator = DirectNavigator::default().with_max_corrections(cli.navigator_corrections);
    let mut session = Session::new(governor, navigator, WallClock::new());

    let reports = session
        .run(&mut source, &mut emitter)
        .context("fleet policy session aborted")?;
    let commands: usize = reports.iter().map(|report| report.commands).sum();
    tracing::info!(turns = reports.len(), commands, "replay complete");
    Ok(())
}
