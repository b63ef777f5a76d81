// tarmac_sim/src/bin/tarmac.rs

//! Headless runner: loads a scenario, runs it and reports what happened.
//!
//! `cargo run --bin tarmac -- --scenario assets/scenarios/01_mixed_fleet.toml`

use clap::Parser;
use std::process::ExitCode;
use tarmac_sim::cli::Cli;
use tarmac_sim::error::SimResult;
use tarmac_sim::simulation::config::{load_scenario, PresetCatalog};
use tarmac_sim::simulation::core::runner::run_scenario;
use tracing::{error, info};
use tracing_subscriber::FmtSubscriber;

fn main() -> ExitCode {
    let cli = Cli::parse();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(cli.log_level)
        .with_target(true)
        .with_thread_names(true)
        .finish();
    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("failed to install log subscriber: {e}");
    }

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> SimResult<()> {
    // --- 1. Configuration ---
    let catalog = PresetCatalog::load(&cli.catalog);
    let mut scenario = load_scenario(&cli.scenario, &catalog)?;
    if let Some(name) = &cli.vehicle {
        scenario.retain_only(name)?;
    }

    // Command line beats scenario; with neither, draw one and say so.
    let seed = match cli.seed.or(scenario.simulation.seed) {
        Some(seed) => seed,
        None => {
            let seed = rand::random::<u64>();
            info!("No seed given, using {seed}.");
            seed
        }
    };

    // --- 2. Run ---
    let report = run_scenario(&scenario, seed)?;

    // --- 3. Report ---
    if let Some(path) = &cli.dump_final {
        std::fs::write(path, toml::to_string_pretty(&report)?)?;
        info!("Final report written to {:?}", path);
    }
    Ok(())
}
