// tarmac_sim/src/simulation/config/mod.rs

//! This module handles loading, resolving, and validating all simulation
//! configuration from disk, including the preset catalog system.

mod catalog;
mod resolver;

pub mod structs;

use figment::{
    providers::{Format, Serialized, Toml},
    Figment,
};
use std::path::Path;
use tracing::info;

use crate::error::{SimError, SimResult};
pub use catalog::PresetCatalog;
pub use resolver::resolve_value;
pub use structs::{
    AxlePair, ResolvedScenario, ScenarioFile, SimulationSettings, StartPose, VehicleConfig,
};

/// Reads a scenario file and resolves every vehicle against `catalog`.
pub fn load_scenario(path: &Path, catalog: &PresetCatalog) -> SimResult<ResolvedScenario> {
    // Figment treats a missing file as empty; a scenario must exist.
    if !path.is_file() {
        return Err(SimError::ScenarioNotFound(path.to_path_buf()));
    }
    info!("Loading scenario from: {:?}", path);
    let file: ScenarioFile = Figment::new().merge(Toml::file(path)).extract()?;
    resolve_scenario(file, catalog)
}

/// Resolves an already-parsed scenario. Useful when the scenario did not
/// come from disk.
pub fn resolve_scenario(file: ScenarioFile, catalog: &PresetCatalog) -> SimResult<ResolvedScenario> {
    let settings = file.simulation;
    if !settings.duration_seconds.is_finite() || settings.duration_seconds <= 0.0 {
        return Err(SimError::InvalidScenario(format!(
            "duration_seconds must be positive, got {}",
            settings.duration_seconds
        )));
    }
    if !settings.dt.is_finite() || settings.dt <= 0.0 {
        return Err(SimError::InvalidScenario(format!(
            "dt must be positive, got {}",
            settings.dt
        )));
    }

    let mut vehicles: Vec<VehicleConfig> = Vec::with_capacity(file.vehicles.len());
    for raw in &file.vehicles {
        let resolved = resolve_value(raw, catalog)?;
        let vehicle: VehicleConfig = Figment::from(Serialized::defaults(resolved)).extract()?;
        if vehicles.iter().any(|v| v.name == vehicle.name) {
            return Err(SimError::InvalidScenario(format!(
                "duplicate vehicle name '{}'",
                vehicle.name
            )));
        }
        info!("Resolved vehicle: '{}'", vehicle.name);
        vehicles.push(vehicle);
    }

    Ok(ResolvedScenario {
        simulation: settings,
        vehicles,
    })
}
