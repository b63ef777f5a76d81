// tarmac_sim/src/simulation/config/structs.rs

use figment::value::Value;
use serde::{Deserialize, Serialize};
use tarmac_core::specs::{SuspensionSpec, TireSpec, VehicleSpec};
use tarmac_core::types::{Axle, DEFAULT_DT};

use crate::error::{SimError, SimResult};
use crate::simulation::driver::script::InputScript;
use crate::simulation::world::terrain::TerrainProfile;

// =========================================================================
// == Top-Level Scenario File ==
// =========================================================================

/// # ScenarioFile
/// The root of the data parsed from a `scenario.toml` file. Vehicles are kept
/// as raw values until the resolver has expanded their `from = "..."` presets.
#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)] // Fail if the TOML has fields not in our struct
pub struct ScenarioFile {
    #[serde(default)] // Use default if the [simulation] section is missing
    pub simulation: SimulationSettings,

    // The TOML has `[[vehicles]]`, which becomes a Vec of raw values.
    #[serde(default)]
    pub vehicles: Vec<Value>,
}

/// A scenario with every vehicle resolved and typed.
#[derive(Debug, Clone)]
pub struct ResolvedScenario {
    pub simulation: SimulationSettings,
    pub vehicles: Vec<VehicleConfig>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SimulationSettings {
    /// Optional seed for the pseudo-random number generator for determinism.
    pub seed: Option<u64>,
    /// Duration of the simulation in seconds.
    pub duration_seconds: f64,
    /// Fixed timestep in seconds.
    pub dt: f64,
}

impl Default for SimulationSettings {
    fn default() -> Self {
        Self {
            seed: None,
            duration_seconds: 10.0,
            dt: DEFAULT_DT,
        }
    }
}

impl SimulationSettings {
    /// Number of fixed steps needed to cover the duration.
    pub fn tick_count(&self) -> u64 {
        // Tolerate `duration / dt` landing a hair above an integer.
        (self.duration_seconds / self.dt - 1e-9).ceil().max(0.0) as u64
    }
}

// =========================================================================
// == Vehicles ==
// =========================================================================

/// A front/rear pair of per-axle specs.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AxlePair<T> {
    #[serde(default)]
    pub front: T,
    #[serde(default)]
    pub rear: T,
}

impl<T: Clone> AxlePair<T> {
    pub fn both(value: T) -> Self {
        Self {
            front: value.clone(),
            rear: value,
        }
    }

    pub fn get(&self, axle: Axle) -> &T {
        match axle {
            Axle::Front => &self.front,
            Axle::Rear => &self.rear,
        }
    }

    /// `[front, rear]`, the order the core takes per-axle specs in.
    pub fn into_array(self) -> [T; 2] {
        [self.front, self.rear]
    }
}

/// Initial pose and gear of a vehicle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StartPose {
    #[serde(default)]
    pub position: [f64; 3],
    /// Heading in degrees, 0 = facing world +x.
    #[serde(default)]
    pub yaw_deg: f64,
    #[serde(default = "default_gear")]
    pub gear: i32,
}

fn default_gear() -> i32 {
    1
}

impl Default for StartPose {
    fn default() -> Self {
        Self {
            position: [0.0; 3],
            yaw_deg: 0.0,
            gear: default_gear(),
        }
    }
}

/// One fully resolved `[[vehicles]]` entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct VehicleConfig {
    pub name: String,
    #[serde(default)]
    pub vehicle: VehicleSpec,
    #[serde(default)]
    pub tires: AxlePair<TireSpec>,
    #[serde(default)]
    pub suspension: AxlePair<SuspensionSpec>,
    #[serde(default)]
    pub start: StartPose,
    #[serde(default)]
    pub terrain: TerrainProfile,
    #[serde(default)]
    pub inputs: InputScript,
}

impl ResolvedScenario {
    /// Drops every vehicle except `name`.
    pub fn retain_only(&mut self, name: &str) -> SimResult<()> {
        self.vehicles.retain(|v| v.name == name);
        if self.vehicles.is_empty() {
            return Err(SimError::UnknownVehicle(name.to_string()));
        }
        Ok(())
    }
}
