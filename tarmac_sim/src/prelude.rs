// tarmac_sim/src/prelude.rs

// Re-export the entire tarmac_core prelude so the pure types like
// `VehicleDynamics`, `VehicleSpec` and `PhysicsState` come along.
pub use tarmac_core::prelude::*;

// Re-export common simulation-specific types.
pub use crate::error::{SimError, SimResult};
pub use crate::simulation::config::structs::*;
pub use crate::simulation::config::{load_scenario, resolve_scenario, PresetCatalog};
pub use crate::simulation::core::prng::SimulationRng;
pub use crate::simulation::core::runner::{run_scenario, RunSummary, SimulationReport, VehicleRun};
pub use crate::simulation::driver::script::{InputScript, InputSegment, ScriptedDriver};
pub use crate::simulation::world::terrain::{Terrain, TerrainProfile};
