// tarmac_core/src/lib.rs

//! Vehicle-dynamics core: engine and drivetrain, Pacejka tires, suspension
//! and the per-vehicle orchestrator. Pure data in, data out; the host owns
//! terrain, rendering and configuration files.

pub mod dynamics;
pub mod error;
pub mod models;
pub mod prelude;
pub mod specs;
pub mod state;
pub mod types;
