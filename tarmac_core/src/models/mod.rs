// tarmac_core/src/models/mod.rs

pub mod engine;
pub mod steering;
pub mod suspension;
pub mod tire;

pub use engine::EngineDrivetrain;
pub use suspension::{SuspensionModel, SuspensionPhase};
pub use tire::{PacejkaTire, TireForceModel};
