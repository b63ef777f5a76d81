// tarmac_core/src/prelude.rs

// --- Core Abstractions ---
pub use crate::models::tire::TireForceModel;

// --- Configuration and State ---
pub use crate::error::{ConfigError, ConfigResult};
pub use crate::specs::{
    CombineMethod, DrivetrainType, QuarterMass, SuspensionSpec, TireSpec, VehicleSpec,
};
pub use crate::state::{DriverInputs, PhysicsState, VehicleState, WheelState};
pub use crate::types::{Axle, Lifecycle, WheelPosition, DEFAULT_DT, WHEEL_COUNT};

// --- Concrete Models ---
pub use crate::dynamics::{VehicleDynamics, VehicleDynamicsBuilder};
pub use crate::models::engine::EngineDrivetrain;
pub use crate::models::suspension::{SuspensionModel, SuspensionPhase};
pub use crate::models::tire::PacejkaTire;
