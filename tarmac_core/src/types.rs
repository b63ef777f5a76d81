// tarmac_core/src/types.rs

use serde::{Deserialize, Serialize};

// --- Core Constants ---
pub const GRAVITY: f64 = 9.81;
/// Default fixed timestep, one frame of 24 fps animation.
pub const DEFAULT_DT: f64 = 1.0 / 24.0;
pub const WHEEL_COUNT: usize = 4;

// --- Wheel Addressing ---

/// The axle a wheel (or a per-axle spec) belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Axle {
    Front,
    Rear,
}

impl Axle {
    pub fn index(self) -> usize {
        match self {
            Axle::Front => 0,
            Axle::Rear => 1,
        }
    }
}

/// Fixed wheel order used by every per-wheel array in the crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WheelPosition {
    FrontLeft,
    FrontRight,
    RearLeft,
    RearRight,
}

impl WheelPosition {
    pub const ALL: [WheelPosition; WHEEL_COUNT] = [
        WheelPosition::FrontLeft,
        WheelPosition::FrontRight,
        WheelPosition::RearLeft,
        WheelPosition::RearRight,
    ];

    pub fn index(self) -> usize {
        match self {
            WheelPosition::FrontLeft => 0,
            WheelPosition::FrontRight => 1,
            WheelPosition::RearLeft => 2,
            WheelPosition::RearRight => 3,
        }
    }

    pub fn axle(self) -> Axle {
        match self {
            WheelPosition::FrontLeft | WheelPosition::FrontRight => Axle::Front,
            WheelPosition::RearLeft | WheelPosition::RearRight => Axle::Rear,
        }
    }

    pub fn is_left(self) -> bool {
        matches!(self, WheelPosition::FrontLeft | WheelPosition::RearLeft)
    }

    /// +1 for left wheels, -1 for right wheels (body y axis points left).
    pub fn side_sign(self) -> f64 {
        if self.is_left() {
            1.0
        } else {
            -1.0
        }
    }
}

/// Lifecycle of a simulated vehicle. There is no paused state: callers stop
/// calling `tick()` to pause, and `destroy()` consumes the vehicle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Lifecycle {
    #[default]
    Created,
    Active,
    Destroyed,
}

/// Replaces non-finite values with zero. Used on every runtime input.
#[inline]
pub fn finite_or_zero(value: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        0.0
    }
}
