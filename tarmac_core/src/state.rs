// tarmac_core/src/state.rs

//! Mutable per-vehicle and per-wheel state, driver inputs and the snapshot
//! handed to the render/animation layer.

use nalgebra::Vector3;
use serde::{Deserialize, Serialize};
use std::f64::consts::TAU;

use crate::types::{finite_or_zero, Lifecycle, WheelPosition, WHEEL_COUNT};

/// Ambient temperature tires start at and cool toward (deg C).
pub const AMBIENT_TEMPERATURE: f64 = 20.0;

// =========================================================================
// == Driver Inputs ==
// =========================================================================

/// One tick's worth of driver input. Values may arrive out of range or even
/// non-finite from noisy sources; `clamped()` brings them into domain.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DriverInputs {
    pub throttle: f64,
    pub brake: f64,
    /// Clutch pedal travel: 0 = fully engaged, 1 = fully disengaged.
    pub clutch: f64,
    /// -1 = full right lock, +1 = full left lock.
    pub steering: f64,
    /// 0 = reverse, 1..N = forward gears.
    pub gear: i32,
    /// Overrides `VehicleSpec::ackermann` for this tick.
    pub ackermann: Option<bool>,
}

impl Default for DriverInputs {
    fn default() -> Self {
        Self {
            throttle: 0.0,
            brake: 0.0,
            clutch: 0.0,
            steering: 0.0,
            gear: 1,
            ackermann: None,
        }
    }
}

impl DriverInputs {
    /// Clamps pedals to [0, 1], steering to [-1, 1] and the gear to the
    /// table's range. NaN and infinities become 0.
    pub fn clamped(&self, top_gear: i32) -> Self {
        Self {
            throttle: finite_or_zero(self.throttle).clamp(0.0, 1.0),
            brake: finite_or_zero(self.brake).clamp(0.0, 1.0),
            clutch: finite_or_zero(self.clutch).clamp(0.0, 1.0),
            steering: finite_or_zero(self.steering).clamp(-1.0, 1.0),
            gear: self.gear.clamp(0, top_gear.max(0)),
            ackermann: self.ackermann,
        }
    }
}

// =========================================================================
// == Wheel State ==
// =========================================================================

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WheelState {
    /// Display angle, wrapped to [0, 2pi).
    pub rotation: f64,
    /// Unwrapped angle used by the physics (rad).
    pub spin_angle: f64,
    /// rad/s
    pub spin_rate: f64,
    pub slip_ratio: f64,
    /// rad
    pub slip_angle: f64,
    /// Road-wheel steer angle (rad).
    pub steer_angle: f64,
    /// m, clamped to +/- travel. Positive = compressed.
    pub suspension_compression: f64,
    /// m/s
    pub suspension_velocity: f64,
    /// Force the spring and damper push into the ground (N), relative to static.
    pub suspension_force: f64,
    pub longitudinal_force: f64,
    pub lateral_force: f64,
    pub normal_force: f64,
    /// deg C
    pub tire_temperature: f64,
    /// 0 = new, 1 = worn out.
    pub tire_wear: f64,
}

impl Default for WheelState {
    fn default() -> Self {
        Self {
            rotation: 0.0,
            spin_angle: 0.0,
            spin_rate: 0.0,
            slip_ratio: 0.0,
            slip_angle: 0.0,
            steer_angle: 0.0,
            suspension_compression: 0.0,
            suspension_velocity: 0.0,
            suspension_force: 0.0,
            longitudinal_force: 0.0,
            lateral_force: 0.0,
            normal_force: 0.0,
            tire_temperature: AMBIENT_TEMPERATURE,
            tire_wear: 0.0,
        }
    }
}

impl WheelState {
    /// A resting wheel carrying `normal_force`.
    pub fn at_rest(normal_force: f64) -> Self {
        Self {
            normal_force,
            ..Default::default()
        }
    }

    /// Advances the wheel angle. The physics angle never wraps; the display angle does.
    pub fn advance_rotation(&mut self, dt: f64) {
        self.spin_angle += self.spin_rate * dt;
        self.rotation = self.spin_angle.rem_euclid(TAU);
    }
}

// =========================================================================
// == Vehicle State ==
// =========================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VehicleState {
    /// World position of the CoG projected to the ground (ENU, m).
    pub position: Vector3<f64>,
    /// World velocity (m/s).
    pub velocity: Vector3<f64>,
    /// World angular velocity (rad/s). Only z (yaw rate) is integrated.
    pub angular_velocity: Vector3<f64>,
    /// Heading around world z (rad), 0 = facing east.
    pub yaw: f64,
    /// Body-frame acceleration from the last tick (m/s^2), drives load transfer.
    pub acceleration: Vector3<f64>,
    pub rpm: f64,
    pub gear: i32,
    pub throttle: f64,
    pub brake: f64,
    pub clutch: f64,
    /// Base steer angle before Ackermann correction (rad).
    pub steering_angle: f64,
    pub speed_kmh: f64,
    /// Simulated time since creation (s).
    pub elapsed: f64,
    pub tick_count: u64,
}

impl VehicleState {
    pub fn new(idle_rpm: f64) -> Self {
        Self {
            position: Vector3::zeros(),
            velocity: Vector3::zeros(),
            angular_velocity: Vector3::zeros(),
            yaw: 0.0,
            acceleration: Vector3::zeros(),
            rpm: idle_rpm,
            gear: 1,
            throttle: 0.0,
            brake: 0.0,
            clutch: 0.0,
            steering_angle: 0.0,
            speed_kmh: 0.0,
            elapsed: 0.0,
            tick_count: 0,
        }
    }

    /// Unit vector of the body's forward (x) axis in the world frame.
    pub fn forward(&self) -> Vector3<f64> {
        Vector3::new(self.yaw.cos(), self.yaw.sin(), 0.0)
    }

    /// Unit vector of the body's left (y) axis in the world frame.
    pub fn left(&self) -> Vector3<f64> {
        Vector3::new(-self.yaw.sin(), self.yaw.cos(), 0.0)
    }

    /// Velocity expressed in the body frame: (forward, left).
    pub fn body_velocity(&self) -> (f64, f64) {
        (
            self.velocity.dot(&self.forward()),
            self.velocity.dot(&self.left()),
        )
    }
}

// =========================================================================
// == Snapshot for the Render Layer ==
// =========================================================================

/// Everything the scene layer needs to pose the vehicle for one frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhysicsState {
    pub vehicle: VehicleState,
    pub wheels: [WheelState; WHEEL_COUNT],
    pub lifecycle: Lifecycle,
    /// Track widths and wheelbase, carried so roll/pitch can be derived without the `VehicleSpec`.
    pub track_width_front: f64,
    pub track_width_rear: f64,
    pub wheelbase: f64,
}

impl PhysicsState {
    pub fn wheel(&self, position: WheelPosition) -> &WheelState {
        &self.wheels[position.index()]
    }

    /// Body roll (rad, positive = rolled toward the right) from left/right
    /// compression asymmetry, averaged over both axles.
    pub fn body_roll(&self) -> f64 {
        let c = |p: WheelPosition| self.wheel(p).suspension_compression;
        let front = (c(WheelPosition::FrontRight) - c(WheelPosition::FrontLeft))
            .atan2(self.track_width_front);
        let rear = (c(WheelPosition::RearRight) - c(WheelPosition::RearLeft))
            .atan2(self.track_width_rear);
        (front + rear) / 2.0
    }

    /// Body pitch (rad, positive = nose down) from front/rear compression asymmetry.
    pub fn body_pitch(&self) -> f64 {
        let c = |p: WheelPosition| self.wheel(p).suspension_compression;
        let front = (c(WheelPosition::FrontLeft) + c(WheelPosition::FrontRight)) / 2.0;
        let rear = (c(WheelPosition::RearLeft) + c(WheelPosition::RearRight)) / 2.0;
        (front - rear).atan2(self.wheelbase)
    }
}
