// tarmac_core/src/models/engine.rs

use std::f64::consts::PI;
use std::sync::Arc;

use crate::specs::{DrivetrainType, VehicleSpec};
use crate::types::{finite_or_zero, Axle, WheelPosition};

/// Torque never drops below this fraction of `max_torque`.
pub const TORQUE_FLOOR_FRACTION: f64 = 0.3;
/// Converts Nm * rpm into kW.
pub const NM_RPM_PER_KW: f64 = 9549.0;

const RPM_PER_RAD_S: f64 = 60.0 / (2.0 * PI);

/// Engine torque curve, gearbox and brake distribution for one vehicle spec.
///
/// Every method is a pure function of its arguments and the shared spec, so
/// one `EngineDrivetrain` (or many clones of it) can be used from several
/// threads at once.
#[derive(Debug, Clone)]
pub struct EngineDrivetrain {
    spec: Arc<VehicleSpec>,
}

impl EngineDrivetrain {
    /// The spec is assumed to be validated already; `VehicleDynamics::new` does that.
    pub fn new(spec: Arc<VehicleSpec>) -> Self {
        Self { spec }
    }

    pub fn spec(&self) -> &VehicleSpec {
        &self.spec
    }

    /// Parabolic torque curve peaking at `peak_torque_rpm`.
    ///
    /// The parabola reaches exactly 30% of `max_torque` at idle and at redline,
    /// so flooring outside the band leaves no step at either edge.
    pub fn torque_at_rpm(&self, rpm: f64) -> f64 {
        let s = &*self.spec;
        let floor = TORQUE_FLOOR_FRACTION * s.max_torque;
        let rpm = finite_or_zero(rpm);
        if rpm < s.idle_rpm || rpm > s.redline_rpm {
            return floor;
        }

        let span = if rpm <= s.peak_torque_rpm {
            s.peak_torque_rpm - s.idle_rpm
        } else {
            s.redline_rpm - s.peak_torque_rpm
        };
        let x = if span > f64::EPSILON {
            (rpm - s.peak_torque_rpm) / span
        } else {
            0.0
        };
        let fraction = 1.0 - (1.0 - TORQUE_FLOOR_FRACTION) * x * x;
        (fraction * s.max_torque).clamp(floor, s.max_torque)
    }

    /// Engine power in kW.
    pub fn power_at_rpm(&self, rpm: f64) -> f64 {
        let rpm = finite_or_zero(rpm);
        self.torque_at_rpm(rpm) * rpm / NM_RPM_PER_KW
    }

    /// Ratio for `gear`, or `None` when the gear is outside the table.
    pub fn gear_ratio(&self, gear: i32) -> Option<f64> {
        usize::try_from(gear)
            .ok()
            .and_then(|g| self.spec.gear_ratios.get(g).copied())
    }

    /// Total torque at the driven wheels for a forward gear.
    ///
    /// Returns 0 for reverse (`gear < 1`) and for gears outside the table.
    /// Reverse is the caller's job, see [`Self::signed_wheel_torque`].
    pub fn wheel_torque(&self, rpm: f64, gear: i32, throttle: f64) -> f64 {
        if gear < 1 {
            return 0.0;
        }
        let Some(ratio) = self.gear_ratio(gear) else {
            return 0.0;
        };
        let throttle = finite_or_zero(throttle).clamp(0.0, 1.0);
        self.torque_at_rpm(rpm)
            * throttle
            * ratio
            * self.spec.final_drive
            * self.spec.drivetrain_efficiency
    }

    /// Like [`Self::wheel_torque`] but handles reverse by inverting the sign
    /// of the torque produced through the reverse ratio.
    pub fn signed_wheel_torque(&self, rpm: f64, gear: i32, throttle: f64) -> f64 {
        if gear != 0 {
            return self.wheel_torque(rpm, gear, throttle);
        }
        let reverse_ratio = self.spec.gear_ratios.first().copied().unwrap_or(0.0).abs();
        let throttle = finite_or_zero(throttle).clamp(0.0, 1.0);
        -(self.torque_at_rpm(rpm)
            * throttle
            * reverse_ratio
            * self.spec.final_drive
            * self.spec.drivetrain_efficiency)
    }

    /// Cuts throttle once the engine is at or past redline.
    pub fn rev_limited_throttle(&self, rpm: f64, throttle: f64) -> f64 {
        if rpm >= self.spec.redline_rpm {
            0.0
        } else {
            throttle
        }
    }

    /// Engine rpm implied by a wheel angular speed in `gear`, clamped to [idle, redline].
    pub fn rpm_from_wheel_speed(&self, wheel_speed: f64, gear: i32) -> f64 {
        let ratio = self.gear_ratio(gear).unwrap_or(0.0).abs();
        let rpm = finite_or_zero(wheel_speed).abs() * ratio * self.spec.final_drive * RPM_PER_RAD_S;
        rpm.clamp(self.spec.idle_rpm, self.spec.redline_rpm)
    }

    /// Wheel angular speed (rad/s) at which the engine hits redline in `gear`.
    /// Infinite when the gear has a zero ratio.
    pub fn max_wheel_speed(&self, gear: i32) -> f64 {
        let ratio = self.gear_ratio(gear).unwrap_or(0.0).abs() * self.spec.final_drive;
        if ratio <= f64::EPSILON {
            return f64::INFINITY;
        }
        self.spec.redline_rpm / RPM_PER_RAD_S / ratio
    }

    pub fn is_driven(&self, position: WheelPosition) -> bool {
        match self.spec.drivetrain_type {
            DrivetrainType::Fwd => position.axle() == Axle::Front,
            DrivetrainType::Rwd => position.axle() == Axle::Rear,
            DrivetrainType::Awd | DrivetrainType::FourWd => true,
        }
    }

    pub fn driven_wheel_count(&self) -> usize {
        WheelPosition::ALL
            .iter()
            .filter(|&&p| self.is_driven(p))
            .count()
    }

    /// Brake torque magnitude on a single wheel for a pedal position in [0, 1].
    ///
    /// The pedal demands a share of the combined front+rear capacity split by
    /// `brake_bias`; each axle is capped at its own maximum and halved per wheel.
    pub fn brake_torque(&self, brake: f64, position: WheelPosition) -> f64 {
        let s = &*self.spec;
        let brake = finite_or_zero(brake).clamp(0.0, 1.0);
        let capacity = s.max_brake_torque_front + s.max_brake_torque_rear;
        let axle_torque = match position.axle() {
            Axle::Front => (brake * s.brake_bias * capacity).min(s.max_brake_torque_front),
            Axle::Rear => (brake * (1.0 - s.brake_bias) * capacity).min(s.max_brake_torque_rear),
        };
        axle_torque / 2.0
    }
}
