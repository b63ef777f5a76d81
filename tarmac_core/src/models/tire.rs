// tarmac_core/src/models/tire.rs

use dyn_clone::DynClone;
use std::f64::consts::FRAC_PI_2;
use std::fmt::Debug;

use crate::error::ConfigResult;
use crate::specs::{CombineMethod, TireSpec};
use crate::state::{WheelState, AMBIENT_TEMPERATURE};
use crate::types::finite_or_zero;

/// Normalized load is capped here so heavily loaded tires stop gaining grip.
pub const MAX_LOAD_FACTOR: f64 = 1.5;
/// Converts a slip angle in radians into the Magic Formula's input range.
pub const SLIP_ANGLE_SCALE: f64 = 10.0;
/// Share of grip lost by a fully worn tire.
pub const WEAR_GRIP_LOSS: f64 = 0.3;
/// Lowest grip scale the thermal model can produce.
pub const MIN_THERMAL_GRIP: f64 = 0.5;

const TRIVIAL_FORCE: f64 = 1.0e-9;

// --- TIRE MODEL TRAIT ---
// Maps contact-patch slip and load to forces `(Fx, Fy) = f(kappa, alpha, Fz, gamma)`.
/// The contract for any tire force model the vehicle can mount.
///
/// Implementations must be pure with respect to their own fields so that a
/// single model can be cloned across wheels and threads.
pub trait TireForceModel: DynClone + Debug + Send + Sync {
    /// Combined longitudinal and lateral force `(Fx, Fy)` in newtons.
    ///
    /// `grip_scale` in (0, 1] carries thermal/wear effects. Implementations
    /// must return `(0, 0)` for a non-positive `normal_force`, must never
    /// return NaN, and must keep `hypot(Fx, Fy)` within
    /// `normal_force * grip_multiplier * grip_scale`.
    fn combined_force(
        &self,
        slip_ratio: f64,
        slip_angle: f64,
        normal_force: f64,
        camber: f64,
        grip_scale: f64,
    ) -> (f64, f64);

    /// Grip scale for the current tire temperature and wear. Defaults to no effect.
    fn grip_scale(&self, temperature: f64, wear: f64) -> f64 {
        let _ = (temperature, wear);
        1.0
    }

    /// Advances temperature and wear from the wheel's last slip and force.
    /// Defaults to a tire that never heats or wears.
    fn advance_thermal(&self, wheel: &mut WheelState, dt: f64) {
        let _ = (wheel, dt);
    }
}

// This macro automatically generates the implementation of `Clone` for `Box<dyn TireForceModel>`.
dyn_clone::clone_trait_object!(TireForceModel);

/// Evaluates `D * sin(C * atan(B*x - E*(B*x - atan(B*x))))`.
pub fn magic_formula(b: f64, c: f64, d: f64, e: f64, x: f64) -> f64 {
    let bx = b * x;
    d * (c * (bx - e * (bx - bx.atan())).atan()).sin()
}

// =========================================================================
// == Pacejka Tire ==
// =========================================================================

/// Pacejka "Magic Formula" tire with combined-slip capping and a simple
/// thermal/wear grip model.
#[derive(Debug, Clone)]
pub struct PacejkaTire {
    spec: TireSpec,
}

impl PacejkaTire {
    pub fn new(spec: TireSpec) -> ConfigResult<Self> {
        spec.validate()?;
        Ok(Self { spec })
    }

    pub fn spec(&self) -> &TireSpec {
        &self.spec
    }

    fn load_factor(&self, normal_force: f64) -> f64 {
        (normal_force / self.spec.max_load).min(MAX_LOAD_FACTOR)
    }

    /// Pure longitudinal force for a slip ratio. Camber does not affect this axis.
    pub fn longitudinal_force(&self, slip_ratio: f64, normal_force: f64, _camber: f64) -> f64 {
        if !has_load(normal_force) {
            return 0.0;
        }
        let slip = finite_or_zero(slip_ratio).clamp(-1.0, 1.0);
        let k = &self.spec.longitudinal;
        let s = &self.spec;

        let b = k[2] / 1000.0;
        let c = k[0];
        let d = k[4] * self.load_factor(normal_force) * s.longitudinal_grip * s.grip_multiplier;
        let e = k[3];

        let magnitude = magic_formula(b, c, d, e, slip.abs()).abs() * normal_force / 1000.0;
        magnitude * sign_of(slip)
    }

    /// Pure lateral force for a slip angle, plus camber thrust.
    pub fn lateral_force(&self, slip_angle: f64, normal_force: f64, camber: f64) -> f64 {
        if !has_load(normal_force) {
            return 0.0;
        }
        let alpha = finite_or_zero(slip_angle).clamp(-FRAC_PI_2, FRAC_PI_2);
        let camber = finite_or_zero(camber).clamp(-FRAC_PI_2, FRAC_PI_2);
        let k = &self.spec.lateral;
        let s = &self.spec;

        let b = k[2] / 1000.0;
        let c = k[0];
        let d = k[4] * self.load_factor(normal_force) * s.lateral_grip * s.grip_multiplier;
        let e = k[3];

        let x = alpha.abs() * SLIP_ANGLE_SCALE;
        let magnitude = magic_formula(b, c, d, e, x).abs() * normal_force / 1000.0;
        let camber_thrust = normal_force * s.camber_thrust * camber.sin();
        magnitude * sign_of(alpha) + camber_thrust
    }

    /// Combined force at full grip: `(Fx, Fy)`.
    pub fn combined_force(
        &self,
        slip_ratio: f64,
        slip_angle: f64,
        normal_force: f64,
        camber: f64,
    ) -> (f64, f64) {
        self.combined_force_scaled(slip_ratio, slip_angle, normal_force, camber, 1.0)
    }

    fn combined_force_scaled(
        &self,
        slip_ratio: f64,
        slip_angle: f64,
        normal_force: f64,
        camber: f64,
        grip_scale: f64,
    ) -> (f64, f64) {
        if !has_load(normal_force) {
            return (0.0, 0.0);
        }
        let grip = if grip_scale.is_finite() {
            grip_scale.clamp(f64::EPSILON, 1.0)
        } else {
            1.0
        };

        let mut fx = self.longitudinal_force(slip_ratio, normal_force, camber) * grip;
        let mut fy = self.lateral_force(slip_angle, normal_force, camber) * grip;

        let both_active = fx.abs() > TRIVIAL_FORCE && fy.abs() > TRIVIAL_FORCE;
        if both_active && self.spec.combine_method == CombineMethod::FrictionEllipse {
            let reference = self.spec.ellipse_reference_slip;
            let fx_max = self.longitudinal_force(reference, normal_force, 0.0).abs() * grip;
            let fy_max = self.lateral_force(reference, normal_force, 0.0).abs() * grip;
            if fx_max > TRIVIAL_FORCE && fy_max > TRIVIAL_FORCE {
                let usage = (fx / fx_max).powi(2) + (fy / fy_max).powi(2);
                if usage > 1.0 {
                    let scale = 1.0 / usage.sqrt();
                    fx *= scale;
                    fy *= scale;
                }
            }
        }

        // The circle bounds both methods so the magnitude limit holds regardless.
        let limit = normal_force * self.spec.grip_multiplier * grip;
        let magnitude = fx.hypot(fy);
        if magnitude > limit {
            let scale = limit / magnitude;
            fx *= scale;
            fy *= scale;
        }
        (fx, fy)
    }
}

impl TireForceModel for PacejkaTire {
    fn combined_force(
        &self,
        slip_ratio: f64,
        slip_angle: f64,
        normal_force: f64,
        camber: f64,
        grip_scale: f64,
    ) -> (f64, f64) {
        self.combined_force_scaled(slip_ratio, slip_angle, normal_force, camber, grip_scale)
    }

    fn grip_scale(&self, temperature: f64, wear: f64) -> f64 {
        let s = &self.spec;
        let deviation = (finite_or_zero(temperature) - s.optimal_temp) / s.optimal_temp;
        let thermal = (1.0 - s.temp_sensitivity * deviation * deviation).clamp(MIN_THERMAL_GRIP, 1.0);
        let wear = finite_or_zero(wear).clamp(0.0, 1.0);
        thermal * (1.0 - WEAR_GRIP_LOSS * wear)
    }

    fn advance_thermal(&self, wheel: &mut WheelState, dt: f64) {
        if dt.is_nan() || dt <= 0.0 {
            return;
        }
        let s = &self.spec;
        let slip = wheel.slip_ratio.hypot(wheel.slip_angle);
        let work = slip * wheel.longitudinal_force.abs();

        let heating = s.heat_rate * work;
        let cooling = s.cooling_rate * (wheel.tire_temperature - AMBIENT_TEMPERATURE);
        let temperature = wheel.tire_temperature + (heating - cooling) * dt;
        wheel.tire_temperature = if temperature.is_finite() {
            temperature
        } else {
            AMBIENT_TEMPERATURE
        };

        let wear = wheel.tire_wear + s.wear_rate * work * dt;
        wheel.tire_wear = finite_or_zero(wear).clamp(0.0, 1.0);
    }
}

#[inline]
fn has_load(normal_force: f64) -> bool {
    normal_force.is_finite() && normal_force > 0.0
}

/// -1, 0 or +1. Unlike `f64::signum`, zero maps to zero.
#[inline]
fn sign_of(value: f64) -> f64 {
    if value > 0.0 {
        1.0
    } else if value < 0.0 {
        -1.0
    } else {
        0.0
    }
}
