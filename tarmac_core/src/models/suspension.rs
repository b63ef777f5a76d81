// tarmac_core/src/models/suspension.rs

use serde::{Deserialize, Serialize};

use crate::error::{ensure_positive, ConfigResult};
use crate::specs::SuspensionSpec;
use crate::state::WheelState;
use crate::types::finite_or_zero;

/// Per-tick velocity retention. Bleeds energy the explicit integrator would otherwise add.
pub const NUMERICAL_DAMPING: f64 = 0.99;

/// Which side of the bump-stop threshold a wheel is on. Forces blend
/// continuously across the boundary; the phase is for reporting only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SuspensionPhase {
    FreeTravel,
    BumpStopEngaged,
}

/// Spring-damper corner with progressive rate, bump stop and anti-roll coupling.
///
/// The model holds only configuration. The evolving compression and velocity
/// live in the `WheelState` passed to [`SuspensionModel::tick`].
#[derive(Debug, Clone)]
pub struct SuspensionModel {
    spec: SuspensionSpec,
    quarter_mass: f64,
}

impl SuspensionModel {
    pub fn new(spec: SuspensionSpec, vehicle_mass: f64) -> ConfigResult<Self> {
        spec.validate()?;
        ensure_positive("mass", vehicle_mass)?;
        let quarter_mass = spec.quarter_mass.resolve(vehicle_mass);
        ensure_positive("quarter_mass", quarter_mass)?;
        Ok(Self { spec, quarter_mass })
    }

    pub fn spec(&self) -> &SuspensionSpec {
        &self.spec
    }

    pub fn quarter_mass(&self) -> f64 {
        self.quarter_mass
    }

    pub fn compression_ratio(&self, compression: f64) -> f64 {
        compression / self.spec.travel
    }

    pub fn phase(&self, compression: f64) -> SuspensionPhase {
        if self.compression_ratio(compression).abs() >= self.spec.bump_stop_compression {
            SuspensionPhase::BumpStopEngaged
        } else {
            SuspensionPhase::FreeTravel
        }
    }

    /// 0 below the engagement threshold, rising linearly to 1 at full travel.
    pub fn bump_stop_blend(&self, compression: f64) -> f64 {
        let ratio = self.compression_ratio(compression).abs();
        let start = self.spec.bump_stop_compression;
        ((ratio - start) / (1.0 - start)).clamp(0.0, 1.0)
    }

    /// Bump-stop force on the wheel, always opposing further travel.
    pub fn bump_stop_force(&self, compression: f64) -> f64 {
        let blend = self.bump_stop_blend(compression);
        if blend <= 0.0 {
            return 0.0;
        }
        -compression.signum() * self.spec.bump_stop_force * blend
    }

    /// Rate multiplier at the given compression: 1 for linear springs.
    pub fn progressive_multiplier(&self, compression: f64) -> f64 {
        if self.spec.progressive_rate {
            1.0 + self.spec.progressive_factor * self.compression_ratio(compression).abs()
        } else {
            1.0
        }
    }

    /// Advances one wheel toward `target_compression` and returns the new
    /// compression ratio (`compression / travel`, within [-1, 1]).
    ///
    /// A non-positive `dt` leaves the wheel untouched.
    pub fn tick(&self, wheel: &mut WheelState, target_compression: f64, dt: f64) -> f64 {
        let travel = self.spec.travel;
        if !dt.is_finite() || dt <= 0.0 {
            return self.compression_ratio(wheel.suspension_compression);
        }

        let compression = wheel.suspension_compression;
        let target = finite_or_zero(target_compression).clamp(-travel, travel);

        // 1-4. Forces
        let error = target - compression;
        let spring = self.spec.spring_rate * error * self.progressive_multiplier(compression);
        let damping = -self.spec.damping_coefficient * wheel.suspension_velocity;
        let bump_stop = self.bump_stop_force(compression);
        let total = spring + damping + bump_stop;

        // 5. Semi-implicit Euler with numerical damping
        let acceleration = total / self.quarter_mass;
        let mut velocity = (wheel.suspension_velocity + acceleration * dt) * NUMERICAL_DAMPING;
        let mut next = compression + velocity * dt;

        // 6. Hard limit, no energy injection at the stop
        if next.abs() > travel {
            next = travel.copysign(next);
            velocity = 0.0;
        }

        wheel.suspension_compression = next;
        wheel.suspension_velocity = velocity;
        wheel.suspension_force = self.load_force(wheel);
        self.compression_ratio(next)
    }

    /// Extra force the corner pushes into the ground relative to static (N).
    /// Positive when compressed or compressing.
    pub fn load_force(&self, wheel: &WheelState) -> f64 {
        let x = wheel.suspension_compression;
        let spring = self.spec.spring_rate * x * self.progressive_multiplier(x);
        let damping = self.spec.damping_coefficient * wheel.suspension_velocity;
        spring + damping - self.bump_stop_force(x)
    }

    /// Couples the two wheels of one axle. Call once per axle per tick, after
    /// both wheels have been ticked.
    pub fn apply_anti_roll(&self, left: &mut WheelState, right: &mut WheelState, dt: f64) {
        if !dt.is_finite() || dt <= 0.0 {
            return;
        }
        let moment = self.spec.anti_roll_stiffness
            * (left.suspension_compression - right.suspension_compression);
        let nudge = moment / (2.0 * self.quarter_mass) * dt;
        left.suspension_velocity -= nudge;
        right.suspension_velocity += nudge;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::specs::QuarterMass;
    use approx::assert_abs_diff_eq;

    fn corner() -> SuspensionModel {
        SuspensionModel::new(SuspensionSpec::default(), 1500.0).unwrap()
    }

    #[test]
    fn rest_is_an_equilibrium() {
        let rates = [(10_000.0, 0.0), (35_000.0, 3500.0), (90_000.0, 9000.0)];
        for (spring_rate, damping_coefficient) in rates {
            let model = SuspensionModel::new(
                SuspensionSpec {
                    spring_rate,
                    damping_coefficient,
                    ..Default::default()
                },
                1500.0,
            )
            .unwrap();
            let mut wheel = WheelState::default();
            let ratio = model.tick(&mut wheel, 0.0, 1.0 / 24.0);
            assert_eq!(ratio, 0.0);
            assert_eq!(wheel.suspension_velocity, 0.0);
        }
    }

    #[test]
    fn settles_toward_target() {
        let model = corner();
        let mut wheel = WheelState::default();
        let target = 0.04;
        let mut ratio = 0.0;
        for _ in 0..24 * 10 {
            ratio = model.tick(&mut wheel, target, 1.0 / 24.0);
        }
        assert_abs_diff_eq!(ratio, target / model.spec().travel, epsilon = 1e-3);
    }

    #[test]
    fn compression_never_exceeds_travel() {
        let model = SuspensionModel::new(
            SuspensionSpec {
                damping_coefficient: 0.0,
                ..Default::default()
            },
            1500.0,
        )
        .unwrap();
        let travel = model.spec().travel;
        let mut wheel = WheelState::default();
        let targets = [10.0, -10.0, 0.5, -0.3, f64::NAN, 0.0, 1.0e9];
        for step in 0..500 {
            let target = targets[step % targets.len()];
            let dt = if step % 3 == 0 { 0.2 } else { 1.0 / 24.0 };
            let ratio = model.tick(&mut wheel, target, dt);
            assert!(wheel.suspension_compression.abs() <= travel);
            assert!(ratio.abs() <= 1.0);
            assert!(wheel.suspension_velocity.is_finite());
        }
    }

    #[test]
    fn hitting_the_limit_zeroes_velocity() {
        let model = corner();
        let travel = model.spec().travel;
        let mut wheel = WheelState {
            suspension_compression: 0.9 * travel,
            suspension_velocity: 50.0,
            ..Default::default()
        };
        model.tick(&mut wheel, travel, 1.0 / 24.0);
        assert_eq!(wheel.suspension_compression, travel);
        assert_eq!(wheel.suspension_velocity, 0.0);
    }

    #[test]
    fn bump_stop_blends_continuously() {
        let model = corner();
        let travel = model.spec().travel;
        assert_eq!(model.bump_stop_blend(0.5 * travel), 0.0);
        assert_abs_diff_eq!(model.bump_stop_blend(0.85 * travel), 0.0, epsilon = 1e-9);
        assert_abs_diff_eq!(model.bump_stop_blend(0.925 * travel), 0.5, epsilon = 1e-9);
        assert_abs_diff_eq!(model.bump_stop_blend(travel), 1.0, epsilon = 1e-9);
        assert_abs_diff_eq!(model.bump_stop_blend(-travel), 1.0, epsilon = 1e-9);

        assert_eq!(model.phase(0.5 * travel), SuspensionPhase::FreeTravel);
        assert_eq!(model.phase(0.9 * travel), SuspensionPhase::BumpStopEngaged);
        assert_eq!(model.phase(-0.9 * travel), SuspensionPhase::BumpStopEngaged);

        // Opposes further travel in both directions.
        assert!(model.bump_stop_force(0.95 * travel) < 0.0);
        assert!(model.bump_stop_force(-0.95 * travel) > 0.0);
        assert_abs_diff_eq!(
            model.bump_stop_force(travel),
            -model.spec().bump_stop_force,
            epsilon = 1e-9
        );
    }

    #[test]
    fn progressive_springs_stiffen_with_travel() {
        let progressive = corner();
        let linear = SuspensionModel::new(
            SuspensionSpec {
                progressive_rate: false,
                ..Default::default()
            },
            1500.0,
        )
        .unwrap();
        let x = 0.06;
        assert_eq!(linear.progressive_multiplier(x), 1.0);
        assert_abs_diff_eq!(progressive.progressive_multiplier(x), 1.25, epsilon = 1e-12);
    }

    #[test]
    fn anti_roll_pulls_sides_together() {
        let model = corner();
        let mut left = WheelState {
            suspension_compression: 0.05,
            ..Default::default()
        };
        let mut right = WheelState {
            suspension_compression: -0.01,
            ..Default::default()
        };
        model.apply_anti_roll(&mut left, &mut right, 1.0 / 24.0);
        assert!(left.suspension_velocity < 0.0);
        assert!(right.suspension_velocity > 0.0);
        assert_abs_diff_eq!(
            left.suspension_velocity,
            -right.suspension_velocity,
            epsilon = 1e-12
        );
    }

    #[test]
    fn zero_timestep_is_a_no_op() {
        let model = corner();
        let mut wheel = WheelState {
            suspension_compression: 0.03,
            suspension_velocity: -0.2,
            ..Default::default()
        };
        let before = wheel;
        model.tick(&mut wheel, 0.1, 0.0);
        let mut other = before;
        model.apply_anti_roll(&mut wheel, &mut other, 0.0);
        assert_eq!(wheel, before);
        assert_eq!(other, before);
    }

    #[test]
    fn quarter_mass_can_follow_vehicle_mass() {
        let model = SuspensionModel::new(
            SuspensionSpec {
                quarter_mass: QuarterMass::FromVehicleMass,
                ..Default::default()
            },
            2000.0,
        )
        .unwrap();
        assert_eq!(model.quarter_mass(), 500.0);
        assert_eq!(corner().quarter_mass(), 375.0);
    }

    #[test]
    fn rejects_invalid_configuration() {
        let err = SuspensionModel::new(
            SuspensionSpec {
                spring_rate: -1.0,
                ..Default::default()
            },
            1500.0,
        );
        assert!(err.is_err());
        assert!(SuspensionModel::new(SuspensionSpec::default(), 0.0).is_err());
    }
}
