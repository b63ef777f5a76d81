// tarmac_core/src/specs.rs

//! Immutable configuration blobs handed to the core at creation time.
//!
//! The host owns these and may share one instance between many vehicles
//! (`Arc<VehicleSpec>`). Each spec validates itself; `VehicleDynamics::new`
//! refuses to build a vehicle from a spec that fails validation.
//!
//! The `Default` impls describe a mid-size rear-wheel-drive sedan on street
//! tires. Named presets ("sports", "monster", ...) live in the host's
//! catalog as data, not here.

use serde::{Deserialize, Serialize};
use std::f64::consts::FRAC_PI_2;

use crate::error::{
    ensure_finite, ensure_in_range, ensure_non_negative, ensure_positive, ConfigError,
    ConfigResult,
};
use crate::types::{Axle, WheelPosition, GRAVITY};

// =========================================================================
// == Vehicle ==
// =========================================================================

/// Which wheels receive engine torque.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum DrivetrainType {
    #[serde(rename = "FWD")]
    Fwd,
    #[default]
    #[serde(rename = "RWD")]
    Rwd,
    #[serde(rename = "AWD")]
    Awd,
    #[serde(rename = "4WD")]
    FourWd,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct VehicleSpec {
    /// Total mass (kg).
    pub mass: f64,
    /// Fraction of the static weight carried by the front axle.
    pub mass_front_ratio: f64,
    /// Height of the center of gravity above the ground (m).
    pub center_of_gravity_height: f64,
    pub drag_coefficient: f64,
    /// Frontal area (m^2).
    pub frontal_area: f64,

    // --- Engine ---
    /// Rated power (kW). Informational; the torque curve drives the model.
    pub max_power: f64,
    /// Peak engine torque (Nm).
    pub max_torque: f64,
    pub peak_power_rpm: f64,
    pub peak_torque_rpm: f64,
    pub redline_rpm: f64,
    pub idle_rpm: f64,

    // --- Drivetrain ---
    /// Index 0 is reverse, 1..N are forward gears.
    pub gear_ratios: Vec<f64>,
    pub final_drive: f64,
    pub drivetrain_efficiency: f64,
    pub drivetrain_type: DrivetrainType,

    // --- Brakes ---
    /// Share of total brake torque sent to the front axle.
    pub brake_bias: f64,
    /// Maximum brake torque for the whole front axle (Nm).
    pub max_brake_torque_front: f64,
    /// Maximum brake torque for the whole rear axle (Nm).
    pub max_brake_torque_rear: f64,

    // --- Geometry ---
    pub wheelbase: f64,
    pub track_width_front: f64,
    pub track_width_rear: f64,
    pub tire_radius_front: f64,
    pub tire_radius_rear: f64,

    // --- Steering ---
    /// Full-lock road-wheel angle (rad).
    pub max_steering_angle: f64,
    /// Whether Ackermann geometry is applied when the input does not say otherwise.
    pub ackermann: bool,

    // --- Rotational and resistive terms ---
    /// Polar inertia of one wheel + brake assembly (kg m^2).
    pub wheel_inertia: f64,
    pub rolling_resistance: f64,
    /// Air density for the drag term (kg/m^3).
    pub air_density: f64,
    /// Body yaw inertia (kg m^2). Derived from mass and footprint when absent.
    pub yaw_inertia: Option<f64>,
}

impl Default for VehicleSpec {
    fn default() -> Self {
        Self {
            mass: 1500.0,
            mass_front_ratio: 0.55,
            center_of_gravity_height: 0.55,
            drag_coefficient: 0.30,
            frontal_area: 2.2,
            max_power: 150.0,
            max_torque: 250.0,
            peak_power_rpm: 6000.0,
            peak_torque_rpm: 4000.0,
            redline_rpm: 6800.0,
            idle_rpm: 800.0,
            gear_ratios: vec![3.3, 3.6, 2.1, 1.4, 1.0, 0.8, 0.65],
            final_drive: 3.7,
            drivetrain_efficiency: 0.85,
            drivetrain_type: DrivetrainType::Rwd,
            brake_bias: 0.65,
            max_brake_torque_front: 2500.0,
            max_brake_torque_rear: 1500.0,
            wheelbase: 2.7,
            track_width_front: 1.55,
            track_width_rear: 1.55,
            tire_radius_front: 0.33,
            tire_radius_rear: 0.33,
            max_steering_angle: 0.61,
            ackermann: true,
            wheel_inertia: 1.2,
            rolling_resistance: 0.015,
            air_density: 1.225,
            yaw_inertia: None,
        }
    }
}

impl VehicleSpec {
    /// Checks every field that would otherwise surface as a NaN or a division
    /// by zero mid-simulation.
    pub fn validate(&self) -> ConfigResult<()> {
        ensure_positive("mass", self.mass)?;
        ensure_in_range("mass_front_ratio", self.mass_front_ratio, 0.0, 1.0)?;
        ensure_non_negative("center_of_gravity_height", self.center_of_gravity_height)?;
        ensure_non_negative("drag_coefficient", self.drag_coefficient)?;
        ensure_non_negative("frontal_area", self.frontal_area)?;

        ensure_non_negative("max_power", self.max_power)?;
        ensure_positive("max_torque", self.max_torque)?;
        ensure_positive("idle_rpm", self.idle_rpm)?;
        ensure_positive("redline_rpm", self.redline_rpm)?;
        if self.redline_rpm <= self.idle_rpm {
            return Err(ConfigError::InvalidRpmBand {
                idle: self.idle_rpm,
                redline: self.redline_rpm,
            });
        }
        // The torque parabola needs room on both sides of its peak.
        let torque_peak = self.peak_torque_rpm;
        let power_peak = self.peak_power_rpm;
        if !(torque_peak > self.idle_rpm && torque_peak < self.redline_rpm)
            || !(power_peak >= self.idle_rpm && power_peak <= self.redline_rpm)
        {
            return Err(ConfigError::InvalidRpmBand {
                idle: self.idle_rpm,
                redline: self.redline_rpm,
            });
        }

        self.validate_gear_table()?;
        ensure_positive("final_drive", self.final_drive)?;
        ensure_positive("drivetrain_efficiency", self.drivetrain_efficiency)?;
        ensure_in_range("drivetrain_efficiency", self.drivetrain_efficiency, 0.0, 1.0)?;

        ensure_in_range("brake_bias", self.brake_bias, 0.0, 1.0)?;
        ensure_non_negative("max_brake_torque_front", self.max_brake_torque_front)?;
        ensure_non_negative("max_brake_torque_rear", self.max_brake_torque_rear)?;

        ensure_positive("wheelbase", self.wheelbase)?;
        ensure_positive("track_width_front", self.track_width_front)?;
        ensure_positive("track_width_rear", self.track_width_rear)?;
        ensure_positive("tire_radius_front", self.tire_radius_front)?;
        ensure_positive("tire_radius_rear", self.tire_radius_rear)?;

        ensure_positive("max_steering_angle", self.max_steering_angle)?;
        ensure_in_range("max_steering_angle", self.max_steering_angle, 0.0, FRAC_PI_2)?;

        ensure_positive("wheel_inertia", self.wheel_inertia)?;
        ensure_non_negative("rolling_resistance", self.rolling_resistance)?;
        ensure_non_negative("air_density", self.air_density)?;
        if let Some(izz) = self.yaw_inertia {
            ensure_positive("yaw_inertia", izz)?;
        }
        Ok(())
    }

    fn validate_gear_table(&self) -> ConfigResult<()> {
        match self.gear_ratios.len() {
            0 => return Err(ConfigError::EmptyGearTable),
            1 => return Err(ConfigError::MissingForwardGear),
            _ => {}
        }
        ensure_finite("gear_ratios[0]", self.gear_ratios[0])?;
        for (index, &value) in self.gear_ratios.iter().enumerate().skip(1) {
            if !value.is_finite() || value <= 0.0 {
                return Err(ConfigError::InvalidGearRatio { index, value });
            }
        }
        Ok(())
    }

    /// Highest forward gear index.
    pub fn top_gear(&self) -> i32 {
        self.gear_ratios.len().saturating_sub(1) as i32
    }

    pub fn track_width(&self, axle: Axle) -> f64 {
        match axle {
            Axle::Front => self.track_width_front,
            Axle::Rear => self.track_width_rear,
        }
    }

    pub fn tire_radius(&self, axle: Axle) -> f64 {
        match axle {
            Axle::Front => self.tire_radius_front,
            Axle::Rear => self.tire_radius_rear,
        }
    }

    /// Longitudinal distance from the CoG to the front axle.
    pub fn cg_to_front_axle(&self) -> f64 {
        self.wheelbase * (1.0 - self.mass_front_ratio)
    }

    /// Longitudinal distance from the CoG to the rear axle.
    pub fn cg_to_rear_axle(&self) -> f64 {
        self.wheelbase * self.mass_front_ratio
    }

    /// Contact patch position in the body frame (x forward, y left, origin at the CoG).
    pub fn wheel_offset(&self, position: WheelPosition) -> (f64, f64) {
        let axle = position.axle();
        let x = match axle {
            Axle::Front => self.cg_to_front_axle(),
            Axle::Rear => -self.cg_to_rear_axle(),
        };
        let y = position.side_sign() * self.track_width(axle) / 2.0;
        (x, y)
    }

    /// Static normal load on one wheel (N).
    pub fn static_wheel_load(&self, position: WheelPosition) -> f64 {
        let axle_share = match position.axle() {
            Axle::Front => self.mass_front_ratio,
            Axle::Rear => 1.0 - self.mass_front_ratio,
        };
        self.mass * GRAVITY * axle_share / 2.0
    }

    pub fn effective_yaw_inertia(&self) -> f64 {
        self.yaw_inertia.unwrap_or_else(|| {
            let track = (self.track_width_front + self.track_width_rear) / 2.0;
            self.mass * (self.wheelbase.powi(2) + track.powi(2)) / 12.0
        })
    }
}

// =========================================================================
// == Tire ==
// =========================================================================

/// How pure longitudinal and lateral forces are blended under combined slip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CombineMethod {
    #[default]
    FrictionCircle,
    FrictionEllipse,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TireSpec {
    /// Longitudinal Magic Formula coefficients `b0..b6`.
    /// Used: `b0` = C, `b2` = 1000·B, `b3` = E, `b4` = D (before load and grip scaling).
    pub longitudinal: [f64; 7],
    /// Lateral Magic Formula coefficients `a0..a6`, same layout as `longitudinal`.
    pub lateral: [f64; 7],
    /// Reference load for load normalization (N).
    pub max_load: f64,
    pub grip_multiplier: f64,
    pub longitudinal_grip: f64,
    pub lateral_grip: f64,
    /// Temperature of peak grip (deg C).
    pub optimal_temp: f64,
    pub temp_sensitivity: f64,
    pub camber_thrust: f64,
    pub combine_method: CombineMethod,
    /// Slip used to sample per-axis maxima for the friction ellipse.
    pub ellipse_reference_slip: f64,
    /// Heat generated per unit of `|slip|·|Fx|` (deg C per N per s).
    pub heat_rate: f64,
    /// Fraction of the excess over ambient shed per second.
    pub cooling_rate: f64,
    /// Wear accumulated per unit of `|slip|·|Fx|` (1/(N s)).
    pub wear_rate: f64,
}

impl Default for TireSpec {
    fn default() -> Self {
        Self {
            longitudinal: [1.65, 0.0, 10000.0, 0.3, 1400.0, 0.0, 0.0],
            lateral: [1.3, 0.0, 2600.0, 0.2, 1400.0, 0.0, 0.0],
            max_load: 5000.0,
            grip_multiplier: 1.0,
            longitudinal_grip: 1.0,
            lateral_grip: 1.0,
            optimal_temp: 85.0,
            temp_sensitivity: 0.3,
            camber_thrust: 0.1,
            combine_method: CombineMethod::FrictionCircle,
            ellipse_reference_slip: 0.1,
            heat_rate: 0.01,
            cooling_rate: 0.05,
            wear_rate: 1.0e-7,
        }
    }
}

impl TireSpec {
    pub fn validate(&self) -> ConfigResult<()> {
        for &c in self.longitudinal.iter() {
            ensure_finite("longitudinal", c)?;
        }
        for &c in self.lateral.iter() {
            ensure_finite("lateral", c)?;
        }
        ensure_positive("longitudinal[0]", self.longitudinal[0])?;
        ensure_non_negative("longitudinal[2]", self.longitudinal[2])?;
        ensure_non_negative("longitudinal[4]", self.longitudinal[4])?;
        ensure_positive("lateral[0]", self.lateral[0])?;
        ensure_non_negative("lateral[2]", self.lateral[2])?;
        ensure_non_negative("lateral[4]", self.lateral[4])?;

        ensure_positive("max_load", self.max_load)?;
        ensure_positive("grip_multiplier", self.grip_multiplier)?;
        ensure_positive("longitudinal_grip", self.longitudinal_grip)?;
        ensure_positive("lateral_grip", self.lateral_grip)?;
        ensure_positive("optimal_temp", self.optimal_temp)?;
        ensure_non_negative("temp_sensitivity", self.temp_sensitivity)?;
        ensure_finite("camber_thrust", self.camber_thrust)?;
        ensure_positive("ellipse_reference_slip", self.ellipse_reference_slip)?;
        ensure_in_range("ellipse_reference_slip", self.ellipse_reference_slip, 0.0, 1.0)?;
        ensure_non_negative("heat_rate", self.heat_rate)?;
        ensure_non_negative("cooling_rate", self.cooling_rate)?;
        ensure_non_negative("wear_rate", self.wear_rate)?;
        Ok(())
    }
}

// =========================================================================
// == Suspension ==
// =========================================================================

/// Sprung mass one corner of the suspension works against.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuarterMass {
    /// Fixed per-corner mass (kg).
    Fixed(f64),
    /// A quarter of `VehicleSpec::mass`.
    FromVehicleMass,
}

impl Default for QuarterMass {
    fn default() -> Self {
        QuarterMass::Fixed(375.0)
    }
}

impl QuarterMass {
    pub fn resolve(self, vehicle_mass: f64) -> f64 {
        match self {
            QuarterMass::Fixed(m) => m,
            QuarterMass::FromVehicleMass => vehicle_mass / 4.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SuspensionSpec {
    /// N/m
    pub spring_rate: f64,
    /// N s/m
    pub damping_coefficient: f64,
    /// Maximum compression/extension from rest (m).
    pub travel: f64,
    pub progressive_rate: bool,
    pub progressive_factor: f64,
    /// Bump-stop force at full travel (N).
    pub bump_stop_force: f64,
    /// Fraction of travel at which the bump stop starts to engage.
    pub bump_stop_compression: f64,
    pub anti_roll_stiffness: f64,
    pub quarter_mass: QuarterMass,
}

impl Default for SuspensionSpec {
    fn default() -> Self {
        Self {
            spring_rate: 35000.0,
            damping_coefficient: 3500.0,
            travel: 0.12,
            progressive_rate: true,
            progressive_factor: 0.5,
            bump_stop_force: 6000.0,
            bump_stop_compression: 0.85,
            anti_roll_stiffness: 8000.0,
            quarter_mass: QuarterMass::default(),
        }
    }
}

impl SuspensionSpec {
    pub fn validate(&self) -> ConfigResult<()> {
        ensure_positive("spring_rate", self.spring_rate)?;
        ensure_non_negative("damping_coefficient", self.damping_coefficient)?;
        ensure_positive("travel", self.travel)?;
        ensure_non_negative("progressive_factor", self.progressive_factor)?;
        ensure_non_negative("bump_stop_force", self.bump_stop_force)?;
        ensure_positive("bump_stop_compression", self.bump_stop_compression)?;
        // Engagement must leave room for the ramp before full travel.
        ensure_in_range("bump_stop_compression", self.bump_stop_compression, 0.0, 0.999)?;
        ensure_non_negative("anti_roll_stiffness", self.anti_roll_stiffness)?;
        if let QuarterMass::Fixed(m) = self.quarter_mass {
            ensure_positive("quarter_mass", m)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert!(VehicleSpec::default().validate().is_ok());
        assert!(TireSpec::default().validate().is_ok());
        assert!(SuspensionSpec::default().validate().is_ok());
    }

    #[test]
    fn rejects_zero_geometry() {
        let spec = VehicleSpec {
            tire_radius_rear: 0.0,
            ..Default::default()
        };
        assert_eq!(
            spec.validate(),
            Err(ConfigError::NonPositive {
                field: "tire_radius_rear",
                value: 0.0
            })
        );

        let spec = VehicleSpec {
            wheelbase: 0.0,
            ..Default::default()
        };
        assert!(matches!(
            spec.validate(),
            Err(ConfigError::NonPositive { field: "wheelbase", .. })
        ));
    }

    #[test]
    fn rejects_malformed_gear_tables() {
        let empty = VehicleSpec {
            gear_ratios: vec![],
            ..Default::default()
        };
        assert_eq!(empty.validate(), Err(ConfigError::EmptyGearTable));

        let reverse_only = VehicleSpec {
            gear_ratios: vec![3.0],
            ..Default::default()
        };
        assert_eq!(reverse_only.validate(), Err(ConfigError::MissingForwardGear));

        let negative_forward = VehicleSpec {
            gear_ratios: vec![3.0, 2.0, -1.0],
            ..Default::default()
        };
        assert_eq!(
            negative_forward.validate(),
            Err(ConfigError::InvalidGearRatio {
                index: 2,
                value: -1.0
            })
        );
    }

    #[test]
    fn rejects_malformed_rpm_bands() {
        let band = Err(ConfigError::InvalidRpmBand {
            idle: 800.0,
            redline: 6800.0,
        });
        for peak_torque_rpm in [800.0, 6800.0, 500.0, 7000.0, f64::NAN] {
            let spec = VehicleSpec {
                peak_torque_rpm,
                ..Default::default()
            };
            assert_eq!(spec.validate(), band, "peak torque at {peak_torque_rpm}");
        }

        let spec = VehicleSpec {
            peak_power_rpm: f64::NAN,
            ..Default::default()
        };
        assert_eq!(spec.validate(), band);

        // Peak power may sit on the redline.
        let spec = VehicleSpec {
            peak_power_rpm: 6800.0,
            ..Default::default()
        };
        assert!(spec.validate().is_ok());
    }

    #[test]
    fn zero_reverse_ratio_is_legal() {
        let spec = VehicleSpec {
            gear_ratios: vec![0.0, 3.6, 2.1, 1.4, 1.0, 0.8, 0.65],
            ..Default::default()
        };
        assert!(spec.validate().is_ok());
    }

    #[test]
    fn rejects_bad_suspension_and_tire() {
        let spring = SuspensionSpec {
            spring_rate: -10.0,
            ..Default::default()
        };
        assert!(matches!(
            spring.validate(),
            Err(ConfigError::NonPositive { field: "spring_rate", .. })
        ));

        let travel = SuspensionSpec {
            travel: 0.0,
            ..Default::default()
        };
        assert!(travel.validate().is_err());

        let tire = TireSpec {
            grip_multiplier: 0.0,
            ..Default::default()
        };
        assert!(tire.validate().is_err());

        let tire = TireSpec {
            max_load: f64::NAN,
            ..Default::default()
        };
        assert_eq!(
            tire.validate(),
            Err(ConfigError::NonFinite { field: "max_load" })
        );
    }

    #[test]
    fn static_loads_sum_to_weight() {
        let spec = VehicleSpec::default();
        let total: f64 = WheelPosition::ALL
            .iter()
            .map(|&p| spec.static_wheel_load(p))
            .sum();
        approx::assert_relative_eq!(total, spec.mass * GRAVITY, epsilon = 1e-9);
    }

    #[test]
    fn quarter_mass_resolution() {
        assert_eq!(QuarterMass::default().resolve(2000.0), 375.0);
        assert_eq!(QuarterMass::FromVehicleMass.resolve(2000.0), 500.0);
    }
}
