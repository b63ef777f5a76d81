// tarmac_sim/src/simulation/driver/script.rs

use rand_distr::{Distribution, Normal};
use serde::{Deserialize, Serialize};
use tarmac_core::state::DriverInputs;

use crate::error::{SimError, SimResult};
use crate::simulation::core::prng::SimulationRng;

fn first_gear() -> i32 {
    1
}

/// Driver inputs held from the previous segment's end until `until` seconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct InputSegment {
    pub until: f64,
    #[serde(default)]
    pub throttle: f64,
    #[serde(default)]
    pub brake: f64,
    #[serde(default)]
    pub clutch: f64,
    #[serde(default)]
    pub steering: f64,
    #[serde(default = "first_gear")]
    pub gear: i32,
    #[serde(default)]
    pub ackermann: Option<bool>,
}

impl InputSegment {
    fn inputs(&self) -> DriverInputs {
        DriverInputs {
            throttle: self.throttle,
            brake: self.brake,
            clutch: self.clutch,
            steering: self.steering,
            gear: self.gear,
            ackermann: self.ackermann,
        }
    }
}

/// A timed sequence of driver inputs with optional Gaussian pedal and steering noise.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct InputScript {
    /// Standard deviation of the noise added to throttle, brake and steering.
    /// The core clamps whatever comes out.
    #[serde(default)]
    pub noise_stddev: f64,
    #[serde(default)]
    pub segments: Vec<InputSegment>,
}

impl InputScript {
    /// Noise-free inputs at time `t`. After the last segment the driver lets go
    /// of everything but keeps the last gear.
    pub fn inputs_at(&self, t: f64) -> DriverInputs {
        match self.segments.iter().find(|s| t < s.until) {
            Some(segment) => segment.inputs(),
            None => DriverInputs {
                gear: self.segments.last().map_or(1, |s| s.gear),
                ..Default::default()
            },
        }
    }

    /// The script's end time, or 0 for an empty script.
    pub fn duration(&self) -> f64 {
        self.segments.last().map_or(0.0, |s| s.until)
    }
}

/// An `InputScript` bound to its noise distribution, ready to be sampled every tick.
#[derive(Debug, Clone)]
pub struct ScriptedDriver {
    script: InputScript,
    noise: Option<Normal<f64>>,
}

impl ScriptedDriver {
    pub fn new(script: InputScript) -> SimResult<Self> {
        let mut previous = f64::NEG_INFINITY;
        for segment in &script.segments {
            if !segment.until.is_finite() || segment.until <= previous {
                return Err(SimError::InvalidScenario(format!(
                    "input segment end times must be finite and increasing, got {}",
                    segment.until
                )));
            }
            previous = segment.until;
        }

        if !(script.noise_stddev.is_finite() && script.noise_stddev >= 0.0) {
            return Err(SimError::InvalidScenario(format!(
                "input noise_stddev must be finite and non-negative, got {}",
                script.noise_stddev
            )));
        }
        let noise = if script.noise_stddev == 0.0 {
            None
        } else {
            let dist = Normal::new(0.0, script.noise_stddev).map_err(|e| {
                SimError::InvalidScenario(format!(
                    "input noise_stddev {}: {e}",
                    script.noise_stddev
                ))
            })?;
            Some(dist)
        };
        Ok(Self { script, noise })
    }

    pub fn script(&self) -> &InputScript {
        &self.script
    }

    pub fn sample(&self, t: f64, rng: &mut SimulationRng) -> DriverInputs {
        let mut inputs = self.script.inputs_at(t);
        if let Some(noise) = &self.noise {
            inputs.throttle += noise.sample(&mut rng.0);
            inputs.brake += noise.sample(&mut rng.0);
            inputs.steering += noise.sample(&mut rng.0);
        }
        inputs
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn launch_then_brake() -> InputScript {
        InputScript {
            noise_stddev: 0.0,
            segments: vec![
                InputSegment {
                    until: 2.0,
                    throttle: 1.0,
                    brake: 0.0,
                    clutch: 0.0,
                    steering: 0.0,
                    gear: 1,
                    ackermann: None,
                },
                InputSegment {
                    until: 3.0,
                    throttle: 0.0,
                    brake: 0.8,
                    clutch: 0.0,
                    steering: -0.2,
                    gear: 2,
                    ackermann: Some(false),
                },
            ],
        }
    }

    #[test]
    fn segments_are_selected_by_time() {
        let script = launch_then_brake();
        assert_eq!(script.inputs_at(0.0).throttle, 1.0);
        assert_eq!(script.inputs_at(1.99).throttle, 1.0);
        let braking = script.inputs_at(2.0);
        assert_eq!(braking.brake, 0.8);
        assert_eq!(braking.gear, 2);

        let after = script.inputs_at(10.0);
        assert_eq!(after.throttle, 0.0);
        assert_eq!(after.brake, 0.0);
        assert_eq!(after.gear, 2);
        assert_eq!(script.duration(), 3.0);
    }

    #[test]
    fn noise_is_reproducible() {
        let script = InputScript {
            noise_stddev: 0.1,
            ..launch_then_brake()
        };
        let driver = ScriptedDriver::new(script).unwrap();
        let mut a = SimulationRng::from_seed(11);
        let mut b = SimulationRng::from_seed(11);
        for step in 0..50 {
            let t = step as f64 * 0.05;
            assert_eq!(driver.sample(t, &mut a), driver.sample(t, &mut b));
        }
        let noisy = driver.sample(0.5, &mut a);
        assert_ne!(noisy.throttle, 1.0);
    }

    #[test]
    fn rejects_unordered_segments_and_bad_noise() {
        let mut script = launch_then_brake();
        script.segments.swap(0, 1);
        assert!(ScriptedDriver::new(script).is_err());

        for noise_stddev in [-1.0, -1e-9, f64::NAN, f64::INFINITY] {
            let script = InputScript {
                noise_stddev,
                ..launch_then_brake()
            };
            assert!(
                matches!(ScriptedDriver::new(script), Err(SimError::InvalidScenario(_))),
                "noise_stddev {noise_stddev} was accepted"
            );
        }
    }
}
