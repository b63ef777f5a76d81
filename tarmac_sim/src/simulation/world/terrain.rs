// tarmac_sim/src/simulation/world/terrain.rs

//! Height fields the headless host drives vehicles over. The core only ever
//! sees the four heights sampled under the wheels.

use nalgebra::Vector3;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::f64::consts::{PI, TAU};
use tarmac_core::types::WHEEL_COUNT;

use crate::error::{SimError, SimResult};
use crate::simulation::core::prng::SimulationRng;

fn default_bump_width() -> f64 {
    4.0
}

/// Terrain shape as written in a scenario file.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "type")]
#[serde(rename_all = "PascalCase")] // e.g., "Sine" in TOML maps to `Sine` variant
pub enum TerrainProfile {
    #[default]
    Flat,
    /// Constant grade (rise over run) along world x, starting at `start`.
    Ramp {
        grade: f64,
        #[serde(default)]
        start: f64,
    },
    /// Rolling ground along world x.
    Sine { amplitude: f64, wavelength: f64 },
    /// Randomly placed cosine bumps in the strip `x in [0, length]`,
    /// `|y| <= width / 2`. Placement is drawn from the vehicle's seeded RNG.
    Bumps {
        count: usize,
        height: f64,
        radius: f64,
        length: f64,
        #[serde(default = "default_bump_width")]
        width: f64,
    },
}

impl TerrainProfile {
    fn validate(&self) -> SimResult<()> {
        let check = |name: &str, value: f64, positive: bool| {
            if !value.is_finite() || (positive && value <= 0.0) {
                Err(SimError::InvalidScenario(format!(
                    "terrain `{name}` must be {}, got {value}",
                    if positive { "positive" } else { "finite" }
                )))
            } else {
                Ok(())
            }
        };
        match *self {
            TerrainProfile::Flat => Ok(()),
            TerrainProfile::Ramp { grade, start } => {
                check("grade", grade, false)?;
                check("start", start, false)
            }
            TerrainProfile::Sine {
                amplitude,
                wavelength,
            } => {
                check("amplitude", amplitude, false)?;
                check("wavelength", wavelength, true)
            }
            TerrainProfile::Bumps {
                height,
                radius,
                length,
                width,
                ..
            } => {
                check("height", height, false)?;
                check("radius", radius, true)?;
                check("length", length, true)?;
                check("width", width, true)
            }
        }
    }
}

/// A terrain profile with any random placement already drawn.
#[derive(Debug, Clone)]
pub struct Terrain {
    profile: TerrainProfile,
    bumps: Vec<(f64, f64)>,
}

impl Terrain {
    pub fn new(profile: TerrainProfile, rng: &mut SimulationRng) -> SimResult<Self> {
        profile.validate()?;
        let bumps = match profile {
            TerrainProfile::Bumps {
                count,
                length,
                width,
                ..
            } => (0..count)
                .map(|_| {
                    let x = rng.0.gen_range(0.0..=length);
                    let y = rng.0.gen_range(-width / 2.0..=width / 2.0);
                    (x, y)
                })
                .collect(),
            _ => Vec::new(),
        };
        Ok(Self { profile, bumps })
    }

    pub fn profile(&self) -> &TerrainProfile {
        &self.profile
    }

    /// Ground height (m) at world `(x, y)`.
    pub fn height_at(&self, x: f64, y: f64) -> f64 {
        match self.profile {
            TerrainProfile::Flat => 0.0,
            TerrainProfile::Ramp { grade, start } => grade * (x - start).max(0.0),
            TerrainProfile::Sine {
                amplitude,
                wavelength,
            } => amplitude * (TAU * x / wavelength).sin(),
            TerrainProfile::Bumps { height, radius, .. } => self
                .bumps
                .iter()
                .map(|&(bx, by)| {
                    let d = (x - bx).hypot(y - by);
                    if d < radius {
                        height * 0.5 * (1.0 + (PI * d / radius).cos())
                    } else {
                        0.0
                    }
                })
                .fold(0.0, f64::max),
        }
    }

    /// Heights under each wheel, in the order the contacts are given.
    pub fn sample(&self, contacts: &[Vector3<f64>; WHEEL_COUNT]) -> [f64; WHEEL_COUNT] {
        contacts.map(|p| self.height_at(p.x, p.y))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn ramp_starts_flat() {
        let terrain = Terrain::new(
            TerrainProfile::Ramp {
                grade: 0.1,
                start: 5.0,
            },
            &mut SimulationRng::from_seed(0),
        )
        .unwrap();
        assert_eq!(terrain.height_at(2.0, 0.0), 0.0);
        assert_abs_diff_eq!(terrain.height_at(15.0, 3.0), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn sine_has_its_wavelength() {
        let terrain = Terrain::new(
            TerrainProfile::Sine {
                amplitude: 0.2,
                wavelength: 8.0,
            },
            &mut SimulationRng::from_seed(0),
        )
        .unwrap();
        assert_abs_diff_eq!(terrain.height_at(2.0, 0.0), 0.2, epsilon = 1e-12);
        assert_abs_diff_eq!(terrain.height_at(10.0, -1.0), 0.2, epsilon = 1e-12);
    }

    #[test]
    fn bumps_are_seeded() {
        let profile = TerrainProfile::Bumps {
            count: 20,
            height: 0.1,
            radius: 0.5,
            length: 50.0,
            width: 4.0,
        };
        let a = Terrain::new(profile.clone(), &mut SimulationRng::from_seed(3)).unwrap();
        let b = Terrain::new(profile, &mut SimulationRng::from_seed(3)).unwrap();
        assert_eq!(a.bumps, b.bumps);

        let &(x, y) = a.bumps.first().unwrap();
        assert_abs_diff_eq!(a.height_at(x, y), 0.1, epsilon = 1e-12);
        assert_eq!(a.height_at(-100.0, 0.0), 0.0);
    }

    #[test]
    fn rejects_degenerate_profiles() {
        let bad = TerrainProfile::Sine {
            amplitude: 0.1,
            wavelength: 0.0,
        };
        assert!(Terrain::new(bad, &mut SimulationRng::from_seed(0)).is_err());
    }

    #[test]
    fn parses_tagged_profiles() {
        let profile: TerrainProfile =
            toml::from_str("type = \"Bumps\"\ncount = 3\nheight = 0.05\nradius = 0.4\nlength = 30.0")
                .unwrap();
        assert_eq!(
            profile,
            TerrainProfile::Bumps {
                count: 3,
                height: 0.05,
                radius: 0.4,
                length: 30.0,
                width: 4.0,
            }
        );
    }
}
