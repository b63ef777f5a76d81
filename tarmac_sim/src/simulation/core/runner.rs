// tarmac_sim/src/simulation/core/runner.rs

//! Fixed-step execution of a resolved scenario. Every vehicle owns its own
//! dynamics, terrain, driver and random stream, so vehicles run on separate
//! threads without sharing anything mutable.

use std::sync::Arc;
use std::thread;

use nalgebra::Vector3;
use serde::Serialize;
use tarmac_core::dynamics::VehicleDynamics;
use tarmac_core::state::PhysicsState;
use tracing::{debug, info, warn};

use crate::error::{SimError, SimResult};
use crate::simulation::config::structs::{ResolvedScenario, VehicleConfig};
use crate::simulation::core::prng::SimulationRng;
use crate::simulation::driver::script::ScriptedDriver;
use crate::simulation::world::terrain::Terrain;

/// What is left of a vehicle once its run is over.
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub name: String,
    pub ticks: u64,
    pub elapsed: f64,
    /// Horizontal path length in meters.
    pub distance: f64,
    pub top_speed_kmh: f64,
    pub final_state: PhysicsState,
}

/// Output of a whole scenario, in scenario order.
#[derive(Debug, Clone, Serialize)]
pub struct SimulationReport {
    pub seed: u64,
    pub dt: f64,
    pub runs: Vec<RunSummary>,
}

impl SimulationReport {
    pub fn run(&self, name: &str) -> Option<&RunSummary> {
        self.runs.iter().find(|r| r.name == name)
    }
}

/// One vehicle and everything it interacts with.
#[derive(Debug, Clone)]
pub struct VehicleRun {
    name: String,
    dynamics: VehicleDynamics,
    terrain: Terrain,
    driver: ScriptedDriver,
    rng: SimulationRng,
    distance: f64,
    top_speed_kmh: f64,
}

impl VehicleRun {
    /// Builds the run for the `index`-th vehicle of a scenario seeded with `seed`.
    pub fn new(config: &VehicleConfig, seed: u64, index: usize) -> SimResult<Self> {
        let start = &config.start;
        let dynamics = VehicleDynamics::builder(Arc::new(config.vehicle.clone()))
            .tires(config.tires.clone().into_array())
            .suspensions(config.suspension.clone().into_array())
            .position(Vector3::from(start.position))
            .yaw(start.yaw_deg.to_radians())
            .gear(start.gear)
            .build()
            .map_err(|source| SimError::Vehicle {
                name: config.name.clone(),
                source,
            })?;

        let mut rng = SimulationRng::for_vehicle(seed, index);
        let terrain = Terrain::new(config.terrain.clone(), &mut rng)?;
        let driver = ScriptedDriver::new(config.inputs.clone())?;

        debug!(vehicle = %config.name, index, "run prepared");
        Ok(Self {
            name: config.name.clone(),
            dynamics,
            terrain,
            driver,
            rng,
            distance: 0.0,
            top_speed_kmh: 0.0,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn dynamics(&self) -> &VehicleDynamics {
        &self.dynamics
    }

    pub fn terrain(&self) -> &Terrain {
        &self.terrain
    }

    /// Advances the vehicle by one tick of `dt` seconds.
    pub fn step(&mut self, dt: f64) -> &PhysicsState {
        // Script time comes from the tick count so it does not drift.
        let t = self.dynamics.vehicle().tick_count as f64 * dt;
        let inputs = self.driver.sample(t, &mut self.rng);

        // 1. Ground height under each wheel at the current pose.
        let contacts = self.dynamics.wheel_contact_positions();
        let heights = self.terrain.sample(&contacts);

        // 2. Physics.
        let before = self.dynamics.vehicle().position;
        self.dynamics.tick(&inputs, heights, dt);

        // 3. Bookkeeping.
        let vehicle = self.dynamics.vehicle();
        self.distance += (vehicle.position - before).xy().norm();
        self.top_speed_kmh = self.top_speed_kmh.max(vehicle.speed_kmh);
        self.dynamics.state()
    }

    /// Runs `ticks` steps and tears the vehicle down.
    pub fn run(mut self, ticks: u64, dt: f64) -> RunSummary {
        for _ in 0..ticks {
            self.step(dt);
        }
        self.finish()
    }

    pub fn finish(self) -> RunSummary {
        let final_state = self.dynamics.destroy();
        let vehicle = &final_state.vehicle;
        if !vehicle.position.iter().all(|v| v.is_finite()) {
            warn!(vehicle = %self.name, "run finished with a non-finite position");
        }
        RunSummary {
            name: self.name,
            ticks: vehicle.tick_count,
            elapsed: vehicle.elapsed,
            distance: self.distance,
            top_speed_kmh: self.top_speed_kmh,
            final_state,
        }
    }
}

/// Runs every vehicle of `scenario` to completion, one thread per vehicle.
pub fn run_scenario(scenario: &ResolvedScenario, seed: u64) -> SimResult<SimulationReport> {
    let dt = scenario.simulation.dt;
    let ticks = scenario.simulation.tick_count();

    // Build everything up front so a bad vehicle fails before any thread starts.
    let runs = scenario
        .vehicles
        .iter()
        .enumerate()
        .map(|(index, config)| VehicleRun::new(config, seed, index))
        .collect::<SimResult<Vec<_>>>()?;

    info!(
        "Running {} vehicle(s) for {} ticks of {:.4} s (seed {}).",
        runs.len(),
        ticks,
        dt,
        seed
    );

    let runs = thread::scope(|scope| -> SimResult<Vec<RunSummary>> {
        let mut handles = Vec::with_capacity(runs.len());
        for run in runs {
            let name = run.name().to_string();
            let handle = thread::Builder::new()
                .name(format!("vehicle-{name}"))
                .spawn_scoped(scope, move || run.run(ticks, dt))?;
            handles.push((name, handle));
        }
        handles
            .into_iter()
            .map(|(name, handle)| handle.join().map_err(|_| SimError::WorkerPanicked(name)))
            .collect()
    })?;

    for run in &runs {
        info!(
            "'{}': {:.1} m in {:.2} s, top speed {:.1} km/h, final speed {:.1} km/h, gear {}.",
            run.name,
            run.distance,
            run.elapsed,
            run.top_speed_kmh,
            run.final_state.vehicle.speed_kmh,
            run.final_state.vehicle.gear
        );
    }

    Ok(SimulationReport { seed, dt, runs })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulation::config::structs::{AxlePair, SimulationSettings, StartPose};
    use crate::simulation::driver::script::{InputScript, InputSegment};
    use crate::simulation::world::terrain::TerrainProfile;
    use tarmac_core::specs::{SuspensionSpec, TireSpec, VehicleSpec};
    use tarmac_core::types::Lifecycle;

    fn segment(until: f64, throttle: f64, brake: f64, steering: f64) -> InputSegment {
        InputSegment {
            until,
            throttle,
            brake,
            clutch: 0.0,
            steering,
            gear: 1,
            ackermann: None,
        }
    }

    fn vehicle(name: &str, terrain: TerrainProfile, noise_stddev: f64) -> VehicleConfig {
        VehicleConfig {
            name: name.to_string(),
            vehicle: VehicleSpec::default(),
            tires: AxlePair::both(TireSpec::default()),
            suspension: AxlePair::both(SuspensionSpec::default()),
            start: StartPose::default(),
            terrain,
            inputs: InputScript {
                noise_stddev,
                segments: vec![segment(3.0, 0.8, 0.0, 0.1), segment(4.0, 0.0, 0.6, 0.0)],
            },
        }
    }

    fn scenario(vehicles: Vec<VehicleConfig>) -> ResolvedScenario {
        ResolvedScenario {
            simulation: SimulationSettings {
                seed: None,
                duration_seconds: 5.0,
                dt: 1.0 / 24.0,
            },
            vehicles,
        }
    }

    #[test]
    fn runs_every_vehicle_in_order() {
        let bumps = TerrainProfile::Bumps {
            count: 12,
            height: 0.05,
            radius: 0.4,
            length: 40.0,
            width: 4.0,
        };
        let scenario = scenario(vec![
            vehicle("flat", TerrainProfile::Flat, 0.0),
            vehicle("bumpy", bumps, 0.05),
        ]);
        let report = run_scenario(&scenario, 3).unwrap();

        let names: Vec<&str> = report.runs.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, ["flat", "bumpy"]);
        for run in &report.runs {
            assert_eq!(run.ticks, 120);
            assert_eq!(run.final_state.lifecycle, Lifecycle::Destroyed);
            assert!(run.distance > 1.0, "{} barely moved", run.name);
            assert!(run.top_speed_kmh >= run.final_state.vehicle.speed_kmh);
            assert!(run.final_state.vehicle.position.iter().all(|v| v.is_finite()));
        }
    }

    #[test]
    fn same_seed_same_report() {
        let scenario = scenario(vec![
            vehicle("a", TerrainProfile::Flat, 0.1),
            vehicle("b", TerrainProfile::Flat, 0.1),
        ]);
        let first = run_scenario(&scenario, 42).unwrap();
        let second = run_scenario(&scenario, 42).unwrap();
        for (x, y) in first.runs.iter().zip(&second.runs) {
            assert_eq!(x.final_state, y.final_state);
            assert_eq!(x.distance, y.distance);
        }
        // Each vehicle draws from its own stream, so identical configs still diverge.
        assert_ne!(
            first.runs[0].final_state.vehicle.position,
            first.runs[1].final_state.vehicle.position
        );
    }

    #[test]
    fn invalid_vehicle_is_reported_by_name() {
        let mut broken = vehicle("broken", TerrainProfile::Flat, 0.0);
        broken.vehicle.mass = 0.0;
        let result = run_scenario(&scenario(vec![broken]), 1);
        match result {
            Err(SimError::Vehicle { name, .. }) => assert_eq!(name, "broken"),
            other => panic!("expected a vehicle error, got {other:?}"),
        }
    }

    #[test]
    fn start_pose_is_applied() {
        let mut config = vehicle("posed", TerrainProfile::Flat, 0.0);
        config.start = StartPose {
            position: [10.0, -5.0, 0.0],
            yaw_deg: 90.0,
            gear: 2,
        };
        let run = VehicleRun::new(&config, 0, 0).unwrap();
        let vehicle = run.dynamics().vehicle();
        assert_eq!(vehicle.position.x, 10.0);
        assert_eq!(vehicle.position.y, -5.0);
        assert!((vehicle.yaw - std::f64::consts::FRAC_PI_2).abs() < 1e-12);
        assert_eq!(vehicle.gear, 2);
    }

    #[test]
    fn report_serializes_to_toml() {
        let scenario = scenario(vec![vehicle("flat", TerrainProfile::Flat, 0.0)]);
        let report = run_scenario(&scenario, 5).unwrap();
        let text = toml::to_string(&report).unwrap();
        assert!(text.contains("name = \"flat\""));
        assert!(report.run("flat").is_some());
        assert!(report.run("missing").is_none());
    }
}
