// tarmac_sim/examples/01_slalom.rs

//! Drives one car through a slalom without any TOML: the vehicle is built
//! from presets in code and stepped by hand, printing a line per second.
//!
//! To run this example:
//! `cargo run --example 01_slalom`

use std::sync::Arc;

use tarmac_sim::prelude::*;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

fn main() -> SimResult<()> {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .finish();
    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("failed to install log subscriber: {e}");
    }

    // --- 1. Vehicle ---
    let spec = VehicleSpec {
        drivetrain_type: DrivetrainType::Awd,
        ..Default::default()
    };
    let grippy = TireSpec {
        grip_multiplier: 1.1,
        combine_method: CombineMethod::FrictionEllipse,
        ..Default::default()
    };
    let mut car = VehicleDynamics::builder(Arc::new(spec))
        .tires([grippy.clone(), grippy])
        .suspensions([SuspensionSpec::default(), SuspensionSpec::default()])
        .build()?;

    // --- 2. World ---
    let mut rng = SimulationRng::from_seed(3);
    let terrain = Terrain::new(
        TerrainProfile::Sine {
            amplitude: 0.03,
            wavelength: 12.0,
        },
        &mut rng,
    )?;

    // --- 3. Drive ---
    let steps_per_second = 24;
    let dt = 1.0 / steps_per_second as f64;
    for step in 0..(12 * steps_per_second) {
        let t = step as f64 * dt;
        let inputs = DriverInputs {
            throttle: if t < 3.0 { 1.0 } else { 0.45 },
            steering: if t < 3.0 { 0.0 } else { 0.5 * (1.2 * t).sin() },
            gear: if t < 3.0 { 1 } else { 2 },
            ..Default::default()
        };
        let heights = terrain.sample(&car.wheel_contact_positions());
        let state = car.tick(&inputs, heights, dt);

        if (step + 1) % steps_per_second == 0 {
            let v = &state.vehicle;
            println!(
                "t={:>5.1}s  x={:>7.2} y={:>6.2}  yaw={:>6.1}°  {:>5.1} km/h  {:>4.0} rpm  roll={:>5.2}°",
                v.elapsed,
                v.position.x,
                v.position.y,
                v.yaw.to_degrees(),
                v.speed_kmh,
                v.rpm,
                state.body_roll().to_degrees()
            );
        }
    }

    let final_state = car.destroy();
    println!("Finished after {} ticks.", final_state.vehicle.tick_count);
    Ok(())
}
