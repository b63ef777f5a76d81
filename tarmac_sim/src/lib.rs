// tarmac_sim/src/lib.rs

//! Headless host for `tarmac_core`: loads scenarios and presets from TOML,
//! generates terrain and scripted driver inputs, and runs every vehicle of a
//! scenario at a fixed timestep.

// This prelude is for convenience for other files WITHIN the tarmac_sim crate.
pub mod prelude;

pub mod cli;
pub mod error;
pub mod simulation;
