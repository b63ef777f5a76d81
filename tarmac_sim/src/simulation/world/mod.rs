// tarmac_sim/src/simulation/world/mod.rs

pub mod terrain;
