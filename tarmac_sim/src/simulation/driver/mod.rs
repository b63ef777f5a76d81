// tarmac_sim/src/simulation/driver/mod.rs

pub mod script;
