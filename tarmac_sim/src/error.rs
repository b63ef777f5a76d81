// tarmac_sim/src/error.rs

use std::path::PathBuf;

use tarmac_core::error::ConfigError;
use thiserror::Error;

/// Everything that can stop a scenario from loading or running.
#[derive(Debug, Error)]
pub enum SimError {
    #[error("failed to read configuration: {0}")]
    Figment(#[from] Box<figment::Error>),

    #[error("scenario file not found at {0:?}")]
    ScenarioNotFound(PathBuf),

    #[error("failed to resolve preset: {0}")]
    Resolve(String),

    #[error("invalid scenario: {0}")]
    InvalidScenario(String),

    #[error("vehicle '{name}' has an invalid configuration: {source}")]
    Vehicle {
        name: String,
        #[source]
        source: ConfigError,
    },

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("no vehicle named '{0}' in the scenario")]
    UnknownVehicle(String),

    #[error("worker for vehicle '{0}' panicked")]
    WorkerPanicked(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("failed to serialize report: {0}")]
    Toml(#[from] toml::ser::Error),
}

impl From<figment::Error> for SimError {
    fn from(error: figment::Error) -> Self {
        SimError::Figment(Box::new(error))
    }
}

pub type SimResult<T> = Result<T, SimError>;
