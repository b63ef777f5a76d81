// tarmac_core/src/error.rs

//! Construction-time configuration errors.
//!
//! Only misconfiguration is a hard failure in this crate. Runtime inputs are
//! clamped, never rejected, so nothing in here is produced by `tick()`.

use thiserror::Error;

/// Everything that can be wrong with a `VehicleSpec`, `TireSpec` or
/// `SuspensionSpec` handed to the core.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("`{field}` must be positive, got {value}")]
    NonPositive { field: &'static str, value: f64 },

    #[error("`{field}` must be non-negative, got {value}")]
    Negative { field: &'static str, value: f64 },

    #[error("`{field}` must lie in [{min}, {max}], got {value}")]
    OutOfRange {
        field: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },

    #[error("`{field}` must be a finite number")]
    NonFinite { field: &'static str },

    #[error("gear ratio table is empty")]
    EmptyGearTable,

    /// Index 0 is reserved for reverse, so a usable table needs at least two entries.
    #[error("gear ratio table has no forward gears (index 0 is reserved for reverse)")]
    MissingForwardGear,

    #[error("forward gear {index} has invalid ratio {value}")]
    InvalidGearRatio { index: usize, value: f64 },

    #[error("peak rpm values must lie between idle ({idle}) and redline ({redline})")]
    InvalidRpmBand { idle: f64, redline: f64 },
}

pub type ConfigResult<T> = Result<T, ConfigError>;

// --- Small validation helpers shared by all spec types ---

pub(crate) fn ensure_finite(field: &'static str, value: f64) -> ConfigResult<()> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::NonFinite { field })
    }
}

pub(crate) fn ensure_positive(field: &'static str, value: f64) -> ConfigResult<()> {
    ensure_finite(field, value)?;
    if value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::NonPositive { field, value })
    }
}

pub(crate) fn ensure_non_negative(field: &'static str, value: f64) -> ConfigResult<()> {
    ensure_finite(field, value)?;
    if value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::Negative { field, value })
    }
}

pub(crate) fn ensure_in_range(
    field: &'static str,
    value: f64,
    min: f64,
    max: f64,
) -> ConfigResult<()> {
    ensure_finite(field, value)?;
    if (min..=max).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::OutOfRange {
            field,
            value,
            min,
            max,
        })
    }
}
