//! Configuration validation.
//!
//! [`validate_simulation_config`] checks the settings that have no
//! command-line override before any history is loaded. Numeric settings can be
//! overridden, so they are checked after merging with the per-value
//! validators below.

use crate::domain::error::RetireSimError;
use crate::ports::config_port::ConfigPort;

pub const SIMULATION_SECTION: &str = "simulation";
pub const DATA_SECTION: &str = "data";

/// Percentage of the portfolio withdrawn per year, as written in config.
pub const DEFAULT_SPENDING_PERCENTAGE: f64 = 4.0;

pub fn validate_simulation_config(config: &dyn ConfigPort) -> Result<(), RetireSimError> {
    validate_withdrawal_mode(config)?;
    validate_data_paths(config)?;
    Ok(())
}

/// `percentage` is in percent, e.g. 4 for 4%.
pub fn validate_spending_percentage(percentage: f64) -> Result<(), RetireSimError> {
    if !(percentage > 0.0 && percentage <= 100.0) {
        return Err(invalid(
            "spending_percentage",
            "spending_percentage must be greater than 0 and at most 100",
        ));
    }
    Ok(())
}

pub fn validate_starting_cash(value: f64) -> Result<(), RetireSimError> {
    if !(value > 0.0 && value.is_finite()) {
        return Err(invalid("starting_cash", "starting_cash must be positive"));
    }
    Ok(())
}

pub fn validate_num_years(value: i64) -> Result<(), RetireSimError> {
    if value < 1 || value > i64::from(u16::MAX) {
        return Err(invalid(
            "num_years",
            "num_years must be at least 1 and at most 65535",
        ));
    }
    Ok(())
}

fn validate_withdrawal_mode(config: &dyn ConfigPort) -> Result<(), RetireSimError> {
    let Some(raw) = config.get_string(SIMULATION_SECTION, "spend_fixed_real_amount") else {
        return Ok(());
    };
    // get_bool falls back to the default on unrecognised text, so probe both.
    let as_true = config.get_bool(SIMULATION_SECTION, "spend_fixed_real_amount", true);
    let as_false = config.get_bool(SIMULATION_SECTION, "spend_fixed_real_amount", false);
    if as_true != as_false {
        return Err(invalid(
            "spend_fixed_real_amount",
            &format!("expected true/false, got {:?}", raw),
        ));
    }
    Ok(())
}

fn validate_data_paths(config: &dyn ConfigPort) -> Result<(), RetireSimError> {
    for key in ["prices", "inflation"] {
        if let Some(path) = config.get_string(DATA_SECTION, key) {
            if path.trim().is_empty() {
                return Err(RetireSimError::ConfigInvalid {
                    section: DATA_SECTION.to_string(),
                    key: key.to_string(),
                    reason: format!("{} path must not be empty", key),
                });
            }
        }
    }
    Ok(())
}

fn invalid(key: &str, reason: &str) -> RetireSimError {
    RetireSimError::ConfigInvalid {
        section: SIMULATION_SECTION.to_string(),
        key: key.to_string(),
        reason: reason.to_string(),
    }
}
