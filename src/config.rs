//! Simulation configuration.
//!
//! Every tunable constant of the integrator lives here and is threaded into
//! the tick explicitly. A configuration can be loaded from JSON; missing keys
//! fall back to the defaults:
//!
//! ```json
//! { "dt": 0.1, "g": 1.0, "unit_mass": 1.0, "base_radius": 1.5, "workers": 4 }
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SimError};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Fixed time step per tick.
    pub dt: f64,
    /// Gravitational constant (toy value).
    pub g: f64,
    /// Simulation mass corresponding to one body unit.
    pub unit_mass: f64,
    /// Radius of a body holding exactly one unit of mass.
    pub base_radius: f64,
    /// Number of workers used by the parallel backend. 1 runs sequentially.
    pub workers: usize,
    /// Upper bound on the number of bodies, if any.
    pub capacity: Option<usize>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            dt: Self::DEFAULT_DT,
            g: Self::DEFAULT_G,
            unit_mass: Self::DEFAULT_UNIT_MASS,
            base_radius: Self::DEFAULT_BASE_RADIUS,
            workers: 1,
            capacity: None,
        }
    }
}

impl Config {
    /// Default constants.
    pub const DEFAULT_DT: f64 = 0.1;
    pub const DEFAULT_G: f64 = 1.0;
    pub const DEFAULT_UNIT_MASS: f64 = 1.0;
    pub const DEFAULT_BASE_RADIUS: f64 = 1.5;

    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Config = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.dt.is_finite() && self.dt > 0.0) {
            return Err(SimError::InvalidConfig(format!("dt must be positive, got {}", self.dt)));
        }
        if !self.g.is_finite() {
            return Err(SimError::InvalidConfig(format!("g must be finite, got {}", self.g)));
        }
        if !(self.unit_mass.is_finite() && self.unit_mass > 0.0) {
            return Err(SimError::InvalidConfig(format!(
                "unit_mass must be positive, got {}",
                self.unit_mass
            )));
        }
        if !(self.base_radius.is_finite() && self.base_radius > 0.0) {
            return Err(SimError::InvalidConfig(format!(
                "base_radius must be positive, got {}",
                self.base_radius
            )));
        }
        if self.workers == 0 {
            return Err(SimError::InvalidConfig("workers must be at least 1".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_keys_use_defaults() {
        let config = Config::from_json_str(r#"{ "workers": 8 }"#).unwrap();
        assert_eq!(config.workers, 8);
        assert_eq!(config.dt, Config::DEFAULT_DT);
        assert_eq!(config.capacity, None);
    }

    #[test]
    fn rejects_non_positive_time_step() {
        let err = Config::from_json_str(r#"{ "dt": 0.0 }"#).unwrap_err();
        assert!(matches!(err, SimError::InvalidConfig(_)));
    }

    #[test]
    fn rejects_zero_workers() {
        let config = Config::default().with_workers(0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn malformed_json_is_a_config_error() {
        let err = Config::from_json_str("{ dt: ").unwrap_err();
        assert!(matches!(err, SimError::Config(_)));
    }
}
