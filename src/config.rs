//! Model configuration.
//!
//! Configurations are plain JSON. Every field has a default, so `{}` is a
//! valid file describing the standard Circles model: 16384 agents, radius
//! 2.0, repulse factor 0.05.
//!
//! ```json
//! {
//!   "agent_count": 4096,
//!   "interaction_radius": 2.0,
//!   "repulse_factor": 0.05,
//!   "steps": 200,
//!   "seed": 7
//! }
//! ```

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{ConfigurationError, SimulationError};
use crate::interactions::RepulsionModel;
use crate::spatial::{Bounds, SpatialConfig};

fn default_agent_count() -> u32 {
    16384
}

fn default_radius() -> f64 {
    2.0
}

fn default_repulse() -> f64 {
    0.05
}

fn default_steps() -> u32 {
    100
}

fn default_seed() -> u64 {
    0
}

/// Parameters of a Circles run.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct CirclesConfig {
    #[serde(default = "default_agent_count")]
    pub agent_count: u32,
    #[serde(default = "default_radius")]
    pub interaction_radius: f64,
    #[serde(default = "default_repulse")]
    pub repulse_factor: f64,
    /// Steps executed by the `circles` runner.
    #[serde(default = "default_steps")]
    pub steps: u32,
    /// Seed for the initial population.
    #[serde(default = "default_seed")]
    pub seed: u64,
    /// Grid cell size; the interaction radius when absent.
    #[serde(default)]
    pub cell_size: Option<f64>,
}

impl Default for CirclesConfig {
    fn default() -> Self {
        Self {
            agent_count: default_agent_count(),
            interaction_radius: default_radius(),
            repulse_factor: default_repulse(),
            steps: default_steps(),
            seed: default_seed(),
            cell_size: None,
        }
    }
}

impl CirclesConfig {
    /// Parse a configuration from JSON text and validate it.
    pub fn from_json(json: &str) -> Result<Self, SimulationError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a JSON configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SimulationError> {
        let json = fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Serialize to pretty-printed JSON.
    pub fn to_json(&self) -> Result<String, SimulationError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if self.agent_count == 0 {
            return Err(ConfigurationError::NoAgents);
        }
        self.repulsion_model()?;
        self.spatial_config().grid_dims(&self.bounds())?;
        Ok(())
    }

    /// Edge length of the environment cube, `floor(cbrt(agent_count))`.
    pub fn env_max(&self) -> f64 {
        let count = u64::from(self.agent_count);
        // integer correction: cbrt of a perfect cube may round just below it
        let mut n = (count as f64).cbrt().floor() as u64;
        while (n + 1).pow(3) <= count {
            n += 1;
        }
        while n > 0 && n.pow(3) > count {
            n -= 1;
        }
        n as f64
    }

    /// The environment cube `[0, env_max)^3`.
    pub fn bounds(&self) -> Bounds {
        Bounds::cube(0.0, self.env_max())
    }

    pub fn spatial_config(&self) -> SpatialConfig {
        let spatial = SpatialConfig::new(self.interaction_radius);
        match self.cell_size {
            Some(size) => spatial.with_cell_size(size),
            None => spatial,
        }
    }

    pub fn repulsion_model(&self) -> Result<RepulsionModel, ConfigurationError> {
        RepulsionModel::new(self.interaction_radius, self.repulse_factor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_circles_model() {
        let config = CirclesConfig::default();
        assert_eq!(config.agent_count, 16384);
        assert_eq!(config.interaction_radius, 2.0);
        assert_eq!(config.repulse_factor, 0.05);
        assert_eq!(config.env_max(), 25.0);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_empty_json_uses_defaults() {
        let config = CirclesConfig::from_json("{}").unwrap();
        assert_eq!(config, CirclesConfig::default());
    }

    #[test]
    fn test_partial_json() {
        let config =
            CirclesConfig::from_json(r#"{ "agent_count": 1200, "cell_size": 0.5 }"#).unwrap();
        assert_eq!(config.agent_count, 1200);
        assert_eq!(config.env_max(), 10.0);
        assert_eq!(config.spatial_config().cell_size, 0.5);
        assert_eq!(config.spatial_config().radius, 2.0);
    }

    #[test]
    fn test_invalid_values_rejected() {
        let err = CirclesConfig::from_json(r#"{ "interaction_radius": 0.0 }"#).unwrap_err();
        assert!(matches!(
            err,
            SimulationError::Configuration(ConfigurationError::InvalidRadius(_))
        ));

        let err = CirclesConfig::from_json(r#"{ "agent_count": 0 }"#).unwrap_err();
        assert!(matches!(err, SimulationError::Configuration(ConfigurationError::NoAgents)));

        let err = CirclesConfig::from_json(r#"{ "repulse_factor": -1.0 }"#).unwrap_err();
        assert!(matches!(
            err,
            SimulationError::Configuration(ConfigurationError::InvalidRepulseFactor(_))
        ));
    }

    #[test]
    fn test_oversized_grid_rejected() {
        let err = CirclesConfig::from_json(r#"{ "agent_count": 1000, "cell_size": 0.001 }"#)
            .unwrap_err();
        assert!(matches!(
            err,
            SimulationError::Configuration(ConfigurationError::GridTooLarge { .. })
        ));
    }

    #[test]
    fn test_malformed_json() {
        let err = CirclesConfig::from_json("{ agent_count: ").unwrap_err();
        assert!(matches!(err, SimulationError::Parse(_)));
    }

    #[test]
    fn test_json_round_trip() {
        let config = CirclesConfig { agent_count: 27, seed: 9, ..Default::default() };
        let back = CirclesConfig::from_json(&config.to_json().unwrap()).unwrap();
        assert_eq!(back, config);
    }

    #[test]
    fn test_env_max_on_perfect_cubes() {
        for n in [1u32, 2, 4, 10, 25, 40] {
            let config = CirclesConfig { agent_count: n * n * n, ..Default::default() };
            assert_eq!(config.env_max(), n as f64);
            let config = CirclesConfig { agent_count: n * n * n - 1, ..Default::default() };
            assert_eq!(config.env_max(), (n - 1) as f64);
        }
    }

    #[test]
    fn test_single_agent_environment() {
        let config = CirclesConfig { agent_count: 1, ..Default::default() };
        assert_eq!(config.env_max(), 1.0);
        assert!(config.validate().is_ok());
    }
}
