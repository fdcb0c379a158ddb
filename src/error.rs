//! Error types for the Circles engine.
//!
//! Index construction and model configuration can fail; the force law and the
//! convergence monitor cannot. Numeric degeneracies (coincident agents, empty
//! neighborhoods) are handled by branching and never surface here.

use std::fmt;

/// Invalid engine parameters, detected when a model or index is built.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigurationError {
    /// Interaction radius is zero, negative, or not finite.
    InvalidRadius(f64),
    /// Grid cell size is zero, negative, or not finite.
    InvalidCellSize(f64),
    /// Bounds are empty (`min >= max`) or not finite on the given axis.
    InvalidBounds { axis: char, min: f64, max: f64 },
    /// Bounds divided by the cell size produce more cells than the index allows.
    GridTooLarge { cells: u64, limit: u64 },
    /// The index radius differs from the force law radius.
    RadiusMismatch { model: f64, index: f64 },
    /// Repulse factor is zero, negative, or not finite.
    InvalidRepulseFactor(f64),
    /// A population of zero agents was requested.
    NoAgents,
    /// Two agents in a supplied population share an id.
    DuplicateId(u64),
}

impl fmt::Display for ConfigurationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigurationError::InvalidRadius(r) => {
                write!(f, "Interaction radius must be finite and positive, got {}", r)
            }
            ConfigurationError::InvalidCellSize(s) => {
                write!(f, "Cell size must be finite and positive, got {}", s)
            }
            ConfigurationError::InvalidBounds { axis, min, max } => write!(
                f,
                "Bounds on the {} axis must satisfy min < max, got [{}, {})",
                axis, min, max
            ),
            ConfigurationError::GridTooLarge { cells, limit } => write!(
                f,
                "Spatial grid would need {} cells (limit {}). Increase the cell size or shrink the bounds.",
                cells, limit
            ),
            ConfigurationError::RadiusMismatch { model, index } => write!(
                f,
                "Spatial index radius {} must equal the interaction radius {}",
                index, model
            ),
            ConfigurationError::InvalidRepulseFactor(k) => {
                write!(f, "Repulse factor must be finite and positive, got {}", k)
            }
            ConfigurationError::NoAgents => write!(f, "Agent count must be greater than zero"),
            ConfigurationError::DuplicateId(id) => {
                write!(f, "Agent id {} appears more than once in the population", id)
            }
        }
    }
}

impl std::error::Error for ConfigurationError {}

/// Errors that can occur when loading or running a simulation.
#[derive(Debug)]
pub enum SimulationError {
    /// Parameters failed validation.
    Configuration(ConfigurationError),
    /// Failed to read a configuration file.
    Io(std::io::Error),
    /// Configuration file is not valid JSON for [`CirclesConfig`](crate::CirclesConfig).
    Parse(serde_json::Error),
}

impl fmt::Display for SimulationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SimulationError::Configuration(e) => write!(f, "Invalid configuration: {}", e),
            SimulationError::Io(e) => write!(f, "Failed to read configuration file: {}", e),
            SimulationError::Parse(e) => write!(f, "Failed to parse configuration: {}", e),
        }
    }
}

impl std::error::Error for SimulationError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SimulationError::Configuration(e) => Some(e),
            SimulationError::Io(e) => Some(e),
            SimulationError::Parse(e) => Some(e),
        }
    }
}

impl From<ConfigurationError> for SimulationError {
    fn from(e: ConfigurationError) -> Self {
        SimulationError::Configuration(e)
    }
}

impl From<std::io::Error> for SimulationError {
    fn from(e: std::io::Error) -> Self {
        SimulationError::Io(e)
    }
}

impl From<serde_json::Error> for SimulationError {
    fn from(e: serde_json::Error) -> Self {
        SimulationError::Parse(e)
    }
}
