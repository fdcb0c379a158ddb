//! # Circles
//!
//! A discrete-time particle model: point agents in a bounded 3D box
//! repeatedly look up their neighbors within a fixed radius and move under a
//! radius-normalized repulsion force, settling toward a locally even spacing.
//!
//! ## Quick Start
//!
//! ```ignore
//! use circles::prelude::*;
//!
//! fn main() -> Result<(), SimulationError> {
//!     let summary = Simulation::new()
//!         .with_agent_count(4096)
//!         .with_radius(2.0)
//!         .with_repulse_factor(0.05)
//!         .run(100)?;
//!     println!("{} drift correct", summary.report);
//!     Ok(())
//! }
//! ```
//!
//! ## Core Concepts
//!
//! ### Steps
//!
//! Each step is two phases over a frozen snapshot of the current generation:
//!
//! 1. [`SpatialIndex`] is rebuilt from every agent's position.
//! 2. Every agent queries its neighbors and computes its update with the
//!    [`RepulsionModel`], in parallel.
//!
//! The results form the next generation. No agent ever reads a value written
//! in the same step. See [`SimulationStep::advance`].
//!
//! ### Pseudo-distance
//!
//! Separation is measured as `cbrt(dx² + dy² + dz²)` ([`pseudo_distance`]),
//! not the Euclidean distance. It governs neighbor selection, the force
//! profile, and drift.
//!
//! ### Convergence
//!
//! The total drift of each generation is fed to a [`ConvergenceMonitor`],
//! which reports how often it dropped versus rose. The report is advisory and
//! never alters the run.
//!
//! ## Spatial Index
//!
//! A uniform grid over the environment box with cells sized to the radius by
//! default. Configure smaller cells with:
//!
//! ```ignore
//! .with_cell_size(cell_size)
//! ```
//!
//! Agents that drift outside the box are clamped into boundary cells rather
//! than dropped.

mod agent;
mod config;
mod convergence;
mod error;
mod interactions;
mod simulation;
pub mod spatial;
pub mod spawn;
mod step;
pub mod time;

pub use agent::{generation_bytes, total_drift, Agent};
pub use config::CirclesConfig;
pub use convergence::{ConvergenceMonitor, DriftReport};
pub use error::{ConfigurationError, SimulationError};
pub use glam::DVec3;
pub use interactions::{AgentUpdate, RepulsionModel};
pub use simulation::{RunSummary, Runner, Simulation, StepContext};
pub use spatial::{pseudo_distance, Bounds, IndexedPoint, SpatialConfig, SpatialIndex};
pub use spawn::{spawn_population, spawn_uniform, SpawnContext};
pub use step::SimulationStep;

/// Convenient re-exports for common usage.
///
/// # Usage
///
/// ```ignore
/// use circles::prelude::*;
/// ```
pub mod prelude {
    pub use crate::agent::Agent;
    pub use crate::config::CirclesConfig;
    pub use crate::convergence::{ConvergenceMonitor, DriftReport};
    pub use crate::error::{ConfigurationError, SimulationError};
    pub use crate::interactions::RepulsionModel;
    pub use crate::simulation::{Runner, Simulation, StepContext};
    pub use crate::spatial::{Bounds, SpatialConfig, SpatialIndex};
    pub use crate::spawn::SpawnContext;
    pub use crate::step::SimulationStep;
    pub use crate::time::StepTimer;
    pub use crate::DVec3;
}
