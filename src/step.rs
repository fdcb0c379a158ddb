//! One discrete step of the model.
//!
//! A step runs in two phases over a frozen snapshot:
//!
//! 1. Rebuild the [`SpatialIndex`] from every agent's current position.
//! 2. For every agent, in parallel, query its neighbors and compute its
//!    update with the [`RepulsionModel`].
//!
//! Results are collected into a new generation; nothing in the current
//! generation is written, so no query can observe an already-updated
//! position. If the index cannot be built, the step fails before any agent
//! is updated.

use rayon::prelude::*;
use tracing::{debug, warn};

use crate::agent::{total_drift, Agent};
use crate::error::ConfigurationError;
use crate::interactions::RepulsionModel;
use crate::spatial::{Bounds, SpatialConfig, SpatialIndex};

/// Stateless driver for generation-to-generation updates.
///
/// Holds the simulation-wide constants and a reusable index.
#[derive(Clone, Debug)]
pub struct SimulationStep {
    model: RepulsionModel,
    spatial: SpatialConfig,
    bounds: Bounds,
    index: SpatialIndex,
}

impl SimulationStep {
    /// Validate the constants once, up front.
    ///
    /// The index must use the force law's radius, and the grid over `bounds`
    /// must fit within [`MAX_CELLS`](crate::spatial::MAX_CELLS).
    pub fn new(
        model: RepulsionModel,
        spatial: SpatialConfig,
        bounds: Bounds,
    ) -> Result<Self, ConfigurationError> {
        spatial.grid_dims(&bounds)?;
        if spatial.radius != model.radius() {
            return Err(ConfigurationError::RadiusMismatch {
                model: model.radius(),
                index: spatial.radius,
            });
        }
        Ok(Self {
            model,
            spatial,
            bounds,
            index: SpatialIndex::new(),
        })
    }

    /// Produce the next generation from `agents`.
    ///
    /// The output has one agent per input, in input order, with ids
    /// unchanged. Deterministic: the same input yields a bit-identical
    /// output regardless of thread count.
    pub fn advance(&mut self, agents: &[Agent]) -> Result<Vec<Agent>, ConfigurationError> {
        self.index.build(
            agents.iter().map(|a| (a.id, a.position)),
            self.spatial,
            self.bounds,
        )?;

        if self.index.clamped_count() > 0 {
            warn!(
                clamped = self.index.clamped_count(),
                "agents outside environment bounds were clamped into boundary cells"
            );
        }

        let index = &self.index;
        let model = &self.model;
        let next: Vec<Agent> = agents
            .par_iter()
            .map(|agent| {
                let mut neighbors = Vec::new();
                index.for_each_neighbor(agent.position, |p| neighbors.push((p.id, p.position)));
                model.compute_update(agent, neighbors).apply(agent)
            })
            .collect();

        debug!(
            agents = next.len(),
            occupied_cells = self.index.occupied_cells(),
            dims = ?self.index.dims(),
            total_drift = total_drift(&next),
            "generation advanced"
        );

        Ok(next)
    }

    pub fn model(&self) -> &RepulsionModel {
        &self.model
    }

    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    /// Index built by the most recent [`advance`](Self::advance).
    pub fn index(&self) -> &SpatialIndex {
        &self.index
    }

    /// Swap the bounds without validation, so tests can force a failed step.
    #[cfg(test)]
    pub(crate) fn with_unchecked_bounds(mut self, bounds: Bounds) -> Self {
        self.bounds = bounds;
        self
    }
}
