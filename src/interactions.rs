//! Radius-normalized repulsion between neighboring agents.
//!
//! Each qualifying neighbor contributes a force along the unit vector toward
//! it, scaled by
//!
//! ```text
//! k = sin((separation / radius) * PI * -2) * repulse_factor
//! ```
//!
//! where `separation` is the [`pseudo_distance`]. `k` is negative over the
//! first half of the radius (push away) and positive over the second half
//! (pull closer), so agents settle at roughly half the radius from each other.
//! The per-neighbor forces are averaged and added to the position.

use std::f64::consts::PI;

use glam::DVec3;

use crate::agent::Agent;
use crate::error::ConfigurationError;
use crate::spatial::pseudo_distance;

/// Result of one agent's update.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AgentUpdate {
    /// Averaged force; also the position delta.
    pub force: DVec3,
    pub position: DVec3,
    /// Pseudo-distance magnitude of `force`.
    pub drift: f64,
    /// Neighbors that actually contributed (in range, not coincident, not self).
    pub contributors: u32,
}

impl AgentUpdate {
    /// Apply this update to `agent`, producing its next-generation value.
    pub fn apply(&self, agent: &Agent) -> Agent {
        Agent {
            id: agent.id,
            position: self.position,
            drift: self.drift,
        }
    }
}

/// Parameters of the repulsion force law.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RepulsionModel {
    radius: f64,
    repulse_factor: f64,
}

impl RepulsionModel {
    /// Validates `radius > 0` and `repulse_factor > 0`, both finite.
    pub fn new(radius: f64, repulse_factor: f64) -> Result<Self, ConfigurationError> {
        if !(radius.is_finite() && radius > 0.0) {
            return Err(ConfigurationError::InvalidRadius(radius));
        }
        if !(repulse_factor.is_finite() && repulse_factor > 0.0) {
            return Err(ConfigurationError::InvalidRepulseFactor(repulse_factor));
        }
        Ok(Self { radius, repulse_factor })
    }

    pub fn radius(&self) -> f64 {
        self.radius
    }

    pub fn repulse_factor(&self) -> f64 {
        self.repulse_factor
    }

    /// Force magnitude at a given separation, for `0 < separation < radius`.
    #[inline]
    pub fn magnitude(&self, separation: f64) -> f64 {
        ((separation / self.radius) * PI * -2.0).sin() * self.repulse_factor
    }

    /// Compute `agent`'s next position and drift from the current positions of
    /// its candidate neighbors.
    ///
    /// Candidates with the agent's own id are skipped, as are candidates at
    /// separation `>= radius` or `<= 0`. With no contributors the force is
    /// zero and the agent stays put. The neighbor sum is order-insensitive up
    /// to floating-point summation order.
    pub fn compute_update<I>(&self, agent: &Agent, neighbors: I) -> AgentUpdate
    where
        I: IntoIterator<Item = (u64, DVec3)>,
    {
        let mut force = DVec3::ZERO;
        let mut count = 0u32;

        for (id, position) in neighbors {
            if id == agent.id {
                continue;
            }
            let delta = position - agent.position;
            let separation = pseudo_distance(delta);
            if separation < self.radius && separation > 0.0 {
                force += self.magnitude(separation) * (delta / separation);
                count += 1;
            }
        }

        force /= count.max(1) as f64;

        AgentUpdate {
            force,
            position: agent.position + force,
            drift: pseudo_distance(force),
            contributors: count,
        }
    }
}
