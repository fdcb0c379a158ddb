//! The simulated point agent.

use bytemuck::{Pod, Zeroable};
use glam::DVec3;

/// A single point particle in the Circles model.
///
/// Agents are plain values. A step never mutates an agent in place; it reads
/// the current generation and produces a new [`Agent`] for every slot, so
/// neighbor queries always observe a frozen snapshot.
///
/// The layout is `#[repr(C)]` with no padding, which lets a whole generation
/// be viewed as bytes via [`generation_bytes`].
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct Agent {
    /// Stable identity. Never changes and never reused; the only key used to
    /// keep an agent from counting itself as a neighbor.
    pub id: u64,
    /// Position in world units.
    pub position: DVec3,
    /// Pseudo-distance magnitude of the last position update.
    pub drift: f64,
}

impl Agent {
    /// Create an agent at `position` with zero drift.
    pub fn new(id: u64, position: DVec3) -> Self {
        Self { id, position, drift: 0.0 }
    }
}

/// Sum of every agent's drift in a generation.
///
/// Summation runs in slice order so the result is reproducible for a given
/// generation.
pub fn total_drift(agents: &[Agent]) -> f64 {
    agents.iter().map(|a| a.drift).sum()
}

/// Raw byte view of a generation, for bit-exact comparison or hashing.
pub fn generation_bytes(agents: &[Agent]) -> &[u8] {
    bytemuck::cast_slice(agents)
}
